//! YAML front-matter extraction.

use vaultsweep_core::{Frontmatter, VaultError};

/// Split a note into its front-matter YAML and the remaining body.
///
/// The block must open on the first line with `---` and close with a line
/// holding only `---` (or `...`). Returns `None` when there is no block.
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text
        .strip_prefix("---\r\n")
        .or_else(|| text.strip_prefix("---\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Parse the front-matter block of the note at `path`.
pub fn parse_frontmatter(path: &str, text: &str) -> Result<Option<Frontmatter>, VaultError> {
    let Some((yaml, _body)) = split_frontmatter(text) else {
        return Ok(None);
    };

    if yaml.trim().is_empty() {
        return Ok(Some(Frontmatter::new()));
    }

    let value: serde_json::Value =
        serde_yml::from_str(yaml).map_err(|e| VaultError::InvalidFrontmatter {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    match value {
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::Null => Ok(Some(Frontmatter::new())),
        other => Err(VaultError::InvalidFrontmatter {
            path: path.to_string(),
            message: format!("expected a mapping, found {other}"),
        }),
    }
}
