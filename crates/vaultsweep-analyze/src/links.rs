//! Link extraction from note text.
//!
//! Two passes run over the text, each a single left-to-right regex scan
//! producing non-overlapping matches:
//!
//! 1. `[[target|alias]]` wiki links; a `#` before the alias marks a
//!    transclusion (`[[diagram.png#region]]`) and the part before it is the
//!    target.
//! 2. `[caption](destination)` markdown links; a `#` in the destination
//!    marks a transclusion the same way.
//!
//! The `!` embed prefix sits outside the brackets and needs no handling.
//! Wiki-link content may not contain brackets, so in `[[a [[b.png]] c]]`
//! only the innermost `[[b.png]]` is recognized.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]*)\]\]").expect("wiki link pattern"));

// Destinations may hold one level of balanced parentheses: `(photo (1).png)`.
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]\n]*)\]\(((?:[^()\n]|\([^()\n]*\))*)\)").expect("markdown link pattern")
});

static EMBEDDED_WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\[\]\n]*)\]\]").expect("embedded wiki link pattern"));

/// Syntax a link was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// `[[target]]` or `[[target|alias]]`.
    Wiki,
    /// `[[target#fragment]]`.
    WikiTransclusion,
    /// `[caption](target)`.
    Markdown,
    /// `[caption](target#fragment)`.
    MarkdownTransclusion,
}

impl LinkKind {
    /// Whether the link embeds a region of its target.
    pub fn is_transclusion(&self) -> bool {
        matches!(self, Self::WikiTransclusion | Self::MarkdownTransclusion)
    }
}

/// A single link found in a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOccurrence<'t> {
    /// Link syntax.
    pub kind: LinkKind,
    /// The full matched text, brackets included.
    pub raw: &'t str,
    /// The target as written, never empty and never an http(s) URL.
    pub target: &'t str,
    /// Vault path of the document containing the link.
    pub source: &'t str,
}

/// Extract every link in `text`, wiki links first, then markdown links.
///
/// The returned iterator borrows `text`; call again to restart.
pub fn extract_links<'t>(
    text: &'t str,
    source: &'t str,
) -> impl Iterator<Item = LinkOccurrence<'t>> + 't {
    let wiki = WIKI_LINK
        .captures_iter(text)
        .filter_map(move |caps| wiki_occurrence(&caps, source));
    let markdown = MARKDOWN_LINK
        .captures_iter(text)
        .filter_map(move |caps| markdown_occurrence(&caps, source));
    wiki.chain(markdown)
}

/// Target of the first `![[...]]` embed in `value`, without fragment or alias.
pub fn embedded_wiki_target(value: &str) -> Option<&str> {
    let inner = EMBEDDED_WIKI_LINK.captures(value)?.get(1)?.as_str();
    let before_alias = strip_alias(inner);
    let name = before_alias
        .split_once('#')
        .map_or(before_alias, |(name, _)| name)
        .trim();
    (!name.is_empty()).then_some(name)
}

/// Check for an `http://` or `https://` prefix, ignoring case.
pub fn is_external(target: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        target
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Wiki-link content up to the alias. Inside tables the alias pipe is
/// written `\|`, so the escaping backslash is dropped too.
fn strip_alias(inner: &str) -> &str {
    match inner.split_once('|') {
        Some((target, _)) => target.strip_suffix('\\').unwrap_or(target),
        None => inner,
    }
}

fn wiki_occurrence<'t>(caps: &Captures<'t>, source: &'t str) -> Option<LinkOccurrence<'t>> {
    let raw = caps.get(0)?.as_str();
    let before_alias = strip_alias(caps.get(1)?.as_str());

    let (kind, target) = match before_alias.split_once('#') {
        Some((name, _)) => (LinkKind::WikiTransclusion, name),
        None => (LinkKind::Wiki, before_alias),
    };
    occurrence(kind, raw, target.trim(), source)
}

fn markdown_occurrence<'t>(caps: &Captures<'t>, source: &'t str) -> Option<LinkOccurrence<'t>> {
    let raw = caps.get(0)?.as_str();
    let destination = strip_title(caps.get(2)?.as_str().trim());
    let destination = destination
        .strip_prefix('<')
        .and_then(|d| d.strip_suffix('>'))
        .unwrap_or(destination);

    let (kind, target) = match destination.split_once('#') {
        Some((path, _)) => (LinkKind::MarkdownTransclusion, path),
        None => (LinkKind::Markdown, destination),
    };
    occurrence(kind, raw, target.trim(), source)
}

fn occurrence<'t>(
    kind: LinkKind,
    raw: &'t str,
    target: &'t str,
    source: &'t str,
) -> Option<LinkOccurrence<'t>> {
    if target.is_empty() || is_external(target) {
        return None;
    }
    Some(LinkOccurrence {
        kind,
        raw,
        target,
        source,
    })
}

/// Drop a trailing `"title"` or `'title'` from a markdown destination.
fn strip_title(destination: &str) -> &str {
    let Some(last) = destination.chars().last() else {
        return destination;
    };
    if last != '"' && last != '\'' {
        return destination;
    }
    let body = &destination[..destination.len() - 1];
    match body.rfind(last) {
        Some(open) if open > 0 => {
            let before = &destination[..open];
            if before.ends_with(char::is_whitespace) {
                before.trim_end()
            } else {
                destination
            }
        }
        _ => destination,
    }
}
