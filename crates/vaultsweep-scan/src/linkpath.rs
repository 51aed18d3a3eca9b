//! Best-match lookup of link targets against the vault's files.

use std::collections::HashMap;

use vaultsweep_core::{NOTE_EXTENSION, ROOT_FOLDER, VaultFile};

/// Lookup tables over a file list.
///
/// Removed files leave an empty slot behind, so the tables never need
/// rebuilding while a sweep disposes of files one by one.
#[derive(Debug, Default)]
pub struct LinkIndex {
    slots: Vec<Option<VaultFile>>,
    live: usize,
    by_path: HashMap<String, usize>,
    by_path_lower: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
    by_note_stem: HashMap<String, Vec<usize>>,
}

impl LinkIndex {
    /// Index a file list.
    pub fn new(files: Vec<VaultFile>) -> Self {
        let mut index = Self {
            live: files.len(),
            slots: files.into_iter().map(Some).collect(),
            ..Default::default()
        };
        for (i, file) in index.slots.iter().enumerate() {
            let Some(file) = file else { continue };
            index.by_path.insert(file.path.clone(), i);
            index
                .by_path_lower
                .entry(file.path.to_lowercase())
                .or_default()
                .push(i);
            index
                .by_name
                .entry(file.name.as_str().to_lowercase())
                .or_default()
                .push(i);
            if file.is_note() {
                index
                    .by_note_stem
                    .entry(file.stem().to_lowercase())
                    .or_default()
                    .push(i);
            }
        }
        index
    }

    /// The indexed files, in index order.
    pub fn files(&self) -> impl Iterator<Item = &VaultFile> {
        self.slots.iter().flatten()
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Look up a file by exact vault path.
    pub fn get(&self, path: &str) -> Option<&VaultFile> {
        self.by_path.get(path).and_then(|&i| self.slot(i))
    }

    /// Drop a file from the index, returning it if it was present.
    pub fn remove(&mut self, path: &str) -> Option<VaultFile> {
        let i = self.by_path.remove(path)?;
        let file = self.slots.get_mut(i)?.take()?;
        self.live -= 1;
        prune(&mut self.by_path_lower, &file.path.to_lowercase(), i);
        prune(&mut self.by_name, &file.name.as_str().to_lowercase(), i);
        if file.is_note() {
            prune(&mut self.by_note_stem, &file.stem().to_lowercase(), i);
        }
        Some(file)
    }

    /// Resolve `link` as written in the note at `source`.
    ///
    /// Tries the path relative to the source's folder, then the path from
    /// the vault root (each also with `.md` appended), then falls back to a
    /// file-name match.
    pub fn resolve(&self, link: &str, source: &str) -> Option<&VaultFile> {
        let link = clean_link(link)?;

        let source_folder = VaultFile::new(source, 0).parent;
        let mut candidates = Vec::with_capacity(2);
        if let Some(stripped) = link.strip_prefix('/') {
            candidates.extend(normalize_path("", stripped));
        } else {
            let base = if source_folder == ROOT_FOLDER {
                ""
            } else {
                source_folder.as_str()
            };
            candidates.extend(normalize_path(base, &link));
            candidates.extend(normalize_path("", &link));
        }

        for candidate in &candidates {
            if let Some(file) = self.lookup_path(candidate) {
                return Some(file);
            }
        }

        self.lookup_name(&link, &source_folder)
    }

    fn slot(&self, i: usize) -> Option<&VaultFile> {
        self.slots.get(i)?.as_ref()
    }

    fn lookup_path(&self, path: &str) -> Option<&VaultFile> {
        let with_ext = format!("{path}.{NOTE_EXTENSION}");
        [path, with_ext.as_str()].into_iter().find_map(|p| {
            self.get(p).or_else(|| {
                self.by_path_lower
                    .get(&p.to_lowercase())
                    .and_then(|hits| hits.iter().find_map(|&i| self.slot(i)))
            })
        })
    }

    fn lookup_name(&self, link: &str, source_folder: &str) -> Option<&VaultFile> {
        let link_lower = link.trim_start_matches("./").trim_start_matches('/').to_lowercase();
        let name = link_lower.rsplit('/').next().unwrap_or(&link_lower);

        let mut hits: Vec<&VaultFile> = self
            .by_name
            .get(name)
            .into_iter()
            .chain(self.by_note_stem.get(name))
            .flatten()
            .filter_map(|&i| self.slot(i))
            .collect();
        if hits.is_empty() {
            return None;
        }

        if link_lower.contains('/') {
            let suffix = format!("/{link_lower}");
            let anchored: Vec<&VaultFile> = hits
                .iter()
                .copied()
                .filter(|f| {
                    let path = f.path.to_lowercase();
                    let note_path = path.strip_suffix(".md").unwrap_or(&path).to_string();
                    [path.as_str(), note_path.as_str()]
                        .iter()
                        .any(|p| *p == link_lower || p.ends_with(&suffix))
                })
                .collect();
            if !anchored.is_empty() {
                hits = anchored;
            }
        }

        hits.sort_by(|a, b| {
            let a_local = a.parent == source_folder;
            let b_local = b.parent == source_folder;
            b_local
                .cmp(&a_local)
                .then(a.path.len().cmp(&b.path.len()))
                .then(a.path.cmp(&b.path))
        });
        hits.first().copied()
    }
}

fn prune(map: &mut HashMap<String, Vec<usize>>, key: &str, slot: usize) {
    if let Some(hits) = map.get_mut(key) {
        hits.retain(|&i| i != slot);
        if hits.is_empty() {
            map.remove(key);
        }
    }
}

/// Strip wrapping and escapes from a raw link; `None` if nothing is left.
fn clean_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unwrapped = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed);
    let decoded = percent_decode(unwrapped);
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}

/// Decode `%XX` escapes; the input is returned unchanged if the result is not UTF-8.
fn percent_decode(input: &str) -> String {
    if !input.contains('%') {
        return input.to_string();
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(byte) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

/// Join `link` onto `base` and fold `.`/`..` segments; `None` if it climbs above the root.
fn normalize_path(base: &str, link: &str) -> Option<String> {
    let mut parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for part in link.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
