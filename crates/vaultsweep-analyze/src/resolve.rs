//! Resolution of link targets to vault paths.

use vaultsweep_core::Vault;

/// The path a link is taken to point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Vault path if the store confirmed a file, otherwise the raw target.
    pub path: String,
    /// Whether the store found a matching file.
    pub confirmed: bool,
}

/// Resolve `target`, as written in the document at `source`, through the vault.
///
/// An unmatched target is not an error: it comes back unchanged so the
/// reference still counts as used.
pub fn resolve_link<V>(target: &str, source: &str, vault: &V) -> ResolvedReference
where
    V: Vault + ?Sized,
{
    match vault.first_link_dest(target, source) {
        Some(file) => ResolvedReference {
            path: file.path,
            confirmed: true,
        },
        None => {
            tracing::trace!(link = target, source, "link target not found in vault");
            ResolvedReference {
                path: target.to_string(),
                confirmed: false,
            }
        }
    }
}
