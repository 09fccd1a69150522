use crate::error::{Result, SealError};
use std::path::{Component, Path, PathBuf};

#[derive(Clone, Copy, Debug, Default)]
pub struct PathPolicy {
    pub follow_symlinks: bool,
}

/// Ensure `rel` is a plain relative path: not absolute, no `..`.
pub fn validate_relative(rel: &Path) -> Result<()> {
    if rel.is_absolute() || rel.has_root() {
        return Err(unsafe_path(rel, "absolute paths are not allowed"));
    }
    if rel.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_))) {
        return Err(unsafe_path(rel, "parent traversal not allowed"));
    }
    Ok(())
}

/// Resolve `candidate` (found under `root` while following symlinks) and make
/// sure the real location is still inside `root`.
pub fn ensure_contained(root: &Path, candidate: &Path) -> Result<PathBuf> {
    let root_can =
        std::fs::canonicalize(root).map_err(|e| SealError::io(root.display().to_string(), e))?;
    let cand_can = std::fs::canonicalize(candidate)
        .map_err(|e| SealError::io(candidate.display().to_string(), e))?;
    if !cand_can.starts_with(&root_can) {
        return Err(unsafe_path(candidate, "path escapes root"));
    }
    Ok(cand_can)
}

fn unsafe_path(p: &Path, reason: &str) -> SealError {
    SealError::UnsafePath { path: p.display().to_string(), reason: reason.to_string() }
}
