//! Filesystem file provider: turns a directory into [`RawFile`]s.

use crate::error::{Result, SealError};
use crate::hasher::{ByteSource, RawFile};
use crate::path_safety::{ensure_contained, validate_relative, PathPolicy};
use chrono::{DateTime, Utc};
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Every regular file below `root`, with slash-delimited paths relative to
/// `root`. Symlinks are skipped unless the policy follows them, in which case
/// their target must stay inside `root`.
pub fn collect_files(root: &Path, policy: PathPolicy) -> Result<Vec<RawFile>> {
    let mut out = Vec::new();
    for ent in WalkDir::new(root).min_depth(1).follow_links(policy.follow_symlinks) {
        let ent = ent.map_err(|e| {
            let path = e.path().unwrap_or(root).display().to_string();
            SealError::io(path, e.into())
        })?;
        let path = ent.path();
        if ent.path_is_symlink() && !policy.follow_symlinks {
            tracing::debug!(path = %path.display(), "skipping symlink");
            continue;
        }
        if !ent.file_type().is_file() {
            continue;
        }
        if policy.follow_symlinks {
            ensure_contained(root, path)?;
        }

        let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
        validate_relative(&rel)?;
        let relative_path = slash_path(&rel)?;
        let meta = ent.metadata().map_err(|e| SealError::io(relative_path.clone(), e.into()))?;
        let last_modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .map_err(|e| SealError::io(relative_path.clone(), e))?;
        let name = relative_path.rsplit('/').next().unwrap_or(&relative_path).to_string();

        out.push(RawFile {
            name,
            relative_path,
            size: meta.len(),
            last_modified,
            source: ByteSource::Path(path.to_path_buf()),
        });
    }
    tracing::debug!(root = %root.display(), files = out.len(), "collected files");
    Ok(out)
}

/// Non-UTF-8 names are refused: a lossy conversion could give two files the same key.
fn slash_path(rel: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for c in rel.components() {
        if let Component::Normal(s) = c {
            let part = s.to_str().ok_or_else(|| SealError::UnsafePath {
                path: rel.display().to_string(),
                reason: "file name is not valid UTF-8".to_string(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}
