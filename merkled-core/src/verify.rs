use crate::digest::Digest;
use crate::error::Result;
use crate::manifest::{FileHash, Manifest};
use crate::merkle;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outcome of comparing a freshly hashed file set against a manifest.
/// A mismatch is reported here, never as an error.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub merkle_root_match: bool,
    /// `current files - tampered - extra`. Undercounts when files are missing
    /// and extra at the same time; kept as is for compatibility.
    pub files_matched: u64,
    pub files_total: u64,
    pub tampered_files: Vec<String>,
    pub missing_files: Vec<String>,
    pub extra_files: Vec<String>,
}

/// Verify `current` against `manifest`.
///
/// Fails with `EmptyInput` when `current` is empty: no root can be
/// recomputed, so no valid or invalid verdict is produced.
pub fn verify(current: &[FileHash], manifest: &Manifest) -> Result<VerificationResult> {
    let leaves: Vec<Digest> = current.iter().map(|f| f.hash).collect();
    let root = merkle::build_root(&leaves)?;
    let merkle_root_match = root == manifest.merkle_root;

    // Later entries win on duplicate paths; each path is reported once.
    let recorded: HashMap<&str, &Digest> =
        manifest.files.iter().map(|f| (f.relative_path.as_str(), &f.hash)).collect();
    let present: HashMap<&str, &Digest> =
        current.iter().map(|f| (f.relative_path.as_str(), &f.hash)).collect();

    let mut tampered_files = Vec::new();
    let mut missing_files = Vec::new();
    let mut seen = HashSet::new();
    for f in &manifest.files {
        let path = f.relative_path.as_str();
        if !seen.insert(path) {
            continue;
        }
        match present.get(path) {
            None => missing_files.push(path.to_string()),
            Some(h) if *h != recorded[path] => tampered_files.push(path.to_string()),
            Some(_) => {}
        }
    }

    let mut extra_files = Vec::new();
    let mut seen = HashSet::new();
    for f in current {
        let path = f.relative_path.as_str();
        if seen.insert(path) && !recorded.contains_key(path) {
            extra_files.push(path.to_string());
        }
    }

    let files_matched =
        (current.len() as u64).saturating_sub((tampered_files.len() + extra_files.len()) as u64);
    let is_valid = merkle_root_match
        && tampered_files.is_empty()
        && missing_files.is_empty()
        && extra_files.is_empty();

    if is_valid {
        tracing::info!(files = current.len(), root = %root, "verification passed");
    } else {
        tracing::warn!(
            root_match = merkle_root_match,
            tampered = tampered_files.len(),
            missing = missing_files.len(),
            extra = extra_files.len(),
            "verification failed"
        );
    }

    Ok(VerificationResult {
        is_valid,
        merkle_root_match,
        files_matched,
        files_total: manifest.total_files,
        tampered_files,
        missing_files,
        extra_files,
    })
}
