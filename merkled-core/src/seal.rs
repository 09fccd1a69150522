use crate::codec::{decode_manifest, encode_manifest};
use crate::config::SealConfig;
use crate::digest::Digest;
use crate::error::{Result, SealError};
use crate::hasher::FileHasher;
use crate::manifest::{build_manifest, FileHash, Manifest, ManifestMetadata};
use crate::merkle;
use crate::path_safety::PathPolicy;
use crate::progress::Progress;
use crate::verify::{verify, VerificationResult};
use crate::walk::collect_files;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// How a directory is walked and hashed.
pub struct SealOptions {
    pub hasher: FileHasher,
    pub policy: PathPolicy,
}

impl Default for SealOptions {
    fn default() -> Self {
        SealOptions { hasher: FileHasher::default(), policy: PathPolicy::default() }
    }
}

impl SealOptions {
    pub fn from_config(cfg: &SealConfig, progress: Progress) -> Result<Self> {
        let hasher = FileHasher::new(cfg.filter()?)
            .with_threads(cfg.hashing.threads)
            .with_progress(progress);
        Ok(SealOptions { hasher, policy: cfg.path_policy() })
    }
}

/// Walk and hash every kept file under `root`, in relative-path order.
pub fn hash_directory(root: &Path, opts: &SealOptions) -> Result<Vec<FileHash>> {
    let raw = collect_files(root, opts.policy)?;
    opts.hasher.hash_files(raw)
}

/// Merkle root of already hashed files, in the order given.
pub fn root_of(files: &[FileHash]) -> Result<Digest> {
    let leaves: Vec<Digest> = files.iter().map(|f| f.hash).collect();
    merkle::build_root(&leaves)
}

/// Seal `root`: hash, build the tree, assemble the manifest.
pub fn seal_directory(
    root: &Path,
    opts: &SealOptions,
    metadata: Option<ManifestMetadata>,
) -> Result<Manifest> {
    let files = hash_directory(root, opts)?;
    let merkle_root = root_of(&files)?;
    let manifest = build_manifest(files, merkle_root, metadata);
    tracing::info!(
        root = %manifest.merkle_root,
        files = manifest.total_files,
        bytes = manifest.total_size,
        "sealed {}",
        root.display()
    );
    Ok(manifest)
}

/// Re-hash `root` and compare it with `manifest`.
pub fn verify_directory(
    root: &Path,
    manifest: &Manifest,
    opts: &SealOptions,
) -> Result<VerificationResult> {
    let files = hash_directory(root, opts)?;
    verify(&files, manifest)
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let bytes = encode_manifest(manifest)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SealError::io(parent.display().to_string(), e))?;
    }
    let mut f = File::create(path).map_err(|e| SealError::io(path.display().to_string(), e))?;
    f.write_all(&bytes).map_err(|e| SealError::io(path.display().to_string(), e))?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let bytes = fs::read(path).map_err(|e| SealError::io(path.display().to_string(), e))?;
    decode_manifest(&bytes)
}
