//! Error type shared by every stage of sealing and verification.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SealError {
    /// A byte source could not be read. Fatal to the whole hashing batch.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// No leaves were available to build a Merkle tree from.
    #[error("no file hashes to build a Merkle tree from")]
    EmptyInput,

    #[error("malformed manifest: {0}")]
    Format(String),

    #[error("unsupported manifest version {0:?}")]
    UnsupportedVersion(String),

    #[error("duplicate relative path {0:?}")]
    DuplicatePath(String),

    #[error("unsafe path {path}: {reason}")]
    UnsafePath { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to start hashing workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl SealError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        SealError::Io { path: path.into(), source }
    }

    /// True for every error raised while decoding a manifest.
    pub fn is_format(&self) -> bool {
        matches!(self, SealError::Format(_) | SealError::UnsupportedVersion(_))
    }
}

impl From<serde_json::Error> for SealError {
    fn from(err: serde_json::Error) -> Self {
        SealError::Format(err.to_string())
    }
}

pub type Result<T, E = SealError> = std::result::Result<T, E>;
