pub mod codec;
pub mod config;
pub mod digest;
pub mod error;
pub mod filter;
pub mod hasher;
pub mod manifest;
pub mod merkle;
pub mod path_safety;
pub mod progress;
pub mod seal;
pub mod verify;
pub mod walk;

pub use codec::{decode_manifest, encode_manifest};
pub use digest::Digest;
pub use error::SealError;
pub use hasher::{hash_files, RawFile};
pub use manifest::{build_manifest, FileHash, Manifest, ManifestMetadata};
pub use merkle::build_root;
pub use verify::{verify, VerificationResult};
