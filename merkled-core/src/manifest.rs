use crate::digest::Digest;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Version stamped on every manifest this crate builds.
pub const MANIFEST_VERSION: &str = "1.0";

/// Digest and bookkeeping for one sealed file. `relative_path` is the
/// uniqueness key within a sealed set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileHash {
    pub path: String,
    pub relative_path: String,
    pub hash: Digest,
    pub size: u64,
    pub last_modified: String,
}

/// Free-form case information recorded alongside a seal. Never interpreted.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl ManifestMetadata {
    pub fn is_empty(&self) -> bool {
        self.case_number.is_none()
            && self.description.is_none()
            && self.investigator.is_none()
            && self.organization.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub timestamp: String,
    pub merkle_root: Digest,
    pub total_files: u64,
    pub total_size: u64,
    pub files: Vec<FileHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManifestMetadata>,
}

impl Manifest {
    /// Problems with the recorded totals. The Merkle root is not recomputed here.
    pub fn consistency_errors(&self) -> Vec<String> {
        let mut errs = Vec::new();
        if self.total_files != self.files.len() as u64 {
            errs.push(format!(
                "totalFiles is {} but {} files are listed",
                self.total_files,
                self.files.len()
            ));
        }
        let sum: u64 = self.files.iter().map(|f| f.size).sum();
        if self.total_size != sum {
            errs.push(format!("totalSize is {} but file sizes sum to {}", self.total_size, sum));
        }
        errs
    }
}

/// Assemble a manifest from hashed files and their root. Metadata is kept verbatim.
pub fn build_manifest(
    files: Vec<FileHash>,
    merkle_root: Digest,
    metadata: Option<ManifestMetadata>,
) -> Manifest {
    let total_size = files.iter().map(|f| f.size).sum();
    Manifest {
        version: MANIFEST_VERSION.to_string(),
        timestamp: iso8601(Utc::now()),
        merkle_root,
        total_files: files.len() as u64,
        total_size,
        files,
        metadata,
    }
}

/// RFC 3339 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn iso8601(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
