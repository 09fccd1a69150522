use crate::error::{Result, SealError};
use crate::manifest::Manifest;

/// Major version this crate understands. Any `1.x` manifest decodes.
pub const SUPPORTED_MAJOR: &str = "1";

/// Serialize a manifest as two-space indented JSON.
pub fn encode_manifest(manifest: &Manifest) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(manifest)?;
    out.push(b'\n');
    Ok(out)
}

/// Parse a manifest. Fails on malformed JSON, missing fields, bad digests
/// and versions outside [`SUPPORTED_MAJOR`].
pub fn decode_manifest(bytes: &[u8]) -> Result<Manifest> {
    let manifest: Manifest = serde_json::from_slice(bytes)?;
    check_version(&manifest.version)?;
    Ok(manifest)
}

fn check_version(version: &str) -> Result<()> {
    let major = version.split('.').next().unwrap_or_default();
    if major != SUPPORTED_MAJOR {
        return Err(SealError::UnsupportedVersion(version.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_policy() {
        assert!(check_version("1.0").is_ok());
        assert!(check_version("1.3").is_ok());
        assert!(check_version("1").is_ok());
        assert!(matches!(check_version("2.0"), Err(SealError::UnsupportedVersion(_))));
        assert!(matches!(check_version(""), Err(SealError::UnsupportedVersion(_))));
        assert!(matches!(check_version("10.0"), Err(SealError::UnsupportedVersion(_))));
    }
}
