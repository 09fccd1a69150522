//! Optional TOML configuration for sealing and verification.
//!
//! ```toml
//! [exclude]
//! hidden = true
//! names = ["Thumbs.db", "desktop.ini"]
//! paths = ["integrity-manifest.json"]
//! globs = ["**/*.tmp"]
//!
//! [hashing]
//! threads = 4
//!
//! [walk]
//! follow_symlinks = false
//! ```

use crate::error::{Result, SealError};
use crate::filter::{SystemFileFilter, DEFAULT_SYSTEM_NAMES};
use crate::path_safety::PathPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SealConfig {
    pub exclude: ExcludeConfig,
    pub hashing: HashingConfig,
    pub walk: WalkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExcludeConfig {
    /// Skip anything with a path component starting with `.`.
    pub hidden: bool,
    /// Exact file names to skip.
    pub names: Vec<String>,
    /// Exact slash-delimited relative paths to skip.
    pub paths: Vec<String>,
    /// Glob patterns matched against the slash-delimited relative path.
    pub globs: Vec<String>,
}

impl Default for ExcludeConfig {
    fn default() -> Self {
        ExcludeConfig {
            hidden: true,
            names: DEFAULT_SYSTEM_NAMES.iter().map(|s| s.to_string()).collect(),
            paths: Vec::new(),
            globs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HashingConfig {
    /// Worker threads; unset or 0 means one per core.
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WalkConfig {
    pub follow_symlinks: bool,
}

impl SealConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SealError::Config(format!("read {}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SealError::Config(e.to_string()))
    }

    pub fn filter(&self) -> Result<SystemFileFilter> {
        let mut f = SystemFileFilter::none().with_hidden(self.exclude.hidden);
        for n in &self.exclude.names {
            f = f.with_name(n.clone());
        }
        for p in &self.exclude.paths {
            f = f.with_path(p.clone());
        }
        f.with_globs(&self.exclude.globs)
    }

    pub fn path_policy(&self) -> PathPolicy {
        PathPolicy { follow_symlinks: self.walk.follow_symlinks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = SealConfig::from_toml("").unwrap();
        assert_eq!(cfg, SealConfig::default());
        assert!(cfg.exclude.hidden);
        let f = cfg.filter().unwrap();
        assert!(f.excludes("Thumbs.db"));
        assert!(f.excludes(".git/config"));
    }

    #[test]
    fn partial_sections_override_only_their_keys() {
        let cfg = SealConfig::from_toml(
            "[exclude]\nhidden = false\nglobs = [\"*.log\"]\npaths = [\"seal.json\"]\n[hashing]\nthreads = 2\n",
        )
        .unwrap();
        assert!(!cfg.exclude.hidden);
        assert_eq!(cfg.exclude.names.len(), DEFAULT_SYSTEM_NAMES.len());
        assert_eq!(cfg.hashing.threads, Some(2));
        assert!(!cfg.path_policy().follow_symlinks);
        let f = cfg.filter().unwrap();
        assert!(f.excludes("server.log"));
        assert!(f.excludes("seal.json"));
        assert!(!f.excludes(".env"));
    }

    #[test]
    fn unknown_types_are_config_errors() {
        let err = SealConfig::from_toml("[hashing]\nthreads = \"many\"\n").unwrap_err();
        assert!(matches!(err, SealError::Config(_)));
    }
}
