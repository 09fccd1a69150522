use crate::error::{Result, SealError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;

/// OS-generated files that never belong in a seal.
pub const DEFAULT_SYSTEM_NAMES: &[&str] = &["Thumbs.db", "desktop.ini"];

/// Decides which files are system or hidden artifacts and stay out of a seal.
///
/// A relative path is excluded when
/// - `exclude_hidden` is set and any of its components starts with `.`,
/// - its file name is in `names`,
/// - it is one of the exact relative `paths`,
/// - it matches one of the glob patterns.
#[derive(Clone, Debug)]
pub struct SystemFileFilter {
    exclude_hidden: bool,
    names: BTreeSet<String>,
    paths: BTreeSet<String>,
    patterns: Vec<String>,
    globs: GlobSet,
}

impl Default for SystemFileFilter {
    fn default() -> Self {
        SystemFileFilter {
            exclude_hidden: true,
            names: DEFAULT_SYSTEM_NAMES.iter().map(|s| s.to_string()).collect(),
            paths: BTreeSet::new(),
            patterns: Vec::new(),
            globs: GlobSet::empty(),
        }
    }
}

impl SystemFileFilter {
    /// A filter that lets every file through.
    pub fn none() -> Self {
        SystemFileFilter {
            exclude_hidden: false,
            names: BTreeSet::new(),
            paths: BTreeSet::new(),
            patterns: Vec::new(),
            globs: GlobSet::empty(),
        }
    }

    pub fn with_hidden(mut self, exclude_hidden: bool) -> Self {
        self.exclude_hidden = exclude_hidden;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Leave out one file by its slash-delimited path relative to the sealed root.
    pub fn with_path(mut self, relative_path: impl Into<String>) -> Self {
        self.paths.insert(relative_path.into());
        self
    }

    pub fn with_globs<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.patterns.extend(patterns.into_iter().map(|p| p.as_ref().to_string()));
        let mut b = GlobSetBuilder::new();
        for p in &self.patterns {
            let g = Glob::new(p)
                .map_err(|e| SealError::Config(format!("bad exclude pattern {p:?}: {e}")))?;
            b.add(g);
        }
        self.globs = b.build().map_err(|e| SealError::Config(e.to_string()))?;
        Ok(self)
    }

    /// `relative_path` is slash-delimited and relative to the sealed root.
    pub fn excludes(&self, relative_path: &str) -> bool {
        let mut components = relative_path.split('/').filter(|c| !c.is_empty());
        if self.exclude_hidden && components.clone().any(|c| c.starts_with('.')) {
            return true;
        }
        if self.paths.contains(relative_path) {
            return true;
        }
        if let Some(name) = components.next_back() {
            if self.names.contains(name) {
                return true;
            }
        }
        self.globs.is_match(relative_path)
    }
}
