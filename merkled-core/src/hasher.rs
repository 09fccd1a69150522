use crate::digest::Digest;
use crate::error::{Result, SealError};
use crate::filter::SystemFileFilter;
use crate::manifest::{iso8601, FileHash};
use crate::progress::Progress;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

/// Where a file's bytes come from.
#[derive(Clone, Debug)]
pub enum ByteSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl ByteSource {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match self {
            ByteSource::Path(p) => Ok(Box::new(BufReader::new(File::open(p)?))),
            ByteSource::Memory(b) => Ok(Box::new(&b[..])),
        }
    }
}

/// One file as handed over by a file provider, in no particular order.
#[derive(Clone, Debug)]
pub struct RawFile {
    pub name: String,
    pub relative_path: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub source: ByteSource,
}

impl RawFile {
    /// An in-memory file named after the last component of `relative_path`.
    pub fn from_bytes(relative_path: &str, bytes: Vec<u8>, last_modified: DateTime<Utc>) -> Self {
        let name = relative_path.rsplit('/').next().unwrap_or(relative_path).to_string();
        RawFile {
            name,
            relative_path: relative_path.to_string(),
            size: bytes.len() as u64,
            last_modified,
            source: ByteSource::Memory(bytes),
        }
    }
}

/// Hashes a batch of files, in parallel, into a list ordered by relative path.
pub struct FileHasher {
    filter: SystemFileFilter,
    threads: Option<usize>,
    progress: Progress,
}

impl Default for FileHasher {
    fn default() -> Self {
        FileHasher::new(SystemFileFilter::default())
    }
}

impl FileHasher {
    pub fn new(filter: SystemFileFilter) -> Self {
        FileHasher { filter, threads: None, progress: Progress::disabled() }
    }

    /// Bound the worker pool. `None` uses rayon's global pool.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads.filter(|&n| n > 0);
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn filter(&self) -> &SystemFileFilter {
        &self.filter
    }

    /// Hash every file the filter keeps. The first unreadable file aborts the
    /// batch and nothing is returned for the files already hashed.
    pub fn hash_files(&self, files: Vec<RawFile>) -> Result<Vec<FileHash>> {
        let total = files.len();
        let kept: Vec<RawFile> = files
            .into_iter()
            .filter(|f| {
                let skip = self.filter.excludes(&f.relative_path);
                if skip {
                    tracing::debug!(path = %f.relative_path, "skipping system file");
                }
                !skip
            })
            .collect();
        tracing::info!(files = kept.len(), skipped = total - kept.len(), "hashing files");

        self.progress.set_stage("Hashing");
        self.progress.reset(kept.len() as u64, kept.iter().map(|f| f.size).sum());
        self.progress.start();
        let hashed = match self.threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(|| self.hash_all(&kept))
            }
            None => self.hash_all(&kept),
        };
        self.progress.stop();

        let mut hashed = hashed?;
        hashed.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        if let Some(dup) = hashed.windows(2).find(|w| w[0].relative_path == w[1].relative_path) {
            return Err(SealError::DuplicatePath(dup[0].relative_path.clone()));
        }
        Ok(hashed)
    }

    fn hash_all(&self, files: &[RawFile]) -> Result<Vec<FileHash>> {
        files.par_iter().map(|f| self.hash_one(f)).collect()
    }

    fn hash_one(&self, f: &RawFile) -> Result<FileHash> {
        let reader = f.source.open().map_err(|e| SealError::io(&f.relative_path, e))?;
        let (hash, read) =
            Digest::from_reader(reader).map_err(|e| SealError::io(&f.relative_path, e))?;
        if read != f.size {
            return Err(SealError::io(
                &f.relative_path,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("expected {} bytes, read {}", f.size, read),
                ),
            ));
        }
        tracing::debug!(path = %f.relative_path, size = f.size, hash = %hash, "hashed file");
        self.progress.file_done(read);
        Ok(FileHash {
            path: f.name.clone(),
            relative_path: f.relative_path.clone(),
            hash,
            size: f.size,
            last_modified: iso8601(f.last_modified),
        })
    }
}

/// Hash `files` with the default system-file filter on rayon's global pool.
pub fn hash_files(files: Vec<RawFile>) -> Result<Vec<FileHash>> {
    FileHasher::default().hash_files(files)
}
