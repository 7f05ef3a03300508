//! # contract: seams and shared types of a pack run
//!
//! - [`ContentReader`] is the only place file contents are read. The real
//!   implementation is [`FsReader`]; tests use the `mockall` generated
//!   `MockContentReader` to inject read failures.
//! - [`PackReport`] / [`BundleReport`] describe what a run wrote.
//! - [`PackError`] covers the failures that abort a run. Per-file read errors
//!   are never a `PackError`: they are written into the bundle instead.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use mockall::automock;

/// Reads the raw bytes of one collected file.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ContentReader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads straight from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl ContentReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackReport {
    pub files_collected: usize,
    /// Files per bundle; zero when nothing was collected.
    pub chunk_size: usize,
    pub bundles: Vec<BundleReport>,
}

impl PackReport {
    pub fn bundles_written(&self) -> usize {
        self.bundles.len()
    }
}

/// One written bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    /// 1-based, matches the number in the file name.
    pub index: usize,
    pub path: PathBuf,
    /// Relative paths, in the order they appear in the bundle.
    pub files: Vec<PathBuf>,
    pub failed_reads: usize,
    pub skipped_binary: usize,
}

#[derive(Debug)]
pub enum PackError {
    /// Listing a directory (or one of its entries) failed.
    Walk { path: PathBuf, source: io::Error },
    CreateBundle { path: PathBuf, source: io::Error },
    WriteBundle { path: PathBuf, source: io::Error },
    /// The bundle name pattern could not be compiled.
    Pattern(regex::Error),
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackError::Walk { path, source } => {
                write!(f, "failed to walk {}: {}", path.display(), source)
            }
            PackError::CreateBundle { path, source } => {
                write!(f, "failed to create bundle {}: {}", path.display(), source)
            }
            PackError::WriteBundle { path, source } => {
                write!(f, "failed to write bundle {}: {}", path.display(), source)
            }
            PackError::Pattern(e) => write!(f, "invalid bundle name pattern: {e}"),
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::Walk { source, .. }
            | PackError::CreateBundle { source, .. }
            | PackError::WriteBundle { source, .. } => Some(source),
            PackError::Pattern(e) => Some(e),
        }
    }
}

impl From<regex::Error> for PackError {
    fn from(e: regex::Error) -> Self {
        PackError::Pattern(e)
    }
}
