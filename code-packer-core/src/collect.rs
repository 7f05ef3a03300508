//! Collector: walk a root directory and list every regular file, relative to the root.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::contract::PackError;

/// File names that are never collected.
///
/// Matching is on the basename only, so an excluded name is skipped in every
/// directory of the tree.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    names: BTreeSet<String>,
    bundle_pattern: Option<Regex>,
}

impl Exclusions {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            bundle_pattern: None,
        }
    }

    /// Also exclude files named like bundles: `<prefix>_<n>.txt`.
    pub fn with_bundle_prefix(mut self, prefix: &str) -> Result<Self, PackError> {
        let pattern = format!(r"^{}_\d+\.txt$", regex::escape(prefix));
        self.bundle_pattern = Some(Regex::new(&pattern)?);
        Ok(self)
    }

    pub fn is_excluded(&self, file_name: &OsStr) -> bool {
        let name = file_name.to_string_lossy();
        if self.names.contains(name.as_ref()) {
            return true;
        }
        self.bundle_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(&name))
    }
}

/// Recursively collect all regular files under `root`, hidden ones included.
///
/// Within a directory entries are visited in name order and the directory's
/// own files come before anything found in its subdirectories. Symlinked
/// directories are not descended and dangling symlinks are skipped with a
/// warning. Any listing failure aborts the walk.
pub fn collect_files(root: &Path, exclusions: &Exclusions) -> Result<Vec<PathBuf>, PackError> {
    info!(root = %root.display(), "Collecting files");
    let mut files = Vec::new();

    fn visit_dir(
        dir: &Path,
        root: &Path,
        exclusions: &Exclusions,
        results: &mut Vec<PathBuf>,
    ) -> Result<(), PackError> {
        let walk_err = |source| PackError::Walk {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = fs::read_dir(dir)
            .map_err(walk_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(walk_err)?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(walk_err)?;
            if file_type.is_dir() {
                subdirs.push(path);
            } else if path.is_file() {
                if exclusions.is_excluded(&entry.file_name()) {
                    debug!(path = %path.display(), "Skipping excluded file");
                    continue;
                }
                // `path` was built by joining onto `root`, so the prefix is always there.
                let rel_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                debug!(path = %rel_path.display(), "Collected file");
                results.push(rel_path);
            } else if file_type.is_symlink() && !path.exists() {
                warn!(path = %path.display(), "Skipping dangling symlink");
            } else {
                debug!(path = %path.display(), "Skipping non-regular entry");
            }
        }

        for subdir in subdirs {
            visit_dir(&subdir, root, exclusions, results)?;
        }
        Ok(())
    }

    if let Err(e) = visit_dir(root, root, exclusions, &mut files) {
        error!(error = %e, "Error occurred while collecting files");
        return Err(e);
    }

    info!(count = files.len(), "Completed collecting files");
    Ok(files)
}
