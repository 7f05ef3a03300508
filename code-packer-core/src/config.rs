use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{debug, info};

/// File name prefix of the bundles: `package_1.txt`, `package_2.txt`, ...
pub const DEFAULT_BUNDLE_PREFIX: &str = "package";

/// Everything a single pack run needs. Nothing is read from ambient process state.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Directory whose tree is collected; bundle headers are relative to it.
    pub root: PathBuf,
    /// Directory the bundles are written into.
    pub output_dir: PathBuf,
    /// Requested number of bundles. Fewer are produced when there are too few files.
    pub count: NonZeroUsize,
    pub bundle_prefix: String,
    /// Basenames that are never collected, wherever they sit in the tree.
    pub excluded_names: Vec<String>,
    /// Also skip files named like our own bundles (`<prefix>_<n>.txt`).
    pub exclude_bundles: bool,
    pub decode: DecodePolicy,
}

impl PackConfig {
    pub fn new(root: impl Into<PathBuf>, count: NonZeroUsize) -> Self {
        let root = root.into();
        Self {
            output_dir: root.clone(),
            root,
            count,
            bundle_prefix: DEFAULT_BUNDLE_PREFIX.to_string(),
            excluded_names: Vec::new(),
            exclude_bundles: true,
            decode: DecodePolicy::default(),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            root = %self.root.display(),
            output_dir = %self.output_dir.display(),
            count = self.count.get(),
            excluded = self.excluded_names.len(),
            decode = ?self.decode,
            "Loaded PackConfig"
        );
        debug!(?self, "PackConfig loaded (full debug)");
    }
}

/// How file bytes that are not valid UTF-8 end up in a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodePolicy {
    /// Drop undecodable byte sequences, keep the rest.
    #[default]
    Lenient,
    /// Substitute U+FFFD for undecodable sequences.
    Replace,
    /// Write a one-line marker instead of content for anything that is not plain UTF-8 text.
    SkipBinary,
}
