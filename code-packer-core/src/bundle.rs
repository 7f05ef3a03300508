//! Writer primitives: bundle naming, header and marker lines, decoding, and
//! streaming one group of files into an output.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::DecodePolicy;
use crate::contract::ContentReader;

/// `<prefix>_<index>.txt`, index being 1-based.
pub fn bundle_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index}.txt")
}

/// Line that opens every entry, preceded by a blank line.
pub fn header_line(rel_path: &Path) -> String {
    format!("\n===== FILE: {} =====\n", rel_path.display())
}

/// Written instead of content when reading a file fails.
pub fn read_error_marker(err: &io::Error) -> String {
    format!("[ERROR READING FILE: {err}]\n")
}

pub fn binary_marker(len: usize) -> String {
    format!("[SKIPPED BINARY FILE: {len} bytes]\n")
}

/// Result of decoding one file's bytes.
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    Text(String),
    Binary { len: usize },
}

pub fn decode(bytes: Vec<u8>, policy: DecodePolicy) -> Decoded {
    match policy {
        DecodePolicy::Lenient => match String::from_utf8(bytes) {
            Ok(text) => Decoded::Text(text),
            Err(e) => Decoded::Text(drop_invalid_utf8(e.as_bytes())),
        },
        DecodePolicy::Replace => Decoded::Text(String::from_utf8_lossy(&bytes).into_owned()),
        DecodePolicy::SkipBinary => {
            if bytes.contains(&0) {
                return Decoded::Binary { len: bytes.len() };
            }
            match String::from_utf8(bytes) {
                Ok(text) => Decoded::Text(text),
                Err(e) => Decoded::Binary {
                    len: e.as_bytes().len(),
                },
            }
        }
    }
}

fn drop_invalid_utf8(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Per-bundle counts collected while writing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BundleTally {
    pub written: usize,
    pub failed_reads: usize,
    pub skipped_binary: usize,
}

/// Write every file of `group` into `out`: a header, then the decoded content
/// or an inline marker. Read failures never stop the group; only failures of
/// `out` itself are returned.
pub fn write_bundle<W, R>(
    out: &mut W,
    root: &Path,
    group: &[PathBuf],
    reader: &R,
    policy: DecodePolicy,
) -> io::Result<BundleTally>
where
    W: Write,
    R: ContentReader + ?Sized,
{
    let mut tally = BundleTally::default();
    for rel_path in group {
        out.write_all(header_line(rel_path).as_bytes())?;
        match reader.read(&root.join(rel_path)) {
            Ok(bytes) => match decode(bytes, policy) {
                Decoded::Text(text) => {
                    debug!(path = %rel_path.display(), size = text.len(), "Appended file");
                    out.write_all(text.as_bytes())?;
                    tally.written += 1;
                }
                Decoded::Binary { len } => {
                    debug!(path = %rel_path.display(), size = len, "Skipped binary file");
                    out.write_all(binary_marker(len).as_bytes())?;
                    tally.skipped_binary += 1;
                }
            },
            Err(e) => {
                warn!(error = %e, path = %rel_path.display(), "Failed to read file, writing marker");
                out.write_all(read_error_marker(&e).as_bytes())?;
                tally.failed_reads += 1;
            }
        }
    }
    Ok(tally)
}
