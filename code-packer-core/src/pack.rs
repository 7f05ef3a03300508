//! Orchestration of a pack run: collect → partition → write.
//!
//! Fully sequential. Each bundle file is created, written through a
//! `BufWriter`, flushed and closed before the next one is opened. Errors
//! other than per-file read failures stop the run immediately; bundles that
//! were already written stay on disk.

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::{error, info, info_span};

use crate::bundle::{bundle_file_name, write_bundle};
use crate::collect::{collect_files, Exclusions};
use crate::config::PackConfig;
use crate::contract::{BundleReport, ContentReader, FsReader, PackError, PackReport};
use crate::partition::{chunk_size, partition};

/// Pack the configured tree, reading file contents from disk.
pub fn pack_tree(config: &PackConfig) -> Result<PackReport, PackError> {
    pack(config, &FsReader)
}

/// Pack the configured tree, reading file contents through `reader`.
pub fn pack<R>(config: &PackConfig, reader: &R) -> Result<PackReport, PackError>
where
    R: ContentReader + ?Sized,
{
    let span = info_span!("pack", root = %config.root.display(), count = config.count.get());
    let _enter = span.enter();

    let mut exclusions = Exclusions::new(config.excluded_names.iter().cloned());
    if config.exclude_bundles {
        exclusions = exclusions.with_bundle_prefix(&config.bundle_prefix)?;
    }

    let files = collect_files(&config.root, &exclusions)?;
    if files.is_empty() {
        info!("No files collected, nothing to write");
        return Ok(PackReport {
            files_collected: 0,
            chunk_size: 0,
            bundles: Vec::new(),
        });
    }

    let chunk = chunk_size(files.len(), config.count);
    let groups = partition(&files, config.count);
    info!(
        files = files.len(),
        chunk,
        groups = groups.len(),
        "Partitioned collected files"
    );

    let mut bundles = Vec::with_capacity(groups.len());
    for (index, group) in groups.into_iter().enumerate().map(|(i, g)| (i + 1, g)) {
        let path = config
            .output_dir
            .join(bundle_file_name(&config.bundle_prefix, index));

        let file = File::create(&path).map_err(|source| {
            error!(error = %source, path = %path.display(), "Failed to create bundle");
            PackError::CreateBundle {
                path: path.clone(),
                source,
            }
        })?;
        let mut out = BufWriter::new(file);
        let tally = write_bundle(&mut out, &config.root, group, reader, config.decode)
            .and_then(|tally| out.flush().map(|_| tally))
            .map_err(|source| {
                error!(error = %source, path = %path.display(), "Failed to write bundle");
                PackError::WriteBundle {
                    path: path.clone(),
                    source,
                }
            })?;

        info!(
            bundle = index,
            path = %path.display(),
            files = group.len(),
            failed_reads = tally.failed_reads,
            skipped_binary = tally.skipped_binary,
            "Wrote bundle"
        );
        bundles.push(BundleReport {
            index,
            path,
            files: group.to_vec(),
            failed_reads: tally.failed_reads,
            skipped_binary: tally.skipped_binary,
        });
    }

    Ok(PackReport {
        files_collected: files.len(),
        chunk_size: chunk,
        bundles,
    })
}
