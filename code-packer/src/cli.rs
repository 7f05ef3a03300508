//!
//! This module implements the CLI interface for code-packer: argument parsing,
//! the argument-error policy, merging flags with the optional config file, and
//! the `run` entrypoint used by both `main()` and the integration tests.
//!
//! All pack logic (walking, partitioning, writing bundles) lives in
//! [`code_packer_core`]. This module is strictly glue.
//!
//! Precedence, lowest first: built-in defaults, `--config` file, flags.
use crate::load_config::{load_config, FileConfig};
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use code_packer_core::config::PackConfig;
use code_packer_core::contract::PackReport;
use code_packer_core::pack::pack_tree;
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const USAGE: &str = "Usage: code-packer [OPTIONS] <N>";

/// CLI for code-packer: split a directory tree into N text bundles.
#[derive(Parser, Debug)]
#[clap(
    name = "code-packer",
    version,
    // `-3` must reach the N parser as a bad value, not read as a flag
    allow_negative_numbers = true,
    about = "Concatenate every file under a directory into N bundles, each file under a path header"
)]
pub struct Cli {
    /// Number of bundles to split the files into (at least 1)
    #[clap(value_name = "N")]
    pub count: NonZeroUsize,

    /// Directory to collect from [default: the working directory]
    #[clap(long)]
    pub root: Option<PathBuf>,

    /// Directory to write bundles into [default: the root]
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Path to an optional YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Extra file name to leave out of every bundle (repeatable)
    #[clap(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,
}

/// Handle a failed `Cli::try_parse`.
///
/// A wrong number of arguments prints the usage line to stdout and exits with
/// status 1. Anything else (a non-integer or zero N, `--help`, `--version`)
/// goes through clap's own reporting.
pub fn exit_on_parse_error(err: clap::Error) -> ! {
    if is_argument_count_error(err.kind()) {
        tracing::error!(kind = ?err.kind(), "Wrong number of arguments");
        println!("{USAGE}");
        std::process::exit(1);
    }
    err.exit()
}

pub fn is_argument_count_error(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::MissingRequiredArgument
            | ErrorKind::UnknownArgument
            | ErrorKind::TooManyValues
            | ErrorKind::WrongNumberOfValues
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// Basenames excluded by default: the running binary and the package name.
pub fn default_excluded_names() -> Vec<String> {
    let mut names = vec![env!("CARGO_PKG_NAME").to_string()];
    if let Some(exe_name) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().map(|n| n.to_string_lossy().into_owned()))
    {
        if !names.contains(&exe_name) {
            names.push(exe_name);
        }
    }
    names
}

/// Merge defaults, the config file and flags into a [`PackConfig`].
pub fn build_pack_config(cli: &Cli, file: FileConfig, cwd: PathBuf) -> PackConfig {
    let root = cli.root.clone().unwrap_or(cwd);
    let mut config = PackConfig::new(root, cli.count);

    if let Some(output_dir) = cli.output_dir.clone().or(file.write.output_dir) {
        config.output_dir = output_dir;
    }
    if let Some(prefix) = file.write.prefix {
        config.bundle_prefix = prefix;
    }
    if let Some(decode) = file.write.decode {
        config.decode = decode;
    }
    if let Some(exclude_bundles) = file.collect.exclude_bundles {
        config.exclude_bundles = exclude_bundles;
    }

    let mut excluded = default_excluded_names();
    for name in file.collect.exclude.into_iter().chain(cli.exclude.iter().cloned()) {
        if !excluded.contains(&name) {
            excluded.push(name);
        }
    }
    config.excluded_names = excluded;
    config
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<PackReport> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let file_config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let config = build_pack_config(&cli, file_config, cwd);
    config.trace_loaded();

    let report = match pack_tree(&config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Packing failed");
            return Err(anyhow::Error::new(e).context("Packing failed"));
        }
    };

    if report.files_collected == 0 {
        println!("No files to pack.");
    } else {
        println!("Created {} files.", report.bundles_written());
    }
    tracing::info!(?report, "Packing complete");
    Ok(report)
}
