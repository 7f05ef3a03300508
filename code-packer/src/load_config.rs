/// `load_config` module: loads an optional YAML config file into [`FileConfig`].
///
/// This is the only place user-supplied YAML is parsed. Every key is optional;
/// unknown keys are rejected so typos do not silently fall back to defaults.
///
/// ```yaml
/// collect:
///   exclude: [Cargo.lock]
///   exclude_bundles: true
/// write:
///   output_dir: ./bundles
///   prefix: package
///   decode: lenient   # lenient | replace | skip-binary
/// ```
///
/// # Errors
/// Read and parse failures are `anyhow::Error`s surfaced at the CLI boundary.
use anyhow::Result;
use code_packer_core::config::DecodePolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub collect: CollectSection,
    #[serde(default)]
    pub write: WriteSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectSection {
    /// Extra basenames to leave out, on top of the built-in ones.
    #[serde(default)]
    pub exclude: Vec<String>,
    pub exclude_bundles: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteSection {
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub decode: Option<DecodePolicy>,
}

/// Loads a YAML config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file deserializes as YAML null; treat it as "all defaults".
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(FileConfig::default());
    }

    let conf = match serde_yaml::from_str::<FileConfig>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Some(prefix) = &conf.write.prefix {
        if let Err(e) = validate_prefix(prefix) {
            error!(error = %e, config_path = ?path_ref, "Invalid write.prefix in config");
            return Err(e);
        }
    }
    Ok(conf)
}

/// A bundle prefix must be a plain file name stem: bundles are written
/// directly into the output directory and earlier bundles are recognised by
/// basename on the next run.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        anyhow::bail!("Invalid write.prefix: must not be empty");
    }
    if prefix.chars().any(std::path::is_separator) || prefix.contains("..") {
        anyhow::bail!(
            "Invalid write.prefix {:?}: must not contain path separators or '..'",
            prefix
        );
    }
    Ok(())
}
