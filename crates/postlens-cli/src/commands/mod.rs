//! Subcommand implementations.

pub mod analyze;
pub mod config;
pub mod models;
pub mod suggest;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::debug;

use postlens_core::PostlensConfig;

/// Output format shared by commands that print results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text
    Text,
}

/// Load the configuration file, falling back to defaults when it does not
/// exist yet.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<PostlensConfig> {
    let path = config_file_path(explicit);
    if path.exists() {
        debug!("Loading config from {}", path.display());
        return Ok(PostlensConfig::from_file(&path)?);
    }
    debug!("No config at {}, using defaults", path.display());
    Ok(PostlensConfig::default())
}

/// Config file location: the `--config` argument or the per-user default.
pub fn config_file_path(explicit: Option<&str>) -> PathBuf {
    match explicit {
        Some(path) => PathBuf::from(path),
        None => config::default_config_path(),
    }
}

/// Directory holding the OCR model files.
///
/// An explicit flag wins; a configured directory is used when it exists or
/// was set to an absolute path; otherwise the per-user data directory.
pub fn resolve_model_dir(flag: Option<&Path>, config: &PostlensConfig) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    let configured = &config.ocr.model_dir;
    if configured.is_absolute() || configured.exists() {
        configured.clone()
    } else {
        models::default_model_dir()
    }
}
