//! CLI command implementations for `qlens`.
//!
//! Each subcommand is implemented in its own module:
//!
//! - [`serve`] -- HTTP server.
//! - [`predict`] -- Offline scoring of a CSV file.
//! - [`transform`] -- Feature vectors of a CSV file.
//! - [`check`] -- Artifact bundle validation.
//! - [`config_cmd`] -- Resolved configuration display.

pub mod check;
pub mod config_cmd;
pub mod predict;
pub mod serve;
pub mod transform;

use std::path::{Path, PathBuf};

use anyhow::Context;

use quotelens_core::InferenceService;
use quotelens_core::config_loader;
use quotelens_types::config::Config;

/// Load configuration from the given path override or via auto-discovery.
///
/// Discovery order: `--config`, `QUOTELENS_CONFIG`, `./quotelens.json`,
/// `~/.quotelens/config.json`, then built-in defaults.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let explicit = config_override.map(Path::new);
    Ok(config_loader::load_config(explicit)?)
}

/// Load config, bundle and classifier; any failure is fatal.
pub fn load_service(config_override: Option<&str>) -> anyhow::Result<(Config, InferenceService)> {
    let (config, _) = load_config(config_override)?;
    let service = InferenceService::from_config(&config).with_context(|| {
        format!(
            "failed to load artifacts from {}",
            config.artifacts.dir.display()
        )
    })?;
    Ok((config, service))
}

/// Read a CSV input file.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
