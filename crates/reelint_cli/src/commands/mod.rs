//! Subcommand implementations

pub mod init;
pub mod lint;
pub mod prefs;
pub mod rules;

use miette::{IntoDiagnostic, Result};
use tracing::info;

use reelint_core::LinterConfig;

use crate::cli::Cli;

/// Loads `--config`, or the first config file found in the working directory.
pub fn load_config(cli: &Cli) -> Result<LinterConfig> {
    if let Some(ref path) = cli.config {
        return LinterConfig::from_file(path).into_diagnostic();
    }

    if let Some(path) = LinterConfig::discover(".") {
        info!("Using config: {}", path.display());
        return LinterConfig::from_file(&path).into_diagnostic();
    }

    info!("No config file found, using defaults");
    Ok(LinterConfig::new())
}
