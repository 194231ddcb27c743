//! reelint CLI
//!
//! AI-assisted linter for short-form video.

mod cli;
mod commands;
mod output;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_critical) => {
            if has_critical {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

/// Runs the selected command. `Ok(true)` means a critical violation was found.
fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Commands::Lint {
            source,
            format,
            user,
            prefs,
            output,
            no_cache,
        } => commands::lint::run_lint(
            &cli,
            &commands::lint::LintArgs {
                source,
                format,
                user: user.as_deref(),
                prefs,
                output: *output,
                no_cache: *no_cache,
            },
        ),
        Commands::Rules { format, output } => {
            commands::rules::run_rules(&cli, format.as_deref(), *output)?;
            Ok(false)
        }
        Commands::Prefs { command } => {
            commands::prefs::run_prefs(&cli, command)?;
            Ok(false)
        }
        Commands::Init { force } => {
            commands::init::run_init(*force)?;
            Ok(false)
        }
    }
}
