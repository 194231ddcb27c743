//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default location of the preference file, relative to the working directory.
pub const DEFAULT_PREFS_FILE: &str = ".reelint/preferences.json";

/// reelint - AI-assisted linter for short-form video
#[derive(Parser)]
#[command(name = "reelint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint a video
    Lint {
        /// Video URL or local file path
        source: String,

        /// Video format (talking_head, gameplay, demo, other) or "auto" to classify
        #[arg(short, long, default_value = "auto")]
        format: String,

        /// Apply this user's severity preferences
        #[arg(short, long)]
        user: Option<String>,

        /// Preference file
        #[arg(long, default_value = DEFAULT_PREFS_FILE)]
        prefs: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,

        /// Bypass the analysis cache even if enabled in config
        #[arg(long)]
        no_cache: bool,
    },

    /// List rules
    Rules {
        /// Only show rules for this format
        #[arg(short, long)]
        format: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Manage per-user severity preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Show stored preferences
    List {
        #[command(flatten)]
        store: PrefsArgs,
    },

    /// Pin an issue to a severity
    Set {
        /// Issue key (rule id or ai_* key)
        issue_key: String,

        /// Severity to apply (critical, moderate, minor, ignored)
        severity: String,

        /// Severity before the override; defaults to the rule's severity
        #[arg(long)]
        original: Option<String>,

        #[command(flatten)]
        store: PrefsArgs,
    },

    /// Make an issue one step more severe
    Up {
        /// Issue key (rule id or ai_* key)
        issue_key: String,

        /// Current severity, required for issues without a rule
        #[arg(long)]
        from: Option<String>,

        #[command(flatten)]
        store: PrefsArgs,
    },

    /// Make an issue one step less severe
    Down {
        /// Issue key (rule id or ai_* key)
        issue_key: String,

        /// Current severity, required for issues without a rule
        #[arg(long)]
        from: Option<String>,

        #[command(flatten)]
        store: PrefsArgs,
    },

    /// Remove an override
    Reset {
        /// Issue key (rule id or ai_* key)
        issue_key: String,

        #[command(flatten)]
        store: PrefsArgs,
    },
}

/// Where preferences are read from and written to.
#[derive(Args, Clone)]
pub struct PrefsArgs {
    /// User whose preferences to use
    #[arg(short, long, default_value = "default")]
    pub user: String,

    /// Preference file
    #[arg(long, default_value = DEFAULT_PREFS_FILE)]
    pub prefs: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
