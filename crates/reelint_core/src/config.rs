//! Linter configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::LinterError;
use crate::scoring::ScoreWeights;
use crate::severity::{Severity, SeverityError};

use jsonschema::Validator;
use std::sync::OnceLock;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Configuration for the linter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinterConfig {
    /// Analysis backend settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Score aggregation settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Per-rule configuration (enable/disable/baseline severity).
    #[serde(default)]
    pub rules: BTreeMap<String, RuleOption>,

    /// Analysis result cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Settings for the analysis capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Model name passed to the backend.
    pub model: String,
    /// Base URL of the backend API.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Upper bound for a single analysis, in seconds.
    pub timeout_secs: u64,
    /// How many times to check on an uploaded video before giving up.
    pub poll_attempts: u32,
    /// Delay between upload status checks, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 120,
            poll_attempts: 60,
            poll_interval_ms: 1000,
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Score aggregation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Relative weight of each category in the overall score.
    #[serde(default)]
    pub weights: ScoreWeights,
}

/// Analysis cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 3600,
            max_entries: 128,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Configuration for a single rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleOption {
    /// Rule is enabled/disabled (boolean).
    Enabled(bool),
    /// Rule is enabled with a baseline severity ("critical", "moderate", "minor"), or "off".
    Severity(String),
}

impl RuleOption {
    /// Returns whether the rule is enabled.
    pub fn is_enabled(&self) -> bool {
        match self {
            RuleOption::Enabled(enabled) => *enabled,
            RuleOption::Severity(s) => s != "off",
        }
    }

    /// Baseline severity requested by this option, if any.
    ///
    /// `ignored` is refused; muting an issue is a user preference.
    pub fn severity_override(&self) -> Result<Option<Severity>, SeverityError> {
        match self {
            RuleOption::Enabled(_) => Ok(None),
            RuleOption::Severity(s) => match s.parse::<Severity>()? {
                severity if severity.is_assignable() => Ok(Some(severity)),
                severity => Err(SeverityError::NotAssignable(severity)),
            },
        }
    }
}

impl LinterConfig {
    /// File names searched by [`LinterConfig::discover`], in priority order.
    pub const CONFIG_FILES: &'static [&'static str] = &[".reelint.json", "reelint.json"];

    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a configuration file in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LinterError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| LinterError::config(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parses configuration from JSON string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, LinterError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| LinterError::config(format!("Invalid JSON: {}", e)))?;

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(LinterError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        let config: Self = serde_json::from_value(value)
            .map_err(|e| LinterError::config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks constraints the schema cannot express.
    pub fn validate(&self) -> Result<(), LinterError> {
        if self.scoring.weights.total() <= 0.0 {
            return Err(LinterError::config(
                "Config validation failed: scoring weights must not all be zero",
            ));
        }
        for (id, option) in self.rules.iter().filter(|(_, option)| option.is_enabled()) {
            option.severity_override().map_err(|e| {
                LinterError::config(format!("Config validation failed: rule '{}': {}", id, e))
            })?;
        }
        Ok(())
    }

    /// Computes a hash of the configuration.
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
