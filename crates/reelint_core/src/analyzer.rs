//! The analysis capability the linter calls out to.
//!
//! Implementations wrap a vision-language model (or a test double). They get
//! the video and the active rule descriptions, and return raw findings that
//! the linter validates afterwards.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::AnalyzerError;
use crate::catalog::{RuleSet, RuleSpec};
use crate::format::VideoFormat;

/// Where the video comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    /// A remotely reachable URL (e.g. a YouTube link).
    Url(String),
    /// A local file.
    File(PathBuf),
}

impl VideoSource {
    /// Treats `http(s)://` input as a URL and anything else as a file path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&str> for VideoSource {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Everything an analyzer needs for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub source: VideoSource,
    pub format: VideoFormat,
    /// Active rules, in evaluation order.
    pub rules: Vec<RuleSpec>,
}

impl AnalysisRequest {
    pub fn new(source: VideoSource, rules: &RuleSet) -> Self {
        Self {
            source,
            format: rules.format(),
            rules: rules.rules().to_vec(),
        }
    }

    /// Content fingerprint used as a cache key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.source.to_string().as_bytes());
        hasher.update(&[0]);
        hasher.update(self.format.as_str().as_bytes());
        for rule in &self.rules {
            hasher.update(&[0]);
            hasher.update(rule.id.as_bytes());
            hasher.update(b":");
            hasher.update(rule.severity.as_str().as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// One unvalidated item returned by an analyzer.
///
/// Every field is optional and loosely typed; validation happens in the
/// linter so that one bad item never fails the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFinding {
    #[serde(default, alias = "ruleId", deserialize_with = "lenient_string")]
    pub rule_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,

    #[serde(default, alias = "timestamp", deserialize_with = "lenient_string")]
    pub evidence: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
}

impl RawFinding {
    /// A finding for a catalog rule.
    pub fn rule(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: Some(rule_id.into()),
            ..Self::default()
        }
    }

    /// A free-form finding.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Accepts strings, numbers and booleans as text; anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Evaluates a video against a rule set.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Returns raw findings for the request.
    ///
    /// This is the one slow, I/O-bound step of a lint run.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Vec<RawFinding>, AnalyzerError>;
}

/// Decides which format a video is.
#[async_trait]
pub trait FormatClassifier: Send + Sync {
    async fn classify(&self, source: &VideoSource) -> Result<VideoFormat, AnalyzerError>;
}
