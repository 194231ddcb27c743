//! Lint result types.

use serde::{Deserialize, Serialize};

use crate::format::{Category, VideoFormat};
use crate::issue_key::IssueKey;
use crate::scoring::Scores;
use crate::severity::Severity;

/// A validated, severity-resolved, categorized finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Catalog rule that matched; `None` for free-form issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Join key against user preferences.
    pub issue_key: IssueKey,

    pub message: String,

    /// Timestamp or segment reference in the video. May be empty.
    #[serde(default)]
    pub evidence: String,

    /// Effective severity, after user overrides.
    pub severity: Severity,

    /// Severity assigned by the rule or analyzer before overrides.
    pub original_severity: Severity,

    pub category: Category,
}

impl Violation {
    /// Returns true if a user preference changed the severity.
    pub fn is_overridden(&self) -> bool {
        self.severity != self.original_severity
    }
}

/// Outcome of one lint run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResult {
    pub format: VideoFormat,

    /// Violations, most severe first.
    pub violations: Vec<Violation>,

    pub scores: Scores,

    /// Number of analyzer findings discarded as malformed.
    #[serde(default)]
    pub dropped_findings: usize,
}

impl LintResult {
    /// Returns true if any violation resolved to `critical`.
    pub fn has_critical(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Critical)
    }

    /// Counts violations by effective severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}
