//! Core linter engine.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::analyzer::{AnalysisRequest, Analyzer, VideoSource};
use crate::catalog::RuleSet;
use crate::finding::normalize_finding;
use crate::format::VideoFormat;
use crate::preferences::PreferenceMap;
use crate::result::LintResult;
use crate::scoring::compute_scores;
use crate::{AnalyzerError, LinterConfig, LinterError};

/// The core linter engine.
///
/// Orchestrates one evaluation: rule selection, the analyzer call, finding
/// validation, preference resolution and scoring. Holds no mutable state, so
/// a single instance can serve concurrent runs.
pub struct Linter {
    /// Linter configuration.
    config: LinterConfig,
    /// Analysis capability.
    analyzer: Arc<dyn Analyzer>,
}

impl Linter {
    /// Creates a new linter with the given configuration and analyzer.
    pub fn new(config: LinterConfig, analyzer: Arc<dyn Analyzer>) -> Result<Self, LinterError> {
        config.validate()?;
        Ok(Self { config, analyzer })
    }

    /// Active rules for `format` after applying the configured rule options.
    pub fn rule_set(&self, format: VideoFormat) -> Result<RuleSet, LinterError> {
        RuleSet::for_format(format, &self.config.rules)
    }

    /// Lints a video given the format by name.
    ///
    /// An unrecognized format fails before the analyzer is called.
    pub async fn lint(
        &self,
        source: &VideoSource,
        format: &str,
        preferences: &PreferenceMap,
    ) -> Result<LintResult, LinterError> {
        let format: VideoFormat = format.parse()?;
        self.lint_format(source, format, preferences).await
    }

    /// Lints a video of a known format.
    pub async fn lint_format(
        &self,
        source: &VideoSource,
        format: VideoFormat,
        preferences: &PreferenceMap,
    ) -> Result<LintResult, LinterError> {
        let start = Instant::now();
        let rules = self.rule_set(format)?;
        let request = AnalysisRequest::new(source.clone(), &rules);

        debug!(
            "Analyzing {} as {} with {} rule(s)",
            source,
            format,
            rules.len()
        );

        let timeout = self.config.analyzer.timeout();
        let findings = tokio::time::timeout(timeout, self.analyzer.analyze(&request))
            .await
            .map_err(|_| AnalyzerError::Timeout(timeout))??;

        let total = findings.len();
        let mut violations = Vec::with_capacity(total);
        let mut dropped_findings = 0;

        for raw in &findings {
            match normalize_finding(raw, &rules, preferences) {
                Ok(violation) => violations.push(violation),
                Err(e) => {
                    warn!("Dropping finding from analyzer: {}", e);
                    dropped_findings += 1;
                }
            }
        }

        // Stable, so analyzer order is kept within a severity.
        violations.sort_by_key(|v| v.severity.rank());
        let scores = compute_scores(&violations, &self.config.scoring.weights);

        info!(
            "Linted {} in {:?}: {} violation(s), {} dropped, overall {}",
            source,
            start.elapsed(),
            violations.len(),
            dropped_findings,
            scores.overall
        );

        Ok(LintResult {
            format,
            violations,
            scores,
            dropped_findings,
        })
    }
}
