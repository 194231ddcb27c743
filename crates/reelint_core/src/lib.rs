//! # reelint_core
//!
//! Core linting engine for short-form video.
//!
//! This crate provides:
//! - The main `Linter` orchestrator
//! - Per-format rule catalogs and the severity model
//! - Stable issue keys and scoring
//! - User preference stores and severity voting
//! - Configuration loading and analysis caching
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reelint_core::{Linter, LinterConfig, PreferenceMap, VideoSource};
//!
//! let config = LinterConfig::from_file(".reelint.json")?;
//! let linter = Linter::new(config, Arc::new(my_analyzer))?;
//!
//! let source = VideoSource::parse("https://youtu.be/abc");
//! let result = linter.lint(&source, "talking_head", &PreferenceMap::new()).await?;
//! println!("overall score: {}", result.scores.overall);
//! ```

pub mod analyzer;
mod cache;
pub mod catalog;
mod config;
mod error;
mod finding;
mod format;
mod issue_key;
mod linter;
pub mod preferences;
mod result;
mod scoring;
mod severity;

pub use analyzer::{AnalysisRequest, Analyzer, FormatClassifier, RawFinding, VideoSource};
pub use cache::{AnalysisCache, CachedAnalyzer};
pub use catalog::{RuleSet, RuleSpec, find_rule, rules_for};
pub use config::{AnalyzerConfig, CacheConfig, LinterConfig, RuleOption, ScoringConfig};
pub use error::{AnalyzerError, FindingError, LinterError};
pub use finding::normalize_finding;
pub use format::{Category, VideoFormat};
pub use issue_key::{AI_KEY_PREFIX, IssueKey, issue_key};
pub use linter::Linter;
pub use preferences::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceMap,
    PreferenceStore, PreferenceUpdate, UserIssuePreference, Vote,
};
pub use result::{LintResult, Violation};
pub use scoring::{BASELINE_SCORE, ScoreWeights, Scores, compute_scores};
pub use severity::{
    Severity, SeverityError, get_next_severity, get_prev_severity, resolve_effective_severity,
};

#[cfg(test)]
pub mod test_utils;
