//! Linter error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that abort a lint run.
#[derive(Debug, Error)]
pub enum LinterError {
    /// The requested format is not one of the recognized formats.
    #[error("Invalid format: {0:?} (expected talking_head, gameplay, demo or other)")]
    InvalidFormat(String),

    /// The analysis capability failed or timed out.
    #[error("Analyzer failure: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LinterError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true for failures of the external analysis step.
    pub fn is_analyzer_failure(&self) -> bool {
        matches!(self, Self::Analyzer(_))
    }
}

/// Errors reported by an [`Analyzer`](crate::Analyzer) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
    /// The analysis did not finish within the allotted time.
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    /// The request to the backing service failed.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with something that could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service accepted the video but could not process it.
    #[error("Processing failed: {0}")]
    Processing(String),
}

impl AnalyzerError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }
}

/// Why a single raw finding was dropped.
///
/// Never fatal to a run: the finding is skipped and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindingError {
    #[error("finding has no message and no known rule")]
    MissingMessage,

    #[error("unknown severity {0:?}")]
    UnknownSeverity(String),

    #[error("finding for {0:?} has no severity")]
    MissingSeverity(String),

    #[error("unknown category {0:?}")]
    UnknownCategory(Option<String>),

    #[error("rule {0:?} is disabled")]
    DisabledRule(String),
}
