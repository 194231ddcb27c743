//! Error types for Gemini API operations.

use reelint_core::AnalyzerError;
use thiserror::Error;

/// Error type for Gemini API operations.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network request failed.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Gemini API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// No API key was configured.
    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    /// The base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildError(String),

    /// The uploaded file entered the `FAILED` state.
    #[error("File processing failed for {0}")]
    ProcessingFailed(String),

    /// The uploaded file did not become active in time.
    #[error("File {name} was not active after {attempts} poll(s)")]
    PollExhausted { name: String, attempts: u32 },

    /// The model refused to answer.
    #[error("Request blocked: {0}")]
    Blocked(String),

    /// The response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reading the local video failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GeminiError {
    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

impl From<GeminiError> for AnalyzerError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::InvalidResponse(_) => AnalyzerError::invalid_response(err.to_string()),
            GeminiError::ProcessingFailed(_)
            | GeminiError::PollExhausted { .. }
            | GeminiError::Blocked(_) => AnalyzerError::processing(err.to_string()),
            _ => AnalyzerError::request(err.to_string()),
        }
    }
}
