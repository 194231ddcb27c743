//! # reelint_analyzer
//!
//! Gemini-backed implementation of the reelint analysis capability.
//!
//! ```rust,ignore
//! use reelint_analyzer::GeminiAnalyzer;
//!
//! let analyzer = GeminiAnalyzer::builder()
//!     .api_key(std::env::var("GEMINI_API_KEY")?)
//!     .build()?;
//! ```

mod client;
pub mod error;
pub mod prompt;
pub mod response;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT, GeminiAnalyzer, GeminiAnalyzerBuilder,
};
pub use error::GeminiError;
pub use response::{parse_findings, parse_format};
