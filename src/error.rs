// src/error.rs
use thiserror::Error;

/// Failures that can occur while collecting candidate data.
///
/// Per-source variants (`Fetch`, `NotFound`, `RateLimitExceeded`, `TimedOut`)
/// are recorded in the response status map and never abort the aggregate;
/// document errors are fatal to resume parsing and surface as 400.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Unsupported file format: {0}. Only PDF and DOCX resumes are supported")]
    UnsupportedFormat(String),

    #[error("Failed to parse document: {0}")]
    DocumentParse(String),

    #[error("Failed to fetch {source_name}: {reason}")]
    Fetch {
        source_name: &'static str,
        reason: String,
    },

    #[error("Profile not found")]
    NotFound,

    #[error("Rate limit exceeded. Please wait before making another request")]
    RateLimitExceeded,

    #[error("Request timed out")]
    TimedOut,

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

impl CollectError {
    pub fn fetch(source: &'static str, reason: impl Into<String>) -> Self {
        Self::Fetch {
            source_name: source,
            reason: reason.into(),
        }
    }
}
