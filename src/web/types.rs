// src/web/types.rs
use crate::types::{CandidateProfile, SourceStatusMap};
use chrono::{DateTime, Utc};
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::serde::Serialize;

/// Multipart submission for `/collect-candidate-data`. All parts are
/// optional; links found in the resume fill in whatever is missing.
#[derive(FromForm)]
pub struct CollectForm<'f> {
    pub resume_file: Option<TempFile<'f>>,
    pub portfolio_url: Option<String>,
    pub github_username: Option<String>,
    pub instagram_username: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CollectResponse {
    /// "success" when every contacted source succeeded, "partial" when at
    /// least one failed.
    pub status: String,
    pub data: CandidateProfile,
    pub sources: SourceStatusMap,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PortfolioResponse {
    pub status: String,
    pub data: CandidateProfile,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: String, error_code: &str, suggestions: Vec<String>) -> Self {
        Self {
            success: false,
            error,
            error_code: error_code.to_string(),
            suggestions,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
