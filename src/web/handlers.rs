// src/web/handlers.rs
//! Endpoint handlers: request validation, document loading, and the
//! hand-off to the aggregator.

use crate::aggregator::SourcePlan;
use crate::document::load_document;
use crate::error::CollectError;
use crate::web::types::{CollectForm, CollectResponse, ErrorResponse, PortfolioResponse};
use crate::web::ServerState;
use chrono::Utc;
use regex::Regex;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::OnceLock;
use tracing::{error, info};

const MAX_RESUME_SIZE: u64 = 10 * 1024 * 1024;

type HandlerError = Custom<Json<ErrorResponse>>;

fn bad_request(error: String, code: &str, suggestions: Vec<String>) -> HandlerError {
    Custom(
        Status::BadRequest,
        Json(ErrorResponse::new(error, code, suggestions)),
    )
}

pub async fn collect_candidate_data_handler(
    mut upload: Form<CollectForm<'_>>,
    state: &State<ServerState>,
) -> Result<Custom<Json<CollectResponse>>, HandlerError> {
    state.request_limiter.acquire().await.map_err(|_| {
        Custom(
            Status::TooManyRequests,
            Json(ErrorResponse::new(
                CollectError::RateLimitExceeded.to_string(),
                "RATE_LIMITED",
                vec!["Wait for the current window to pass and retry".to_string()],
            )),
        )
    })?;

    // Resume first: a corrupt or unsupported file is fatal, since no
    // candidate data can be derived from it.
    let resume_text = match &mut upload.resume_file {
        Some(file) => Some(read_resume_text(file).await?),
        None => None,
    };

    let direct = SourcePlan {
        portfolio_url: upload.portfolio_url.clone().filter(|s| !s.is_empty()),
        github_username: upload.github_username.clone().filter(|s| !s.is_empty()),
        instagram_username: upload.instagram_username.clone().filter(|s| !s.is_empty()),
    };

    let outcome = state.aggregator.collect(resume_text.as_deref(), direct).await;

    let degraded = outcome.all_contacted_failed() && !outcome.any_source_ok();
    let status = if outcome.sources.values().any(|s| s.is_failure()) {
        "partial"
    } else {
        "success"
    };

    let response = CollectResponse {
        status: status.to_string(),
        data: outcome.profile,
        sources: outcome.sources,
        timestamp: Utc::now(),
    };

    if degraded {
        error!("All contacted sources failed for this submission");
        return Ok(Custom(Status::BadGateway, Json(response)));
    }
    Ok(Custom(Status::Ok, Json(response)))
}

pub async fn scrape_portfolio_handler(
    url: String,
    state: &State<ServerState>,
) -> Result<Json<PortfolioResponse>, HandlerError> {
    state.request_limiter.acquire().await.map_err(|_| {
        Custom(
            Status::TooManyRequests,
            Json(ErrorResponse::new(
                CollectError::RateLimitExceeded.to_string(),
                "RATE_LIMITED",
                vec!["Wait for the current window to pass and retry".to_string()],
            )),
        )
    })?;

    if !is_valid_url(&url) {
        return Err(bad_request(
            CollectError::InvalidUrl(url).to_string(),
            "INVALID_URL",
            vec!["Provide an absolute http(s) URL".to_string()],
        ));
    }

    info!("Direct portfolio scrape requested: {}", url);
    match state.aggregator.portfolio_scraper().scrape(&url).await {
        Ok(profile) => Ok(Json(PortfolioResponse {
            status: "success".to_string(),
            data: profile,
            url,
            timestamp: Utc::now(),
        })),
        Err(e) => Err(bad_request(
            e.to_string(),
            "PORTFOLIO_UNREACHABLE",
            vec![
                "Check the URL is publicly reachable".to_string(),
                "Retry once the site is back up".to_string(),
            ],
        )),
    }
}

async fn read_resume_text(file: &mut rocket::fs::TempFile<'_>) -> Result<String, HandlerError> {
    let filename = file
        .raw_name()
        .and_then(|n| n.as_str())
        .unwrap_or("resume")
        .to_string();

    if file.len() > MAX_RESUME_SIZE {
        return Err(bad_request(
            "Resume file exceeds the 10MB limit".to_string(),
            "FILE_TOO_LARGE",
            vec!["Upload a smaller resume file".to_string()],
        ));
    }

    let temp_path = std::env::temp_dir().join(format!(
        "resume_upload_{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));

    if let Err(e) = file.persist_to(&temp_path).await {
        error!("Failed to save uploaded resume: {}", e);
        return Err(bad_request(
            "Failed to process uploaded file".to_string(),
            "FILE_SAVE_ERROR",
            vec!["Try uploading the file again".to_string()],
        ));
    }

    let content = tokio::fs::read(&temp_path).await;
    let _ = tokio::fs::remove_file(&temp_path).await;

    let content = content.map_err(|e| {
        error!("Failed to read uploaded resume: {}", e);
        bad_request(
            "Failed to process uploaded file".to_string(),
            "FILE_READ_ERROR",
            vec!["Try uploading the file again".to_string()],
        )
    })?;

    load_document(&content, &filename).map_err(|e| match e {
        CollectError::UnsupportedFormat(_) => bad_request(
            e.to_string(),
            "UNSUPPORTED_FORMAT",
            vec![
                "Upload a PDF file (.pdf)".to_string(),
                "Upload a Word document (.docx)".to_string(),
            ],
        ),
        _ => bad_request(
            e.to_string(),
            "DOCUMENT_PARSE_ERROR",
            vec![
                "Ensure the resume has readable text".to_string(),
                "Check the file is not corrupted".to_string(),
            ],
        ),
    })
}

fn is_valid_url(url: &str) -> bool {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE
        .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("invalid url pattern"))
        .is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://alice.dev"));
        assert!(is_valid_url("http://example.com/portfolio"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("https://bad url.com"));
    }
}
