// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::aggregator::Aggregator;
use crate::auth::ApiKey;
use crate::config::AppConfig;
use crate::extractor::{FieldExtractor, SkillVocabulary};
use crate::github::GithubFetcher;
use crate::instagram::InstagramFetcher;
use crate::portfolio::PortfolioScraper;
use crate::rate_limit::RateLimiter;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Request, Response, State};
use std::sync::Arc;
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/// Shared per-process state: the aggregator with its fetchers, and the
/// endpoint request budget.
pub struct ServerState {
    pub aggregator: Aggregator,
    pub request_limiter: Arc<RateLimiter>,
}

#[post("/collect-candidate-data", data = "<upload>")]
pub async fn collect_candidate_data(
    upload: Form<CollectForm<'_>>,
    _auth: ApiKey,
    state: &State<ServerState>,
) -> Result<Custom<Json<CollectResponse>>, Custom<Json<ErrorResponse>>> {
    handlers::collect_candidate_data_handler(upload, state).await
}

#[get("/scrape-portfolio-direct?<url>")]
pub async fn scrape_portfolio_direct(
    url: String,
    _auth: ApiKey,
    state: &State<ServerState>,
) -> Result<Json<PortfolioResponse>, Custom<Json<ErrorResponse>>> {
    handlers::scrape_portfolio_handler(url, state).await
}

#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "candidate-collector".to_string(),
    })
}

#[options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

// Error catchers

#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST",
        vec![
            "Check the multipart form fields".to_string(),
            "Verify all values are well-formed".to_string(),
        ],
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Missing or invalid API key".to_string(),
        "UNAUTHORIZED",
        vec![format!(
            "Supply the key in the {} header or api_key query parameter",
            crate::auth::API_KEY_HEADER
        )],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Unknown endpoint".to_string(),
        "NOT_FOUND",
        vec![
            "POST /collect-candidate-data".to_string(),
            "GET /scrape-portfolio-direct?url=...".to_string(),
        ],
    ))
}

#[rocket::catch(429)]
pub fn too_many_requests() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Rate limit exceeded. Please wait before making another request".to_string(),
        "RATE_LIMITED",
        vec!["Retry after the current window".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR",
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let vocabulary = match &config.skills_file {
        Some(path) => SkillVocabulary::from_file(path)?,
        None => SkillVocabulary::default(),
    };
    info!("Skill vocabulary: {} terms", vocabulary.terms().len());

    let instagram_limiter = Arc::new(RateLimiter::new(
        config.instagram_rate_limit,
        config.instagram_rate_window,
    ));
    let request_limiter = Arc::new(RateLimiter::new(
        config.scrape_rate_limit,
        config.scrape_rate_window,
    ));

    let aggregator = Aggregator::new(
        FieldExtractor::new(vocabulary),
        PortfolioScraper::new(config.fetch_timeout),
        GithubFetcher::new(config.fetch_timeout, config.github_token.clone()),
        InstagramFetcher::new(config.fetch_timeout, instagram_limiter),
        config.fetch_timeout,
    );

    let state = ServerState {
        aggregator,
        request_limiter,
    };

    info!("Starting candidate data collection API server");

    let _rocket = rocket::build()
        .attach(Cors)
        .manage(config)
        .manage(state)
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                too_many_requests,
                internal_error
            ],
        )
        .mount(
            "/",
            routes![
                collect_candidate_data,
                scrape_portfolio_direct,
                health,
                all_options,
            ],
        )
        .launch()
        .await;

    Ok(())
}
