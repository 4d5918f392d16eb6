// src/auth.rs
use crate::config::AppConfig;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use tracing::warn;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Request guard that proves the caller supplied the configured API key,
/// either in the `X-API-Key` header or an `api_key` query parameter.
pub struct ApiKey;

#[derive(Debug)]
pub enum AuthError {
    MissingKey,
    InvalidKey,
    Misconfigured,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingKey => "API key required",
            AuthError::InvalidKey => "Invalid API key",
            AuthError::Misconfigured => "Server authentication misconfigured",
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKey {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<AppConfig>>().await {
            Outcome::Success(config) => config,
            _ => {
                return Outcome::Error((Status::InternalServerError, AuthError::Misconfigured));
            }
        };

        let supplied = req
            .headers()
            .get_one(API_KEY_HEADER)
            .map(str::to_string)
            .or_else(|| {
                req.query_value::<String>("api_key")
                    .and_then(|v| v.ok())
            });

        match supplied {
            None => {
                warn!("Request rejected: missing API key");
                Outcome::Error((Status::Unauthorized, AuthError::MissingKey))
            }
            Some(key) if key == config.api_key => Outcome::Success(ApiKey),
            Some(_) => {
                warn!("Request rejected: invalid API key");
                Outcome::Error((Status::Unauthorized, AuthError::InvalidKey))
            }
        }
    }
}
