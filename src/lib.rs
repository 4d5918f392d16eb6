//! Candidate data collection service: parses uploaded resumes, scrapes
//! portfolio sites, and queries GitHub and Instagram, then merges every
//! source into a single candidate profile served over HTTP.

pub mod aggregator;
pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod github;
pub mod instagram;
pub mod portfolio;
pub mod rate_limit;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use error::CollectError;
pub use web::start_web_server;
