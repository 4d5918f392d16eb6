// src/config.rs
use anyhow::{Context, Result};
use std::time::Duration;

/// Service configuration, read from the environment once at startup and
/// injected into handlers through Rocket managed state.
pub struct AppConfig {
    /// Shared secret compared against the caller-supplied key.
    pub api_key: String,
    /// Optional token to raise GitHub API rate limits.
    pub github_token: Option<String>,
    /// Per-source budget for external fetches.
    pub fetch_timeout: Duration,
    /// Outbound Instagram budget: at most N calls per window.
    pub instagram_rate_limit: u32,
    pub instagram_rate_window: Duration,
    /// Endpoint budget for direct portfolio scrapes.
    pub scrape_rate_limit: u32,
    pub scrape_rate_window: Duration,
    /// Skill vocabulary override, newline-separated file.
    pub skills_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("API_KEY").context("API_KEY environment variable not set")?;

        Ok(Self {
            api_key,
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            fetch_timeout: Duration::from_secs(env_u64("FETCH_TIMEOUT_SECS", 30)?),
            instagram_rate_limit: env_u64("INSTAGRAM_RATE_LIMIT", 3)? as u32,
            instagram_rate_window: Duration::from_secs(env_u64(
                "INSTAGRAM_RATE_WINDOW_SECS",
                60,
            )?),
            scrape_rate_limit: env_u64("SCRAPE_RATE_LIMIT", 1)? as u32,
            scrape_rate_window: Duration::from_secs(env_u64("SCRAPE_RATE_WINDOW_SECS", 2)?),
            skills_file: std::env::var("SKILLS_FILE").ok(),
        })
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .with_context(|| format!("{} must be a positive integer", name)),
        Err(_) => Ok(default),
    }
}
