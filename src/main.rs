use anyhow::Result;
use candidate_collector::{start_web_server, AppConfig};

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let port = std::env::var("ROCKET_PORT").unwrap_or_else(|_| "8000".to_string());

    info!("Starting candidate data collection service");
    info!("Server: http://0.0.0.0:{}", port);
    info!("Fetch timeout: {:?}", config.fetch_timeout);
    info!(
        "GitHub token: {}",
        if config.github_token.is_some() {
            "configured"
        } else {
            "not set (unauthenticated rate limits apply)"
        }
    );

    start_web_server(config).await
}
