//! Health-news relay server for the portfolio site.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portfolio_site::config::{Config, LogFormat};
use portfolio_site::news::{NewsDataClient, NewsProvider};
use portfolio_site::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting portfolio site news relay");
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("News provider: {}", config.news_api_url);

    if config.relay_psk.is_none() {
        tracing::warn!("No relay key configured (SITE_RELAY_PSK). The relay is open to anyone!");
    }
    if config.admin_email.is_none() {
        tracing::warn!("No administrator configured (SITE_ADMIN_EMAIL). Admin actions are disabled.");
    }

    let news: Option<Arc<dyn NewsProvider>> = match &config.news_api_key {
        Some(key) => Some(Arc::new(NewsDataClient::new(&config.news_api_url, key))),
        None => {
            tracing::warn!("NEWSDATA_API_KEY is not set. The relay will answer with an error.");
            None
        }
    };

    let state = AppState {
        news,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
