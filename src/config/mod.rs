//! Configuration module for the portfolio site.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;

use crate::errors::AppError;

/// Default endpoint of the third-party health news provider.
pub const DEFAULT_NEWS_API_URL: &str = "https://newsdata.io/api/1/news";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the relay server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// The single administrator address; nobody is admin when unset
    pub admin_email: Option<String>,
    /// Base URL of the hosted backend
    pub backend_url: Option<String>,
    /// Public (anon) key of the hosted backend
    pub backend_anon_key: Option<String>,
    /// Pre-shared key required by the relay endpoint
    pub relay_psk: Option<String>,
    /// News provider credential held by the relay
    pub news_api_key: Option<String>,
    /// News provider endpoint
    pub news_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("SITE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid SITE_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("SITE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("SITE_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let news_api_url =
            env::var("SITE_NEWS_API_URL").unwrap_or_else(|_| DEFAULT_NEWS_API_URL.to_string());

        Ok(Self {
            bind_addr,
            log_level,
            log_format,
            admin_email: non_empty_var("SITE_ADMIN_EMAIL"),
            backend_url: non_empty_var("SITE_BACKEND_URL"),
            backend_anon_key: non_empty_var("SITE_BACKEND_ANON_KEY"),
            relay_psk: non_empty_var("SITE_RELAY_PSK"),
            news_api_key: non_empty_var("NEWSDATA_API_KEY"),
            news_api_url,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
