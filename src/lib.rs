//! Doctor portfolio site
//!
//! Backend capabilities, session gate, localized record views and the
//! health-news relay service.

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod models;
pub mod news;
pub mod notify;
pub mod records;
pub mod session;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use news::NewsProvider;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no provider key is configured.
    pub news: Option<Arc<dyn NewsProvider>>,
    pub config: Arc<Config>,
}

/// Create the relay router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    let psk = state.config.relay_psk.clone();

    let function_routes = Router::new()
        .route("/fetch_medical_news", post(api::fetch_medical_news))
        .layer(middleware::from_fn(move |req, next| {
            auth::relay_key_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/functions/v1", function_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
