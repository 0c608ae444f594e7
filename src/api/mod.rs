//! HTTP handlers of the news relay.

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::RelayRequest;
use crate::news::relay_language;
use crate::AppState;

/// `POST /functions/v1/fetch_medical_news`
///
/// Forwards a health-news request to the provider with the server-held key.
/// A missing or unreadable body is treated as a request for English.
pub async fn fetch_medical_news(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request = parse_request(&body);

    let Some(news) = state.news.as_ref() else {
        tracing::error!("News relay called without a provider key");
        return Err(AppError::Config("API key not configured".to_string()));
    };

    let language = relay_language(&request.language);
    tracing::debug!(requested = %request.language, language, "Relaying news request");

    let data = news.fetch(language).await?;
    Ok(Json(data))
}

fn parse_request(body: &[u8]) -> RelayRequest {
    if body.is_empty() {
        return RelayRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!("Ignoring unreadable relay body: {}", e);
        RelayRequest::default()
    })
}
