//! Pre-shared key gate for the news relay.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests that do not carry the relay key, when one is configured.
///
/// The key is accepted from `x-api-key` or as a bearer token.
pub async fn relay_key_layer(expected: Option<String>, request: Request, next: Next) -> Response {
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    match presented_key(request.headers()) {
        Some(key) if constant_time_compare(key, &expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Invalid API key".to_string()).into_response(),
        None => AppError::Unauthorized("Missing API key".to_string()).into_response(),
    }
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    api_key.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
    })
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
