//! REST client for the hosted backend (`/rest/v1`, `/storage/v1`, `/auth/v1`).
//!
//! Every request carries the project's anon key as `apikey`. The bearer token is
//! the signed-in session's access token, or the anon key when signed out.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{broadcast, RwLock};

use super::{AuthEvent, AuthProvider, FileStore, Filter, RowStore, Select, UploadOptions, User};
use crate::config::Config;
use crate::errors::AppError;

/// Token grant returned by the password sign-in endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: User,
}

/// HTTP adapter for the hosted backend.
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl RestBackend {
    /// Create a client for a project.
    ///
    /// * `base_url` - project URL, e.g. `https://<ref>.supabase.co`.
    /// * `anon_key` - the project's public key.
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, anon_key)
    }

    /// Client for the project named by `SITE_BACKEND_URL` and `SITE_BACKEND_ANON_KEY`.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let (url, key) = backend_settings(config)?;
        Ok(Self::new(url, key))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        let (auth_events, _) = broadcast::channel(16);
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: RwLock::new(None),
            auth_events,
        }
    }

    async fn bearer(&self) -> String {
        self.access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn request(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Turn a non-2xx response into a `Remote` error carrying the server's message.
    async fn check(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Remote(remote_message(status, &body)))
    }
}

/// Hosted backend URL and anon key, both required.
pub(crate) fn backend_settings(config: &Config) -> Result<(&str, &str), AppError> {
    match (config.backend_url.as_deref(), config.backend_anon_key.as_deref()) {
        (Some(url), Some(key)) => Ok((url, key)),
        _ => Err(AppError::Config(
            "SITE_BACKEND_URL and SITE_BACKEND_ANON_KEY must both be set".to_string(),
        )),
    }
}

fn remote_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body.trim().to_string()
    }
}

fn filter_param(filter: &Filter) -> (String, String) {
    let value = match &filter.value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (filter.column.clone(), format!("eq.{}", value))
}

#[async_trait]
impl RowStore for RestBackend {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, AppError> {
        let mut params = vec![("select".to_string(), query.columns.clone())];
        params.extend(query.filters.iter().map(filter_param));
        if let Some(order) = &query.order {
            let direction = if order.descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        let bearer = self.bearer().await;
        let response = self
            .request(Method::GET, &format!("/rest/v1/{}", table), &bearer)
            .query(&params)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, AppError> {
        let bearer = self.bearer().await;
        let response = self
            .request(Method::POST, &format!("/rest/v1/{}", table), &bearer)
            .header("Prefer", "return=representation")
            .json(&vec![row])
            .send()
            .await?;

        let rows: Vec<Value> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Remote(format!("Insert into {} returned no row", table)))
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), AppError> {
        let bearer = self.bearer().await;
        let response = self
            .request(Method::DELETE, &format!("/rest/v1/{}", table), &bearer)
            .query(&[filter_param(filter)])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl FileStore for RestBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), AppError> {
        let bearer = self.bearer().await;
        let mut request = self
            .request(
                Method::POST,
                &format!("/storage/v1/object/{}/{}", bucket, path),
                &bearer,
            )
            .header("content-type", &options.content_type)
            .header("x-upsert", options.upsert.to_string());
        if let Some(seconds) = &options.cache_control {
            request = request.header("cache-control", format!("max-age={}", seconds));
        }

        let response = request.body(bytes).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AppError> {
        let bearer = self.bearer().await;
        let response = self
            .request(
                Method::DELETE,
                &format!("/storage/v1/object/{}", bucket),
                &bearer,
            )
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AppError> {
        let response = self
            .request(Method::POST, "/auth/v1/token", &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Unauthorized(remote_message(status, &body)));
        }

        let grant: TokenResponse = Self::check(response).await?.json().await?;
        *self.access_token.write().await = Some(grant.access_token);

        let _ = self.auth_events.send(AuthEvent::SignedIn(grant.user.clone()));
        Ok(grant.user)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        let token = self.access_token.read().await.clone();
        if let Some(token) = token {
            let response = self
                .request(Method::POST, "/auth/v1/logout", &token)
                .send()
                .await?;
            Self::check(response).await?;
        }

        *self.access_token.write().await = None;
        let _ = self.auth_events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, AppError> {
        let Some(token) = self.access_token.read().await.clone() else {
            return Ok(None);
        };

        let response = self
            .request(Method::GET, "/auth/v1/user", &token)
            .send()
            .await?;

        // An expired or revoked token means nobody is signed in.
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        Ok(Some(Self::check(response).await?.json().await?))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_prefers_json_message() {
        let body = r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#;
        assert_eq!(
            remote_message(StatusCode::CONFLICT, body),
            "The resource already exists"
        );
        assert_eq!(
            remote_message(StatusCode::BAD_REQUEST, r#"{"error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
    }

    #[test]
    fn test_remote_message_falls_back_to_body_or_status() {
        assert_eq!(remote_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(
            remote_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "HTTP 503 Service Unavailable"
        );
    }

    #[test]
    fn test_filter_param_formats() {
        assert_eq!(
            filter_param(&Filter::eq("id", 12)),
            ("id".to_string(), "eq.12".to_string())
        );
        assert_eq!(
            filter_param(&Filter::eq("is_new", true)),
            ("is_new".to_string(), "eq.true".to_string())
        );
        assert_eq!(
            filter_param(&Filter::eq("author", "Ani")),
            ("author".to_string(), "eq.Ani".to_string())
        );
    }

    #[test]
    fn test_from_config_needs_url_and_key() {
        let mut config = Config {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".into(),
            log_format: crate::config::LogFormat::Text,
            admin_email: None,
            backend_url: Some("https://project.example.co".into()),
            backend_anon_key: None,
            relay_psk: None,
            news_api_key: None,
            news_api_url: crate::config::DEFAULT_NEWS_API_URL.into(),
        };
        assert!(matches!(
            RestBackend::from_config(&config),
            Err(AppError::Config(_))
        ));

        config.backend_anon_key = Some("anon".into());
        let backend = RestBackend::from_config(&config).unwrap();
        assert_eq!(
            backend.public_url("hero-images", "doctor_image.jpg"),
            "https://project.example.co/storage/v1/object/public/hero-images/doctor_image.jpg"
        );
    }

    #[test]
    fn test_public_url_trims_trailing_slash() {
        let backend = RestBackend::new("https://project.example.co/", "anon");
        assert_eq!(
            backend.public_url("events_bucket", "event_images/1_0_a.jpg"),
            "https://project.example.co/storage/v1/object/public/events_bucket/event_images/1_0_a.jpg"
        );
    }
}
