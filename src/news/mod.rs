//! Health news: the provider behind the relay, and the site's feed client.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::backend_settings;
use crate::config::Config;
use crate::errors::AppError;
use crate::i18n::{Language, LanguageResolver};
use crate::models::{NewsItem, RelayRequest};

pub const NEWS_CATEGORY: &str = "health";

/// Route of the relay function under the project URL.
pub const RELAY_FUNCTION_PATH: &str = "/functions/v1/fetch_medical_news";

/// Languages the provider can serve.
const PROVIDER_LANGUAGES: [&str; 2] = ["en", "ru"];

/// Language forwarded to the provider for a relay request.
pub fn relay_language(requested: &str) -> &'static str {
    let requested = requested.trim().to_ascii_lowercase();
    PROVIDER_LANGUAGES
        .into_iter()
        .find(|lang| *lang == requested)
        .unwrap_or("en")
}

/// Source of raw news JSON, held by the relay.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch(&self, language: &str) -> Result<Value, AppError>;
}

/// NewsData.io latest-news endpoint.
pub struct NewsDataClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl NewsDataClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl NewsProvider for NewsDataClient {
    async fn fetch(&self, language: &str) -> Result<Value, AppError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("category", NEWS_CATEGORY),
                ("language", language),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("News provider unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body.trim(), "News provider rejected the request");
            return Err(AppError::Upstream(format!("News provider returned {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid news provider response: {}", e)))
    }
}

/// Language code sent to the relay by the site.
pub fn feed_language(language: Language) -> &'static str {
    match language {
        Language::Am => "am",
        Language::En => "en",
        Language::Ru => "ru",
    }
}

/// Interpret a relay response body.
///
/// Articles without a title or link are dropped.
pub fn parse_feed(body: Value, language_code: &str) -> Result<Vec<NewsItem>, AppError> {
    if let Some(results) = body.get("results").and_then(Value::as_array) {
        let items = results
            .iter()
            .filter(|item| has_text(item, "title") && has_text(item, "link"))
            .filter_map(|item| serde_json::from_value::<NewsItem>(item.clone()).ok())
            .collect();
        return Ok(items);
    }
    if let Some(error) = body.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(AppError::Upstream(message));
    }
    Err(AppError::NotFound(format!(
        "No news found from the provider ({})",
        language_code
    )))
}

fn has_text(item: &Value, field: &str) -> bool {
    item.get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Client for the site's news relay function.
#[derive(Clone)]
pub struct NewsFeed {
    client: reqwest::Client,
    function_url: String,
    anon_key: String,
}

impl NewsFeed {
    pub fn new(function_url: &str, anon_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            function_url: function_url.to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    /// Feed served by the project's relay function.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let (url, key) = backend_settings(config)?;
        let function_url = format!("{}{}", url.trim_end_matches('/'), RELAY_FUNCTION_PATH);
        Ok(Self::new(&function_url, key))
    }

    pub async fn load(&self, language: Language) -> Result<Vec<NewsItem>, AppError> {
        let code = feed_language(language);
        let response = self
            .client
            .post(&self.function_url)
            .bearer_auth(&self.anon_key)
            .json(&RelayRequest {
                language: code.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Remote(format!(
                "Edge Function Error: {}",
                status.as_u16()
            )));
        }

        parse_feed(response.json().await?, code)
    }
}

/// What the news page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Loading,
    Ready(Vec<NewsItem>),
    /// Localized "nothing right now" message.
    Empty(String),
    /// Localized failure message.
    Failed(String),
}

/// The news page: reloads the feed in the active language.
pub struct NewsPanel {
    feed: NewsFeed,
    i18n: Arc<LanguageResolver>,
    state: FeedState,
}

impl NewsPanel {
    pub fn new(feed: NewsFeed, i18n: Arc<LanguageResolver>) -> Self {
        Self {
            feed,
            i18n,
            state: FeedState::Loading,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub async fn refresh(&mut self) -> &FeedState {
        self.state = FeedState::Loading;
        self.state = match self.feed.load(self.i18n.language()).await {
            Ok(items) if items.is_empty() => FeedState::Empty(self.i18n.t("news_empty")),
            Ok(items) => FeedState::Ready(items),
            Err(e) => {
                tracing::warn!("News feed failed: {}", e);
                FeedState::Failed(format!("{}: {}", self.i18n.t("news_error"), e.message()))
            }
        };
        &self.state
    }
}
