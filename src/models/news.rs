//! News relay wire types and feed items.

use serde::{Deserialize, Serialize};

/// Characters of the description shown on a news card.
pub const TEASER_LEN: usize = 150;

/// Body accepted by the relay function.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayRequest {
    #[serde(default)]
    pub language: String,
}

/// One displayable news article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewsItem {
    /// Card text: the start of the description followed by an ellipsis.
    pub fn teaser(&self) -> Option<String> {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| format!("{}...", d.chars().take(TEASER_LEN).collect::<String>()))
    }
}
