//! Testimonial model with per-language variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordId};
use crate::i18n::Language;

/// Length of a derived summary, in characters.
pub const SUMMARY_LEN: usize = 100;

/// A visitor testimonial. Armenian fields are always filled on creation;
/// English and Russian variants are optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Testimonial {
    pub id: RecordId,
    pub author: String,
    #[serde(default)]
    pub role_am: Option<String>,
    #[serde(default)]
    pub role_en: Option<String>,
    #[serde(default)]
    pub role_ru: Option<String>,
    #[serde(default)]
    pub summary_am: Option<String>,
    #[serde(default)]
    pub summary_en: Option<String>,
    #[serde(default)]
    pub summary_ru: Option<String>,
    #[serde(rename = "fullText_am", default)]
    pub full_text_am: Option<String>,
    #[serde(rename = "fullText_en", default)]
    pub full_text_en: Option<String>,
    #[serde(rename = "fullText_ru", default)]
    pub full_text_ru: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Testimonial {
    fn pick<'a>(
        &'a self,
        language: Language,
        am: &'a Option<String>,
        en: &'a Option<String>,
        ru: &'a Option<String>,
    ) -> Option<&'a str> {
        match language {
            Language::Am => non_blank(am),
            Language::En => non_blank(en),
            Language::Ru => non_blank(ru),
        }
    }

    /// Role in `language`; no fallback.
    pub fn role(&self, language: Language) -> &str {
        self.pick(language, &self.role_am, &self.role_en, &self.role_ru)
            .unwrap_or("")
    }

    /// Full text in `language`, else the Armenian text.
    pub fn full_text(&self, language: Language) -> Option<&str> {
        self.pick(
            language,
            &self.full_text_am,
            &self.full_text_en,
            &self.full_text_ru,
        )
        .or_else(|| non_blank(&self.full_text_am))
    }

    /// Summary in `language`, else derived from the Armenian full text.
    pub fn summary(&self, language: Language) -> String {
        match self.pick(language, &self.summary_am, &self.summary_en, &self.summary_ru) {
            Some(summary) => summary.to_string(),
            None => self
                .full_text_am
                .as_deref()
                .map(summarize)
                .unwrap_or_default(),
        }
    }
}

impl Record for Testimonial {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Fields of the public testimonial form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestimonialDraft {
    pub author: String,
    pub role: String,
    pub full_text: String,
}

/// First `SUMMARY_LEN` characters of `text`, trimmed.
pub fn summarize(text: &str) -> String {
    text.chars()
        .take(SUMMARY_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}
