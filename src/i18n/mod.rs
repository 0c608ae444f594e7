//! Display language state and localized strings.

mod translations;

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use tokio::sync::watch;

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Am,
    En,
    Ru,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Am, Language::En, Language::Ru];

    pub fn code(self) -> &'static str {
        match self {
            Language::Am => "AM",
            Language::En => "EN",
            Language::Ru => "RU",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "AM" | "HY" => Some(Language::Am),
            "EN" => Some(Language::En),
            "RU" => Some(Language::Ru),
            _ => None,
        }
    }
}

/// Active language plus key lookup.
///
/// Shared by `Arc`; subscribers can watch language changes.
pub struct LanguageResolver {
    current: watch::Sender<Language>,
    tables: HashMap<Language, HashMap<&'static str, &'static str>>,
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl LanguageResolver {
    pub fn new(initial: Language) -> Self {
        let tables = Language::ALL
            .into_iter()
            .map(|lang| (lang, translations::table(lang).iter().copied().collect()))
            .collect();
        let (current, _) = watch::channel(initial);
        Self { current, tables }
    }

    pub fn language(&self) -> Language {
        *self.current.borrow()
    }

    pub fn set_language(&self, language: Language) {
        self.current.send_replace(language);
    }

    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.current.subscribe()
    }

    /// Localized string for `key` in the active language, or the key itself.
    pub fn t(&self, key: &str) -> String {
        self.lookup(self.language(), key)
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&'static str> {
        self.tables.get(&language)?.get(key).copied()
    }

    /// Long-form date in the active language.
    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        let language = self.language();
        let month_key = format!("month_{}", date.month0());
        let month = self.lookup(language, &month_key).unwrap_or("");
        match language {
            Language::Am => format!("{} {} {} թ.", date.day(), month, date.year()),
            Language::En => format!("{} {}, {}", month, date.day(), date.year()),
            Language::Ru => format!("{} {} {} г.", date.day(), month, date.year()),
        }
    }
}
