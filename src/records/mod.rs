//! Record list views and the create/delete/fetch flows behind them.
//!
//! Flows are free functions over the backend capabilities. Views own the
//! in-memory list, gate admin actions and turn every outcome into a notice.

mod admin;
mod events;
mod hero;
mod testimonials;

pub use admin::*;
pub use events::*;
pub use hero::*;
pub use testimonials::*;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{Backend, FileStore};
use crate::errors::AppError;
use crate::i18n::LanguageResolver;
use crate::models::{Record, RecordId};
use crate::notify::{Notice, Notifier};
use crate::session::SessionGate;

pub const EVENTS_TABLE: &str = "events";
pub const TESTIMONIALS_TABLE: &str = "testimonials";
pub const EVENTS_BUCKET: &str = "events_bucket";
pub const EVENT_IMAGE_DIR: &str = "event_images";

/// A confirmed change to a record list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<T> {
    Created(T),
    Deleted(RecordId),
}

/// Apply a confirmed change to a newest-first list.
pub fn apply<T: Record>(change: ListChange<T>, mut list: Vec<T>) -> Vec<T> {
    match change {
        ListChange::Created(record) => {
            list.insert(0, record);
            list
        }
        ListChange::Deleted(id) => {
            list.retain(|r| r.id() != id);
            list
        }
    }
}

/// Client-side validation failure, raised before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingField(&'static str),
    NoImages,
    NotAnImage,
}

impl Rejection {
    pub fn translation_key(&self) -> &'static str {
        match self {
            Rejection::MissingField(_) => "error_required_fields",
            Rejection::NoImages => "error_no_images",
            Rejection::NotAnImage => "error_not_image",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::MissingField(field) => write!(f, "{} is required", field),
            Rejection::NoImages => write!(f, "At least one image is required"),
            Rejection::NotAnImage => write!(f, "File is not an image"),
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::Validation(rejection.to_string())
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), Rejection> {
    if value.trim().is_empty() {
        Err(Rejection::MissingField(field))
    } else {
        Ok(())
    }
}

/// Storage path of an uploaded event image.
///
/// The file name keeps only `[A-Za-z0-9._-]`; anything else becomes `_`, so
/// the path is safe to place in a URL unescaped.
pub fn event_image_path(now: DateTime<Utc>, index: usize, file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{}/{}_{}_{}",
        EVENT_IMAGE_DIR,
        now.timestamp_millis(),
        index,
        sanitized
    )
}

/// Storage path referenced by a public URL: everything after `<bucket>/`,
/// or the whole string when the URL has no bucket segment.
pub fn storage_path_from_url(url: &str, bucket: &str) -> String {
    let marker = format!("{}/", bucket);
    match url.split_once(&marker) {
        Some((_, path)) => path.to_string(),
        None => url.to_string(),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, AppError> {
    serde_json::from_value(row)
        .map_err(|e| AppError::Remote(format!("Malformed {} row: {}", table, e)))
}

/// Best-effort removal of files uploaded by a submission that did not complete.
pub(crate) async fn discard_uploads(files: &dyn FileStore, bucket: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    if let Err(e) = files.remove(bucket, paths).await {
        tracing::warn!("Failed to discard {} uploaded files: {}", paths.len(), e);
    }
}

/// Everything a view needs from its surroundings.
#[derive(Clone)]
pub struct ViewContext {
    pub backend: Backend,
    session: Arc<SessionGate>,
    pub i18n: Arc<LanguageResolver>,
    pub notifier: Arc<dyn Notifier>,
}

impl ViewContext {
    /// The session gate follows `backend.auth`, so every view and the admin
    /// check see the same signed-in user.
    pub fn new(
        backend: Backend,
        i18n: Arc<LanguageResolver>,
        notifier: Arc<dyn Notifier>,
        admin_email: Option<String>,
    ) -> Self {
        let session = Arc::new(SessionGate::new(backend.auth.clone(), admin_email));
        Self {
            backend,
            session,
            i18n,
            notifier,
        }
    }

    pub fn session(&self) -> &Arc<SessionGate> {
        &self.session
    }

    fn success(&self, key: &str) {
        self.notifier.notify(Notice::success(self.i18n.t(key)));
    }

    fn failure(&self, key: &str, error: &AppError) {
        self.notifier.notify(Notice::failure(format!(
            "{}: {}",
            self.i18n.t(key),
            error.message()
        )));
    }

    fn rejected(&self, rejection: Rejection) -> AppError {
        self.notifier
            .notify(Notice::failure(self.i18n.t(rejection.translation_key())));
        rejection.into()
    }

    /// Admin actions make no remote call for anyone else.
    fn require_admin(&self) -> Result<(), AppError> {
        if self.session.is_admin() {
            return Ok(());
        }
        self.notifier
            .notify(Notice::failure(self.i18n.t("admin_required")));
        Err(AppError::Unauthorized(
            "Administrator session required".to_string(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::i18n::Language;
    use crate::notify::ChannelNotifier;
    use tokio::sync::mpsc;

    pub const ADMIN: &str = "doctor@example.com";
    pub const PASSWORD: &str = "secret";

    pub struct Harness {
        pub backend: Arc<MemoryBackend>,
        pub ctx: ViewContext,
        pub notices: mpsc::UnboundedReceiver<Notice>,
    }

    impl Harness {
        pub fn new() -> Self {
            let backend = Arc::new(
                MemoryBackend::new()
                    .with_user(ADMIN, PASSWORD)
                    .with_user("visitor@example.com", PASSWORD),
            );
            let (notifier, notices) = ChannelNotifier::new();
            let ctx = ViewContext::new(
                Backend::shared(backend.clone()),
                Arc::new(LanguageResolver::new(Language::En)),
                Arc::new(notifier),
                Some(ADMIN.to_string()),
            );
            Self {
                backend,
                ctx,
                notices,
            }
        }

        pub async fn admin() -> Self {
            let harness = Self::new();
            harness.ctx.session.sign_in(ADMIN, PASSWORD).await.unwrap();
            harness.backend.clear_calls().await;
            harness
        }

        pub fn drain(&mut self) -> Vec<Notice> {
            let mut out = Vec::new();
            while let Ok(notice) = self.notices.try_recv() {
                out.push(notice);
            }
            out
        }
    }
}
