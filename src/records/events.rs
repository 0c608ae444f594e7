//! Blog events: gallery upload, creation, deletion and the admin board.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::{
    apply, decode, discard_uploads, event_image_path, require, storage_path_from_url,
    ListChange, Rejection, ViewContext, EVENTS_BUCKET, EVENTS_TABLE,
};
use crate::backend::{Backend, Filter, RowStore, Select, UploadOptions};
use crate::errors::AppError;
use crate::models::{null_as_empty, Event, EventDraft, RecordId, UploadFile};

/// The event creation form: text fields plus selected images.
#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub draft: EventDraft,
    pub files: Vec<UploadFile>,
}

impl EventForm {
    pub fn check(&self) -> Result<(), Rejection> {
        require("title", &self.draft.title)?;
        require("description", &self.draft.description)?;
        require("participants", &self.draft.participants)?;
        if self.files.is_empty() {
            return Err(Rejection::NoImages);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of a confirmed event deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    /// Storage paths passed to file removal, in stored order.
    pub removed_paths: Vec<String>,
    /// Set when file removal failed; the row is gone regardless.
    pub cleanup_error: Option<String>,
}

#[derive(Deserialize)]
struct StoredImages {
    #[serde(default, deserialize_with = "null_as_empty")]
    image_urls: Vec<String>,
}

/// All events, newest first.
pub async fn fetch_events(rows: &dyn RowStore) -> Result<Vec<Event>, AppError> {
    let query = Select::columns("id, title, description, participants, image_urls, created_at")
        .order_desc("created_at");
    rows.select(EVENTS_TABLE, &query)
        .await?
        .into_iter()
        .map(|row| decode(EVENTS_TABLE, row))
        .collect()
}

/// Upload the images, then insert one row referencing their public URLs.
///
/// If any step fails, images uploaded by this call are removed again.
pub async fn create_event(backend: &Backend, form: &EventForm) -> Result<Event, AppError> {
    form.check()?;

    let mut uploaded = Vec::with_capacity(form.files.len());
    let mut image_urls = Vec::with_capacity(form.files.len());

    for (index, file) in form.files.iter().enumerate() {
        let path = event_image_path(Utc::now(), index, &file.name);
        let options = UploadOptions::new(file.content_type.clone());

        if let Err(e) = backend
            .files
            .upload(EVENTS_BUCKET, &path, file.bytes.clone(), &options)
            .await
        {
            tracing::error!("Upload of {} failed: {}", path, e);
            discard_uploads(backend.files.as_ref(), EVENTS_BUCKET, &uploaded).await;
            return Err(e);
        }

        image_urls.push(backend.files.public_url(EVENTS_BUCKET, &path));
        uploaded.push(path);
    }

    let row = json!({
        "title": form.draft.title,
        "description": form.draft.description,
        "participants": form.draft.participants,
        "image_urls": image_urls,
    });

    match backend.rows.insert(EVENTS_TABLE, row).await {
        Ok(row) => decode(EVENTS_TABLE, row),
        Err(e) => {
            tracing::error!("Event insert failed: {}", e);
            discard_uploads(backend.files.as_ref(), EVENTS_BUCKET, &uploaded).await;
            Err(e)
        }
    }
}

/// Delete the row, then best-effort remove its images.
pub async fn delete_event(backend: &Backend, id: RecordId) -> Result<DeleteReport, AppError> {
    let query = Select::columns("image_urls").eq("id", id);
    let stored = backend
        .rows
        .select(EVENTS_TABLE, &query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

    let StoredImages { image_urls } = decode(EVENTS_TABLE, stored)?;

    backend
        .rows
        .delete(EVENTS_TABLE, &Filter::eq("id", id))
        .await?;

    let removed_paths: Vec<String> = image_urls
        .iter()
        .map(|url| storage_path_from_url(url, EVENTS_BUCKET))
        .collect();

    let mut cleanup_error = None;
    if !removed_paths.is_empty() {
        if let Err(e) = backend.files.remove(EVENTS_BUCKET, &removed_paths).await {
            tracing::warn!("Storage cleanup for event {} failed: {}", id, e);
            cleanup_error = Some(e.message());
        }
    }

    Ok(DeleteReport {
        removed_paths,
        cleanup_error,
    })
}

/// The blog page: every visitor sees the list, only the administrator edits it.
pub struct EventBoard {
    ctx: ViewContext,
    events: Vec<Event>,
}

impl EventBoard {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether the creation form and delete controls are shown.
    pub fn can_edit(&self) -> bool {
        self.ctx.session.is_admin()
    }

    /// Full fetch; on failure the list is cleared.
    pub async fn load(&mut self) -> Result<(), AppError> {
        match fetch_events(self.ctx.backend.rows.as_ref()).await {
            Ok(events) => {
                self.events = events;
                Ok(())
            }
            Err(e) => {
                self.events.clear();
                self.ctx.failure("fetch_error", &e);
                Err(e)
            }
        }
    }

    /// Create an event from the form; on success it is prepended and the form cleared.
    pub async fn submit(&mut self, form: &mut EventForm) -> Result<RecordId, AppError> {
        self.ctx.require_admin()?;
        if let Err(rejection) = form.check() {
            return Err(self.ctx.rejected(rejection));
        }

        match create_event(&self.ctx.backend, form).await {
            Ok(event) => {
                let id = event.id;
                self.events = apply(ListChange::Created(event), std::mem::take(&mut self.events));
                form.clear();
                self.ctx.success("event_add_success");
                Ok(id)
            }
            Err(e) => {
                self.ctx.failure("event_add_fail", &e);
                Err(e)
            }
        }
    }

    /// Delete an event and drop it from the list once the row is gone.
    pub async fn remove(&mut self, id: RecordId) -> Result<DeleteReport, AppError> {
        self.ctx.require_admin()?;

        match delete_event(&self.ctx.backend, id).await {
            Ok(report) => {
                self.events = apply(ListChange::Deleted(id), std::mem::take(&mut self.events));
                self.ctx.success("delete_success");
                Ok(report)
            }
            Err(e @ AppError::NotFound(_)) => {
                self.events = apply(ListChange::Deleted(id), std::mem::take(&mut self.events));
                self.ctx.failure("record_missing", &e);
                Err(e)
            }
            Err(e) => {
                self.ctx.failure("delete_fail", &e);
                Err(e)
            }
        }
    }
}
