//! Data models for the site's records.
//!
//! Field names follow the hosted backend's column names.

mod event;
mod news;
mod testimonial;

pub use event::*;
pub use news::*;
pub use testimonial::*;

use serde::{Deserialize, Deserializer};

/// Backend-assigned row identifier.
pub type RecordId = i64;

/// A row that can live in a record list view.
pub trait Record {
    fn id(&self) -> RecordId;
}

/// A selected file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Deserialize a nullable array as an empty one.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
