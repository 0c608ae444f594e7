//! Blog event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_empty, Record, RecordId};

/// A blog event with its photo gallery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub participants: String,
    /// Public URLs of the gallery images, in upload order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Event {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Text fields of the event creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub participants: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_image_urls_become_empty() {
        let event: Event = serde_json::from_value(json!({
            "id": 3,
            "title": "Congress",
            "description": "Annual congress",
            "participants": "Hematologists",
            "image_urls": null,
            "created_at": "2024-05-01T09:30:00.123456+00:00"
        }))
        .unwrap();
        assert!(event.image_urls.is_empty());
        assert_eq!(event.id(), 3);
    }

    #[test]
    fn test_missing_image_urls_become_empty() {
        let event: Event = serde_json::from_value(json!({
            "id": 4,
            "title": "t",
            "description": "d",
            "participants": "p",
            "created_at": "2024-05-01T09:30:00Z"
        }))
        .unwrap();
        assert!(event.image_urls.is_empty());
    }
}
