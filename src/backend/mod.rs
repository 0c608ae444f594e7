//! Capability interface to the hosted backend.
//!
//! The flows only see these traits. `RestBackend` talks to the hosted service,
//! `MemoryBackend` keeps everything in process for tests and local development.

mod memory;
mod rest;

pub use memory::*;
pub use rest::*;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::errors::AppError;

/// Column equality filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether a stored row satisfies this filter.
    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

/// Result ordering for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// A row query: projected columns, equality filters and optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Select {
    pub fn columns(columns: impl Into<String>) -> Self {
        Self {
            columns: columns.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: true,
        });
        self
    }
}

/// Options for a file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    pub upsert: bool,
    pub cache_control: Option<String>,
}

impl UploadOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            upsert: false,
            cache_control: None,
        }
    }
}

/// An authenticated user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authentication transitions pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

/// Row storage for the site's collections.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, AppError>;

    /// Insert a single row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, AppError>;

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), AppError>;
}

/// File storage buckets.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), AppError>;

    /// Stable unauthenticated URL of a stored file.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AppError>;
}

/// Password authentication with transition notifications.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AppError>;

    async fn sign_out(&self) -> Result<(), AppError>;

    async fn current_user(&self) -> Result<Option<User>, AppError>;

    /// Subscribe to sign-in/sign-out transitions. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// The three capabilities bundled for the views.
#[derive(Clone)]
pub struct Backend {
    pub rows: Arc<dyn RowStore>,
    pub files: Arc<dyn FileStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl Backend {
    /// Use one adapter for all three capabilities.
    pub fn shared<T>(adapter: Arc<T>) -> Self
    where
        T: RowStore + FileStore + AuthProvider + 'static,
    {
        Self {
            rows: adapter.clone(),
            files: adapter.clone(),
            auth: adapter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_exact_value() {
        let row = json!({ "id": 7, "is_new": true });
        assert!(Filter::eq("id", 7).matches(&row));
        assert!(Filter::eq("is_new", true).matches(&row));
        assert!(!Filter::eq("id", "7").matches(&row));
        assert!(!Filter::eq("missing", 1).matches(&row));
    }

    #[test]
    fn test_select_builder() {
        let query = Select::columns("*")
            .eq("is_new", true)
            .order_desc("created_at");
        assert_eq!(query.columns, "*");
        assert_eq!(query.filters, vec![Filter::eq("is_new", true)]);
        assert_eq!(
            query.order,
            Some(Order {
                column: "created_at".into(),
                descending: true
            })
        );
    }
}
