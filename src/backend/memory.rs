//! In-process backend with fault injection and a call log.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex};

use super::{AuthEvent, AuthProvider, FileStore, Filter, RowStore, Select, UploadOptions, User};
use crate::errors::AppError;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select { table: String },
    Insert { table: String },
    Delete { table: String, filter: Filter },
    Upload { bucket: String, path: String, upsert: bool },
    Remove { bucket: String, paths: Vec<String> },
    SignIn { email: String },
    SignOut,
    CurrentUser,
}

/// Failures to inject. Each `Some(message)` makes the matching call fail.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub select: Option<String>,
    pub insert: Option<String>,
    pub delete: Option<String>,
    pub remove: Option<String>,
    pub sign_out: Option<String>,
    pub current_user: Option<String>,
    /// Number of uploads that succeed before every further upload fails.
    pub upload_after: Option<usize>,
}

#[derive(Debug, Clone)]
struct StoredFile {
    bytes: Vec<u8>,
    content_type: String,
}

struct Account {
    password: String,
    user: User,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    files: HashMap<(String, String), StoredFile>,
    accounts: HashMap<String, Account>,
    session: Option<User>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
    uploads: usize,
    faults: Faults,
    calls: Vec<Call>,
}

impl State {
    fn next_created_at(&mut self) -> String {
        let now = Utc::now();
        let created = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(created);
        created.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn stamp(&mut self, row: Value) -> Value {
        let mut object = match row {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".into(), other);
                map
            }
        };
        if !object.contains_key("id") {
            self.next_id += 1;
            object.insert("id".into(), Value::from(self.next_id));
        }
        if !object.contains_key("created_at") {
            let created_at = self.next_created_at();
            object.insert("created_at".into(), Value::from(created_at));
        }
        Value::Object(object)
    }
}

/// Backend kept entirely in memory.
pub struct MemoryBackend {
    state: Mutex<State>,
    auth_events: broadcast::Sender<AuthEvent>,
    public_base: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (auth_events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(State::default()),
            auth_events,
            public_base: "memory://public".to_string(),
        }
    }

    /// Register an account that can sign in.
    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        let state = self.state.get_mut();
        let user = User {
            id: format!("user-{}", state.accounts.len() + 1),
            email: Some(email.to_string()),
        };
        state.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user,
            },
        );
        self
    }

    pub async fn set_faults(&self, faults: Faults) {
        self.state.lock().await.faults = faults;
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Store a row directly, bypassing faults and the call log.
    pub async fn seed(&self, table: &str, row: Value) -> Value {
        let mut state = self.state.lock().await;
        let row = state.stamp(row);
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        row
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().await;
        state.tables.get(table).cloned().unwrap_or_default()
    }

    /// Stored bytes and content type of a file.
    pub async fn file(&self, bucket: &str, path: &str) -> Option<(Vec<u8>, String)> {
        let state = self.state.lock().await;
        state
            .files
            .get(&(bucket.to_string(), path.to_string()))
            .map(|f| (f.bytes.clone(), f.content_type.clone()))
    }

    pub async fn file_count(&self, bucket: &str) -> usize {
        let state = self.state.lock().await;
        state.files.keys().filter(|(b, _)| b == bucket).count()
    }

    fn fail(message: &Option<String>) -> Result<(), AppError> {
        match message {
            Some(message) => Err(AppError::Remote(message.clone())),
            None => Ok(()),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn project(row: &Value, columns: &str) -> Value {
    let wanted: Vec<&str> = columns.split(',').map(str::trim).collect();
    if wanted.contains(&"*") {
        return row.clone();
    }
    let mut out = Map::new();
    for column in wanted {
        if let Some(value) = row.get(column) {
            out.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(out)
}

#[async_trait]
impl RowStore for MemoryBackend {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, AppError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Select {
            table: table.to_string(),
        });
        Self::fail(&state.faults.select)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column))
                    .then_with(|| compare_values(a.get("id"), b.get("id")));
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        Ok(rows
            .iter()
            .map(|row| project(row, &query.columns))
            .collect())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, AppError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Insert {
            table: table.to_string(),
        });
        Self::fail(&state.faults.insert)?;

        let row = state.stamp(row);
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Delete {
            table: table.to_string(),
            filter: filter.clone(),
        });
        Self::fail(&state.faults.delete)?;

        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|row| !filter.matches(row));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Upload {
            bucket: bucket.to_string(),
            path: path.to_string(),
            upsert: options.upsert,
        });
        if let Some(limit) = state.faults.upload_after {
            if state.uploads >= limit {
                return Err(AppError::Remote(format!("Upload of {} rejected", path)));
            }
        }

        let key = (bucket.to_string(), path.to_string());
        if !options.upsert && state.files.contains_key(&key) {
            return Err(AppError::Remote("The resource already exists".to_string()));
        }
        state.files.insert(
            key,
            StoredFile {
                bytes,
                content_type: options.content_type.clone(),
            },
        );
        state.uploads += 1;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.public_base, bucket, path)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Remove {
            bucket: bucket.to_string(),
            paths: paths.to_vec(),
        });
        Self::fail(&state.faults.remove)?;

        for path in paths {
            state.files.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = {
            let mut state = self.state.lock().await;
            state.calls.push(Call::SignIn {
                email: email.to_string(),
            });
            let user = match state.accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => {
                    return Err(AppError::Unauthorized(
                        "Invalid login credentials".to_string(),
                    ))
                }
            };
            state.session = Some(user.clone());
            user
        };
        // No subscribers is fine.
        let _ = self.auth_events.send(AuthEvent::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        {
            let mut state = self.state.lock().await;
            state.calls.push(Call::SignOut);
            Self::fail(&state.faults.sign_out)?;
            state.session = None;
        }
        let _ = self.auth_events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, AppError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::CurrentUser);
        Self::fail(&state.faults.current_user)?;
        Ok(state.session.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id_and_created_at() {
        let backend = MemoryBackend::new();
        let first = backend.insert("events", json!({ "title": "a" })).await.unwrap();
        let second = backend.insert("events", json!({ "title": "b" })).await.unwrap();

        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert!(second["created_at"].as_str() > first["created_at"].as_str());
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_projects() {
        let backend = MemoryBackend::new();
        backend.seed("t", json!({ "name": "old", "keep": true })).await;
        backend.seed("t", json!({ "name": "hidden", "keep": false })).await;
        backend.seed("t", json!({ "name": "new", "keep": true })).await;

        let rows = backend
            .select(
                "t",
                &Select::columns("name").eq("keep", true).order_desc("created_at"),
            )
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({ "name": "new" }), json!({ "name": "old" })]);
    }

    #[tokio::test]
    async fn test_upload_without_upsert_rejects_existing_path() {
        let backend = MemoryBackend::new();
        let options = UploadOptions::new("image/png");
        backend.upload("b", "x.png", vec![1], &options).await.unwrap();

        let err = backend
            .upload("b", "x.png", vec![2], &options)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Remote(_)));

        let upsert = UploadOptions {
            upsert: true,
            ..options
        };
        backend.upload("b", "x.png", vec![3], &upsert).await.unwrap();
        assert_eq!(backend.file("b", "x.png").await.unwrap().0, vec![3]);
    }

    #[tokio::test]
    async fn test_upload_fault_after_limit() {
        let backend = MemoryBackend::new();
        backend
            .set_faults(Faults {
                upload_after: Some(1),
                ..Faults::default()
            })
            .await;
        let options = UploadOptions::new("image/png");

        assert!(backend.upload("b", "1", vec![], &options).await.is_ok());
        assert!(backend.upload("b", "2", vec![], &options).await.is_err());
        assert_eq!(backend.file_count("b").await, 1);
    }

    #[tokio::test]
    async fn test_sign_in_broadcasts_and_sets_session() {
        let backend = MemoryBackend::new().with_user("admin@example.com", "pw");
        let mut events = backend.subscribe();

        assert!(backend.sign_in("admin@example.com", "wrong").await.is_err());
        let user = backend.sign_in("admin@example.com", "pw").await.unwrap();

        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedIn(user.clone()));
        assert_eq!(backend.current_user().await.unwrap(), Some(user));

        backend.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
        assert_eq!(backend.current_user().await.unwrap(), None);
    }
}
