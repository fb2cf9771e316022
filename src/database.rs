// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Key-Value Storage
//!
//! All user state is kept as JSON documents under per-user namespaced keys
//! (`profile_<user>`, `activities_<user>`, ...). The [`KeyValueStore`] trait
//! hides the backend so the calculation code never depends on where the
//! documents live. Two backends are provided:
//!
//! - [`SqliteStore`]: a single `kv_store` table through sqlx
//! - [`MemoryStore`]: a process-local map, handy for tests and dry runs
//!
//! Documents are written exactly as serialized; there is no versioning or
//! migration of the layout.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

use crate::constants::storage_keys;
use crate::logging::AppLogger;

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend failure: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("Failed to (de)serialize value for key {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid database location: {0}")]
    InvalidLocation(String),
}

/// Namespace of a stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Profile,
    Activities,
    Baseline,
    Targets,
    Plan,
    Progress,
    /// Local sign-in credentials, keyed by email rather than user id
    Account,
}

impl StorageKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Profile => storage_keys::PROFILE,
            Self::Activities => storage_keys::ACTIVITIES,
            Self::Baseline => storage_keys::BASELINE,
            Self::Targets => storage_keys::TARGETS,
            Self::Plan => storage_keys::PLAN,
            Self::Progress => storage_keys::PROGRESS,
            Self::Account => storage_keys::ACCOUNT,
        }
    }
}

/// Fully qualified storage key, rendered as `{kind}_{owner}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    kind: StorageKind,
    owner: String,
}

impl StorageKey {
    pub fn new(kind: StorageKind, owner: impl Into<String>) -> Self {
        Self {
            kind,
            owner: owner.into(),
        }
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.owner)
    }
}

/// Get/set/delete of JSON documents by namespaced key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Raw document stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the document stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Read and deserialize the document stored under `key`
pub async fn load_json<S, T>(store: &S, key: &StorageKey) -> Result<Option<T>, StorageError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let key = key.to_string();
    match store.get(&key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Serialization { key, source }),
        None => Ok(None),
    }
}

/// Serialize `value` and store it under `key`
pub async fn save_json<S, T>(store: &S, key: &StorageKey, value: &T) -> Result<(), StorageError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let key = key.to_string();
    let raw = serde_json::to_string(value)
        .map_err(|source| StorageError::Serialization { key: key.clone(), source })?;
    store.set(&key, &raw).await
}

/// SQLite-backed store using a single key/value table
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connect to `database_url`, creating the file and table when missing
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let in_memory = database_url.contains(":memory:");

        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if in_memory {
            database_url.to_string()
        } else {
            ensure_parent_dir(database_url)?;
            with_create_mode(database_url)
        };

        // An in-memory database lives only as long as its connections
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePoolOptions::new().connect(&connection_options).await?
        };

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Create the key/value table
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            storage_keys::KV_TABLE
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Add `mode=rwc` unless the URL already picks a mode
fn with_create_mode(database_url: &str) -> String {
    match database_url.split_once('?') {
        Some((_, query)) if query.split('&').any(|p| p.starts_with("mode=")) => database_url.to_string(),
        Some((_, "")) => format!("{database_url}mode=rwc"),
        Some(_) => format!("{database_url}&mode=rwc"),
        None => format!("{database_url}?mode=rwc"),
    }
}

fn ensure_parent_dir(database_url: &str) -> Result<(), StorageError> {
    let location = database_url
        .split_once('?')
        .map_or(database_url, |(location, _)| location);
    let path = location
        .strip_prefix("sqlite://")
        .or_else(|| location.strip_prefix("sqlite:"))
        .ok_or_else(|| StorageError::InvalidLocation(database_url.to_string()))?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::InvalidLocation(format!("{}: {}", parent.display(), e)))?;
        }
    }
    Ok(())
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let started = Instant::now();
        let row = sqlx::query(&format!("SELECT value FROM {} WHERE key = ?1", storage_keys::KV_TABLE))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        AppLogger::log_storage_operation("get", key, true, started.elapsed().as_millis() as u64);

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let started = Instant::now();
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            storage_keys::KV_TABLE
        ))
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        AppLogger::log_storage_operation("set", key, true, started.elapsed().as_millis() as u64);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE key = ?1", storage_keys::KV_TABLE))
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "Deleted storage key");
        Ok(result.rows_affected() > 0)
    }
}

/// Process-local store
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        debug!(key = %key, "Memory store read");
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(key = %key, bytes = value.len(), "Memory store write");
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, Intensity, Mood};

    async fn create_test_db() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn sample_activity() -> Activity {
        Activity {
            id: "a1".to_string(),
            user_id: "user_1".to_string(),
            exercise_type: "swimming".to_string(),
            duration: 40,
            intensity: Intensity::High,
            mood: Mood::Tired,
            notes: Some("pool laps".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_storage_key_format() {
        assert_eq!(StorageKey::new(StorageKind::Profile, "user_1").to_string(), "profile_user_1");
        assert_eq!(StorageKey::new(StorageKind::Activities, "abc").to_string(), "activities_abc");
        assert_eq!(StorageKey::new(StorageKind::Progress, "abc").to_string(), "progress_abc");
    }

    #[tokio::test]
    async fn test_sqlite_set_get_delete() {
        let db = create_test_db().await;

        assert!(db.get("plan_user_1").await.unwrap().is_none());

        db.set("plan_user_1", "{\"a\":1}").await.unwrap();
        assert_eq!(db.get("plan_user_1").await.unwrap().as_deref(), Some("{\"a\":1}"));

        // Overwrite replaces the document
        db.set("plan_user_1", "{\"a\":2}").await.unwrap();
        assert_eq!(db.get("plan_user_1").await.unwrap().as_deref(), Some("{\"a\":2}"));

        assert!(db.delete("plan_user_1").await.unwrap());
        assert!(!db.delete("plan_user_1").await.unwrap());
        assert!(db.get("plan_user_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_round_trip_both_backends() {
        let sqlite = create_test_db().await;
        let memory = MemoryStore::new();
        let key = StorageKey::new(StorageKind::Activities, "user_1");
        let activities = vec![sample_activity()];

        save_json(&sqlite, &key, &activities).await.unwrap();
        save_json(&memory, &key, &activities).await.unwrap();

        let from_sqlite: Vec<Activity> = load_json(&sqlite, &key).await.unwrap().unwrap();
        let from_memory: Vec<Activity> = load_json(&memory, &key).await.unwrap().unwrap();

        assert_eq!(from_sqlite, activities);
        assert_eq!(from_memory, activities);
    }

    #[tokio::test]
    async fn test_corrupt_document_reports_key() {
        let memory = MemoryStore::new();
        memory.set("baseline_user_1", "not json").await.unwrap();

        let key = StorageKey::new(StorageKind::Baseline, "user_1");
        let result: Result<Option<Activity>, _> = load_json(&memory, &key).await;

        match result {
            Err(StorageError::Serialization { key, .. }) => assert_eq!(key, "baseline_user_1"),
            other => panic!("expected serialization error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_memory_store_len() {
        let memory = MemoryStore::new();
        assert!(memory.is_empty().await);
        memory.set("k1", "1").await.unwrap();
        memory.set("k2", "2").await.unwrap();
        assert_eq!(memory.len().await, 2);
    }

    #[test]
    fn test_create_mode_respects_existing_query() {
        assert_eq!(with_create_mode("sqlite:./a.db"), "sqlite:./a.db?mode=rwc");
        assert_eq!(with_create_mode("sqlite:./a.db?cache=shared"), "sqlite:./a.db?cache=shared&mode=rwc");
        assert_eq!(with_create_mode("sqlite:./a.db?mode=ro"), "sqlite:./a.db?mode=ro");
        assert_eq!(with_create_mode("sqlite:./a.db?cache=shared&mode=rw"), "sqlite:./a.db?cache=shared&mode=rw");
        assert_eq!(with_create_mode("sqlite:./a.db?"), "sqlite:./a.db?mode=rwc");
    }

    #[test]
    fn test_ensure_parent_dir_rejects_other_schemes() {
        assert!(matches!(
            ensure_parent_dir("postgres://localhost/db"),
            Err(StorageError::InvalidLocation(_))
        ));
    }
}
