// Metric store: idempotent schema bootstrap and append-only inserts.
// The backend is picked from the URI scheme: mongodb:// and mongodb+srv:// use a MongoDB
// time-series collection, sqlite:<path> uses a local SQLite table.

mod mongo;
mod sqlite;

pub use mongo::MongoStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::AggregateRecord;

/// Field every record is ordered and indexed by.
pub const TIME_FIELD: &str = "timestamp";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported store URI scheme {0:?} (expected mongodb://, mongodb+srv:// or sqlite:)")]
    UnsupportedUri(String),

    #[error("invalid collection name {0:?}: use ASCII letters, digits and underscores")]
    InvalidCollection(String),

    #[error("failed to connect to store: {0}")]
    Connect(#[source] BoxError),

    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] BoxError),

    #[error("failed to insert record: {0}")]
    Write(#[source] BoxError),

    #[error("failed to read records: {0}")]
    Query(#[source] BoxError),
}

impl StoreError {
    pub(crate) fn connect(e: impl Into<BoxError>) -> Self {
        StoreError::Connect(e.into())
    }

    pub(crate) fn schema(e: impl Into<BoxError>) -> Self {
        StoreError::Schema(e.into())
    }

    pub(crate) fn write(e: impl Into<BoxError>) -> Self {
        StoreError::Write(e.into())
    }

    pub(crate) fn query(e: impl Into<BoxError>) -> Self {
        StoreError::Query(e.into())
    }
}

/// What `ensure_schema` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Created,
    AlreadyPresent,
}

#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Backend label for logs ("mongodb", "sqlite").
    fn backend(&self) -> &'static str;

    fn collection(&self) -> &str;

    /// Create the time-ordered collection and its ascending timestamp index if missing.
    /// Safe to call on every start.
    async fn ensure_schema(&self) -> Result<SchemaState, StoreError>;

    async fn insert(&self, record: &AggregateRecord) -> Result<(), StoreError>;
}

/// Open the store named by `uri`. `database` is only used by MongoDB.
pub async fn connect(
    uri: &str,
    database: &str,
    collection: &str,
) -> Result<Arc<dyn MetricStore>, StoreError> {
    if let Some(path) = sqlite_path(uri) {
        return Ok(Arc::new(SqliteStore::connect(path, collection).await?));
    }
    if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") {
        return Ok(Arc::new(
            MongoStore::connect(uri, database, collection).await?,
        ));
    }
    // Only the scheme: the rest may carry credentials.
    let scheme = uri.split_once(':').map(|(s, _)| s).unwrap_or("");
    Err(StoreError::UnsupportedUri(scheme.to_string()))
}

/// "sqlite:///var/lib/x.db", "sqlite://x.db" and "sqlite:x.db" all name a file path.
pub fn sqlite_path(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("sqlite:")?;
    Some(rest.strip_prefix("//").unwrap_or(rest))
}

pub(crate) fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}
