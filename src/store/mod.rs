//! Document store adapter.
//!
//! [`DocumentStore`] is the only place that knows how records are laid out in
//! the database: it turns typed records into BSON documents on the way in and
//! hands back fully materialized documents on the way out. The handle is
//! decided once at startup; when it is unavailable every call fails fast.

mod memory;
mod mongo;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use mongodb::bson::{self, oid::ObjectId, Bson, DateTime as BsonDateTime, Document};
use serde::Serialize;

use crate::config::Config;
use crate::error::{BackendError, StoreError};

pub use memory::MemoryBackend;
pub use mongo::MongoBackend;

/// Field the database uses for its primary key.
pub const NATIVE_ID_FIELD: &str = "_id";

const MEMORY_SCHEME: &str = "memory://";

/// Identifier assigned by the store when a document is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Native(ObjectId),
    External(String),
}

impl Identifier {
    pub fn from_bson(value: &Bson) -> Self {
        match value {
            Bson::ObjectId(oid) => Identifier::Native(*oid),
            Bson::String(s) => Identifier::External(s.clone()),
            other => Identifier::External(other.to_string()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Native(oid) => write!(f, "{}", oid.to_hex()),
            Identifier::External(s) => f.write_str(s),
        }
    }
}

/// Equality filter: a document matches when every listed field is equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

/// Raw operations a database must offer to back a [`DocumentStore`].
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    fn database_name(&self) -> &str;

    /// Inserts one document and returns the value stored under `_id`.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, BackendError>;

    /// Returns all matching documents in natural order, at most `limit` of them.
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        limit: Option<i64>,
    ) -> Result<Vec<Document>, BackendError>;

    async fn collection_names(&self) -> Result<Vec<String>, BackendError>;
}

#[derive(Clone)]
pub enum StoreHandle {
    Connected(Arc<dyn DocumentBackend>),
    Unavailable { reason: String },
}

/// Shared entry point for every collection operation.
#[derive(Clone)]
pub struct DocumentStore {
    handle: StoreHandle,
}

impl DocumentStore {
    pub fn new(handle: StoreHandle) -> Self {
        Self { handle }
    }

    pub fn with_backend(backend: impl DocumentBackend + 'static) -> Self {
        Self::new(StoreHandle::Connected(Arc::new(backend)))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(StoreHandle::Unavailable {
            reason: reason.into(),
        })
    }

    /// Builds the process-wide store from configuration. Never panics: any
    /// missing setting or client failure leaves the store unavailable.
    pub async fn connect(config: &Config) -> Self {
        let (url, name) = match (&config.database_url, &config.database_name) {
            (Some(url), Some(name)) => (url, name),
            (None, _) => {
                warn!("DATABASE_URL is not set, running without a database");
                return Self::unavailable("DATABASE_URL is not set");
            }
            (_, None) => {
                warn!("DATABASE_NAME is not set, running without a database");
                return Self::unavailable("DATABASE_NAME is not set");
            }
        };

        if url.starts_with(MEMORY_SCHEME) {
            info!("Using in-memory document store '{}'", name);
            return Self::with_backend(MemoryBackend::new(name.as_str()));
        }

        match MongoBackend::init(url, name, config.database_timeout).await {
            Ok(backend) => {
                info!("MongoDB client ready for database '{}'", name);
                Self::with_backend(backend)
            }
            Err(e) => {
                error!("Failed to initialize MongoDB client: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.handle, StoreHandle::Connected(_))
    }

    pub fn database_name(&self) -> Option<&str> {
        match &self.handle {
            StoreHandle::Connected(backend) => Some(backend.database_name()),
            StoreHandle::Unavailable { .. } => None,
        }
    }

    fn backend(&self) -> Result<&Arc<dyn DocumentBackend>, StoreError> {
        match &self.handle {
            StoreHandle::Connected(backend) => Ok(backend),
            StoreHandle::Unavailable { reason } => Err(StoreError::Unavailable(reason.clone())),
        }
    }

    /// Inserts `record` as a new document, stamped with `created_at` and
    /// `updated_at`, and returns the identifier the store assigned.
    pub async fn create<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<Identifier, StoreError> {
        let backend = self.backend()?;
        let mut document = bson::to_document(record)?;
        let now = BsonDateTime::from_millis(Utc::now().timestamp_millis());
        document.insert("created_at", now);
        document.insert("updated_at", now);

        let inserted_id = backend
            .insert_one(collection, document)
            .await
            .map_err(|source| StoreError::Write {
                collection: collection.to_string(),
                source,
            })?;
        Ok(Identifier::from_bson(&inserted_id))
    }

    pub async fn list(
        &self,
        collection: &str,
        filter: Filter,
        limit: Option<i64>,
    ) -> Result<Vec<Document>, StoreError> {
        self.backend()?
            .find(collection, filter, limit)
            .await
            .map_err(|source| StoreError::Read {
                collection: collection.to_string(),
                source,
            })
    }

    pub async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.backend()?
            .collection_names()
            .await
            .map_err(|source| StoreError::Read {
                collection: "*".to_string(),
                source,
            })
    }
}
