use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::{DocumentBackend, Filter, NATIVE_ID_FIELD};
use crate::error::BackendError;

/// Process-local backend selected with a `memory://` database URL.
/// Documents live in insertion order and are lost on exit.
pub struct MemoryBackend {
    name: String,
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Bson, BackendError> {
        let id = match document.get(NATIVE_ID_FIELD).cloned() {
            Some(existing) => existing,
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert(NATIVE_ID_FIELD, id.clone());
                id
            }
        };

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|d| d.get(NATIVE_ID_FIELD) == Some(&id)) {
            return Err(format!("duplicate key in collection '{}': {}", collection, id).into());
        }
        documents.push(document);
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        limit: Option<i64>,
    ) -> Result<Vec<Document>, BackendError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        // Same convention as the driver: zero means no limit, negatives count from the magnitude.
        let cap = match limit {
            Some(0) | None => usize::MAX,
            Some(n) => n.unsigned_abs() as usize,
        };
        Ok(documents
            .iter()
            .filter(|d| filter.matches(d))
            .take(cap)
            .cloned()
            .collect())
    }

    async fn collection_names(&self) -> Result<Vec<String>, BackendError> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
