use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::{options::ClientOptions, Client, Database};

use super::{DocumentBackend, Filter};
use crate::error::BackendError;

const APP_NAME: &str = "supply-chain-tasks";

pub struct MongoBackend {
    db: Database,
}

impl MongoBackend {
    /// Parses the connection string and builds a client. The driver connects
    /// lazily, so an unreachable server only shows up on the first operation,
    /// bounded by `timeout`.
    pub async fn init(uri: &str, db_name: &str, timeout: Duration) -> mongodb::error::Result<Self> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some(APP_NAME.to_string());
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);
        let db = Client::with_options(client_options)?.database(db_name);
        Ok(MongoBackend { db })
    }
}

#[async_trait]
impl DocumentBackend for MongoBackend {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, BackendError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document)
            .await?;
        Ok(result.inserted_id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        limit: Option<i64>,
    ) -> Result<Vec<Document>, BackendError> {
        let coll = self.db.collection::<Document>(collection);
        let mut find = coll.find(filter.into_document());
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        let documents: Vec<Document> = find.await?.try_collect().await?;
        Ok(documents)
    }

    async fn collection_names(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.db.list_collection_names().await?)
    }
}
