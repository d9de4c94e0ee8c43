use async_trait::async_trait;
use bson::{Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions, ReturnDocument},
};

use gqlayer_core::{
    config::GqlayerConfig,
    error::{StoreError, StoreResult},
    page::PaginationParams,
    sanitize::NATIVE_ID_FIELD,
    store::{ModelStore, StoreBuilder},
};

/// A [`ModelStore`] backed by one MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    pub async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl ModelStore for MongoDbStore {
    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(filter)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<PaginationParams>,
    ) -> StoreResult<Vec<Document>> {
        let mut options = FindOptions::default();

        if let Some(page) = page {
            options.skip = Some(page.offset() as u64);
            options.limit = Some(page.per_page as i64);
        }

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn save(&self, collection: &str, document: Document) -> StoreResult<Document> {
        let document = if document.contains_key(NATIVE_ID_FIELD) {
            document
        } else {
            let mut stored = doc! { NATIVE_ID_FIELD: ObjectId::new() };
            for (key, value) in document {
                stored.insert(key, value);
            }
            stored
        };

        self.get_collection(collection)
            .insert_one(&document)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(document)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> StoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one_and_update(filter, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn remove(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>> {
        let target = self.get_collection(collection);

        let removed = target
            .find(filter)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if removed.is_empty() {
            return Ok(removed);
        }

        let ids = removed
            .iter()
            .filter_map(|document| document.get(NATIVE_ID_FIELD).cloned())
            .collect::<Vec<_>>();

        let result = target
            .delete_many(doc! { NATIVE_ID_FIELD: { "$in": ids } })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::debug!(
            collection,
            matched = removed.len(),
            deleted = result.deleted_count,
            "removed documents"
        );

        Ok(removed)
    }
}

/// Builds a [`MongoDbStore`] from a connection string and a database name.
///
/// Without an explicit database, the default database of the connection string is used.
#[derive(Debug, Clone)]
pub struct MongoDbStoreBuilder {
    dsn: String,
    database: Option<String>,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: Some(database.to_string()),
        }
    }

    /// Takes the connection string from `mongoUrl` (or `mongoURL`) and the database from
    /// `database`, if set.
    pub fn from_config(config: &GqlayerConfig) -> StoreResult<Self> {
        let dsn = config
            .mongo_url
            .as_deref()
            .ok_or_else(|| StoreError::Initialization("`mongoUrl` is not configured".into()))?;

        Ok(Self {
            dsn: dsn.to_string(),
            database: config.database.clone(),
        })
    }
}

#[async_trait]
impl StoreBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    /// Parses the connection string and creates a client. No connection is opened until the
    /// first operation.
    async fn build(self) -> StoreResult<Self::Backend> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        let database = self
            .database
            .or_else(|| options.default_database.clone())
            .ok_or_else(|| {
                StoreError::Initialization(
                    "no database configured and the connection string names none".into(),
                )
            })?;

        Ok(MongoDbStore::new(
            Client::with_options(options).map_err(|e| StoreError::Initialization(e.to_string()))?,
            database,
        ))
    }
}
