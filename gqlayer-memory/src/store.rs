//! In-memory storage implementation of [`ModelStore`].
//!
//! Documents live in per-collection vectors, in insertion order, behind an async-aware
//! read-write lock.

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};

use gqlayer_core::{
    error::{StoreError, StoreResult},
    page::PaginationParams,
    sanitize::NATIVE_ID_FIELD,
    store::{ModelStore, StoreBuilder},
};

use crate::evaluator::DocumentMatcher;

type StoreMap = HashMap<String, Vec<Document>>;

/// Thread-safe in-memory document store.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state; clones share the
/// same data. Every operation scans the whole collection.
///
/// # Example
///
/// ```ignore
/// use gqlayer_memory::InMemoryStore;
/// use gqlayer_core::store::ModelStore;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let saved = store.save("users", doc! { "name": "Alice" }).await?;
/// assert!(saved.get_object_id("_id").is_ok());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> documents
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl ModelStore for InMemoryStore {
    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        let store = self.store.read().await;
        let matcher = DocumentMatcher::new(&filter);

        Ok(store
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| matcher.matches(d)))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<PaginationParams>,
    ) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(vec![]);
        };

        let found = DocumentMatcher::new(&filter).filter_documents(documents);
        tracing::trace!(collection, matched = found.len(), "in-memory find");

        Ok(match page {
            Some(page) => page.apply(found),
            None => found,
        })
    }

    async fn save(&self, collection: &str, document: Document) -> StoreResult<Document> {
        let mut store = self.store.write().await;
        let documents = store.entry(collection.to_string()).or_default();

        let document = match document.get(NATIVE_ID_FIELD) {
            Some(id) => {
                if documents.iter().any(|d| d.get(NATIVE_ID_FIELD) == Some(id)) {
                    return Err(StoreError::InvalidDocument(format!(
                        "duplicate {NATIVE_ID_FIELD} {id} in collection {collection}"
                    )));
                }
                document
            }
            None => {
                let mut stored = Document::new();
                stored.insert(NATIVE_ID_FIELD, ObjectId::new());
                for (key, value) in document {
                    stored.insert(key, value);
                }
                stored
            }
        };

        documents.push(document.clone());

        Ok(document)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> StoreResult<Option<Document>> {
        if changes.contains_key(NATIVE_ID_FIELD) {
            return Err(StoreError::InvalidDocument(format!(
                "{NATIVE_ID_FIELD} cannot be changed"
            )));
        }

        let mut store = self.store.write().await;
        let matcher = DocumentMatcher::new(&filter);

        let Some(document) = store
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|d| matcher.matches(d)))
        else {
            return Ok(None);
        };

        for (key, value) in changes {
            document.insert(key, value);
        }

        Ok(Some(document.clone()))
    }

    async fn remove(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(vec![]);
        };

        let matcher = DocumentMatcher::new(&filter);
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(documents)
            .into_iter()
            .partition(|d| matcher.matches(d));
        *documents = kept;

        tracing::trace!(collection, removed = removed.len(), "in-memory remove");

        Ok(removed)
    }
}

/// Builder for [`InMemoryStore`], optionally pre-seeded with documents.
///
/// # Example
///
/// ```ignore
/// use gqlayer_memory::InMemoryStore;
/// use gqlayer_core::store::StoreBuilder;
///
/// let store = InMemoryStore::builder()
///     .with_documents("tests", vec![doc! { "title": "seeded" }])
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStoreBuilder {
    seed: Vec<(String, Vec<Document>)>,
}

impl InMemoryStoreBuilder {
    /// Documents saved into `collection` when the store is built.
    pub fn with_documents(mut self, collection: impl Into<String>, documents: Vec<Document>) -> Self {
        self.seed.push((collection.into(), documents));
        self
    }
}

#[async_trait]
impl StoreBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let store = InMemoryStore::new();

        for (collection, documents) in self.seed {
            for document in documents {
                store.save(&collection, document).await?;
            }
        }

        Ok(store)
    }
}
