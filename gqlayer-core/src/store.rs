//! The document store collaborator.
//!
//! Generated resolvers never touch a database directly. They go through a [`ModelStore`],
//! addressing documents by collection name and filtering them with plain equality documents
//! (`{ "title": "intro", "_id": ObjectId(..) }`). Store errors are passed through to the
//! caller untouched.
//!
//! # Traits
//!
//! - [`ModelStore`]: The per-collection document operations resolvers rely on
//! - [`StoreBuilder`]: Factory trait for creating store instances
//!
//! # Examples
//!
//! ```ignore
//! use gqlayer_core::store::ModelStore;
//! use bson::doc;
//!
//! let saved = store.save("tests", doc! { "title": "hello" }).await?;
//! let found = store.find_one("tests", doc! { "_id": saved.get("_id").cloned().unwrap() }).await?;
//! assert_eq!(found.as_ref(), Some(&saved));
//! ```

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use std::{fmt::Debug, sync::Arc};

use crate::{error::StoreResult, page::PaginationParams};

/// Document operations a generated resolver performs against a collection.
///
/// Filters are equality matches on top-level keys. A filter value matches a stored array
/// when the array contains it. An empty filter matches every document.
///
/// Implementations must be thread-safe; resolvers for concurrent requests share one store.
#[async_trait]
pub trait ModelStore: Send + Sync + Debug {
    /// Returns the first document matching the filter.
    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>>;

    /// Returns every document matching the filter, or only the requested page of them.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<PaginationParams>,
    ) -> StoreResult<Vec<Document>>;

    /// Persists a new document and returns it as stored, including its assigned `_id`.
    async fn save(&self, collection: &str, document: Document) -> StoreResult<Document>;

    /// Sets `changes` on the first document matching the filter and returns the updated
    /// document, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> StoreResult<Option<Document>>;

    /// Deletes every document matching the filter and returns the deleted documents.
    async fn remove(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>>;

    /// Converts an id string received from a caller into the store's native identity value.
    ///
    /// The default turns 24-character hex strings into object ids and keeps anything else
    /// as a string.
    fn native_id(&self, id: &str) -> Bson {
        match ObjectId::parse_str(id) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(id.to_string()),
        }
    }
}

#[async_trait]
impl<S> ModelStore for &S
where
    S: ModelStore + ?Sized,
{
    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<PaginationParams>,
    ) -> StoreResult<Vec<Document>> {
        (**self).find(collection, filter, page).await
    }

    async fn save(&self, collection: &str, document: Document) -> StoreResult<Document> {
        (**self).save(collection, document).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> StoreResult<Option<Document>> {
        (**self)
            .find_one_and_update(collection, filter, changes)
            .await
    }

    async fn remove(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>> {
        (**self).remove(collection, filter).await
    }

    fn native_id(&self, id: &str) -> Bson {
        (**self).native_id(id)
    }
}

#[async_trait]
impl<S> ModelStore for Arc<S>
where
    S: ModelStore + ?Sized,
{
    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        page: Option<PaginationParams>,
    ) -> StoreResult<Vec<Document>> {
        (**self).find(collection, filter, page).await
    }

    async fn save(&self, collection: &str, document: Document) -> StoreResult<Document> {
        (**self).save(collection, document).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> StoreResult<Option<Document>> {
        (**self)
            .find_one_and_update(collection, filter, changes)
            .await
    }

    async fn remove(&self, collection: &str, filter: Document) -> StoreResult<Vec<Document>> {
        (**self).remove(collection, filter).await
    }

    fn native_id(&self, id: &str) -> Bson {
        (**self).native_id(id)
    }
}

/// Factory trait for stores that need asynchronous setup (connections, handshakes).
#[async_trait]
pub trait StoreBuilder {
    type Backend: ModelStore;

    async fn build(self) -> StoreResult<Self::Backend>;
}
