//! Main gqlayer crate: declare document models once, get a permission-gated GraphQL CRUD API.
//!
//! This crate is the primary entry point for users of gqlayer. It re-exports the core types
//! and the GraphQL layer, and provides access to the storage backends.
//!
//! For every declared model `M` the generated schema exposes:
//!
//! - `m(id, ...)` (the lowercased model name) and `listMs(pageNumber, pageSize, ...)` on the root query
//! - `createM`, `updateM` and `removeM` on the root mutation
//!
//! Each operation checks the request's permissions before touching the store.
//!
//! # Quick Start
//!
//! ```ignore
//! use gqlayer::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GqlayerConfig::from_json_str(r#"{
//!         "dataRequirements": {
//!             "Test": { "title": { "type": "String" }, "content": { "type": "String" } }
//!         }
//!     }"#).unwrap();
//!
//!     let schema = gqlayer::schema_from_config(&config, InMemoryStore::new()).unwrap();
//!
//!     let response = schema
//!         .execute(
//!             r#"mutation { createTest(title: "hello") { id title } }"#,
//!             RequestContext::new(config.permissions()),
//!         )
//!         .await;
//!
//!     println!("{}", response.data);
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use gqlayer_core::{
    args, config, context, error, mapping, model, operation, page, permission, sanitize, store,
};

pub use gqlayer_graphql as graphql;

// Re-export BSON types for convenience
pub use bson;

use gqlayer_core::{config::GqlayerConfig, error::SchemaResult, store::ModelStore};
use gqlayer_graphql::{GeneratedSchema, SchemaBuilder};

/// Builds the schema for every model declared in `dataRequirements`, served from `store`.
pub fn schema_from_config<S>(config: &GqlayerConfig, store: S) -> SchemaResult<GeneratedSchema>
where
    S: ModelStore + 'static,
{
    let registry = config.model_registry()?;
    tracing::debug!(models = registry.len(), "loaded model declarations");

    SchemaBuilder::new(registry, store).build()
}

/// In-memory storage backend implementations.
pub mod memory {
    pub use gqlayer_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use gqlayer_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::RequestContext, memory::InMemoryStore, permission::PermissionRecord};

    const CONFIG: &str = r#"{
        "defaultAccess": "allow",
        "dataRequirements": {
            "User": { "name": { "type": "String" } },
            "Test": {
                "title": { "type": "String" },
                "author": { "type": "ObjectId", "ref": "User" }
            }
        }
    }"#;

    #[tokio::test]
    async fn config_models_are_served() {
        let config = GqlayerConfig::from_json_str(CONFIG).unwrap();
        let schema = schema_from_config(&config, InMemoryStore::new()).unwrap();

        let response = schema
            .execute(
                r#"mutation { createUser(name: "Ada") { id name } }"#,
                RequestContext::new(config.permissions()),
            )
            .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert!(schema.operation("listTests").is_some());
        assert!(schema.operation("removeUser").is_some());

        let data = serde_json::to_value(&response.data).unwrap();
        assert_eq!(data["createUser"]["name"], "Ada");
    }

    #[tokio::test]
    async fn denied_requests_never_reach_the_store() {
        let config = GqlayerConfig::from_json_str(CONFIG).unwrap();
        let store = InMemoryStore::new();
        let schema = schema_from_config(&config, store.clone()).unwrap();
        let permissions = config.permissions().with("User", PermissionRecord::view_only());

        let response = schema
            .execute(
                r#"mutation { createUser(name: "Ada") { id } }"#,
                RequestContext::new(permissions),
            )
            .await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(store.count("users").await, 0);
    }
}
