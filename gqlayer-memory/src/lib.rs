//! In-memory document store for gqlayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the `ModelStore` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development,
//! tests and small deployments.
//!
//! # Quick Start
//!
//! ```ignore
//! use gqlayer_core::store::ModelStore;
//! use gqlayer_memory::InMemoryStore;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::new();
//!
//!     let saved = store.save("tests", doc! { "title": "hello" }).await?;
//!     let found = store.find("tests", doc! { "title": "hello" }, None).await?;
//!     assert_eq!(found, vec![saved]);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as gqlayer_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
