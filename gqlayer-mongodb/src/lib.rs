//! MongoDB store for gqlayer.
//!
//! This crate provides a MongoDB-based implementation of the `ModelStore` trait, so that
//! generated operations read and write real collections.
//!
//! To use this store through the facade crate, enable the `mongodb` feature:
//!
//! ```toml
//! [dependencies]
//! gqlayer = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gqlayer_core::store::StoreBuilder;
//! use gqlayer_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "app")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as gqlayer_mongodb;

pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
