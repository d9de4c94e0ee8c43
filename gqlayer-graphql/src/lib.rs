//! GraphQL assembly for gqlayer.
//!
//! Turns a validated [`ModelRegistry`](gqlayer_core::model::ModelRegistry) into an executable
//! `async-graphql` dynamic schema with a `RootQuery` (get and list operations) and a
//! `RootMutation` (create, update and remove operations).
//!
//! # Example
//!
//! ```ignore
//! use gqlayer_graphql::SchemaBuilder;
//! use gqlayer_core::context::RequestContext;
//!
//! let schema = SchemaBuilder::new(registry, store).build()?;
//! println!("{}", schema.sdl());
//!
//! let response = schema
//!     .execute("{ listTests { id title } }", RequestContext::default())
//!     .await;
//! ```

pub mod error;
pub mod resolver;
pub mod schema;
pub mod types;
pub mod value;

pub use error::into_graphql_error;
pub use schema::{GeneratedSchema, MUTATION_ROOT, QUERY_ROOT, SchemaBuilder};
