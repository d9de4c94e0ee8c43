//! Core of the gqlayer project: everything needed to turn declarative document models into
//! permission-gated CRUD operations, independent of any GraphQL runtime or storage driver.
//!
//! This crate provides:
//!
//! - **Model descriptions** ([`model`]) - Field descriptors, model descriptions and the registry
//! - **Configuration** ([`config`]) - JSON model declarations and bootstrap options
//! - **Type mapping** ([`mapping`]) - Field descriptors to input/output type handles
//! - **Argument synthesis** ([`args`]) - Argument shapes per operation kind
//! - **Permissions** ([`permission`]) - Permission records and the permission gate
//! - **Request context** ([`context`]) - Per-request data handed over by the transport
//! - **Store abstraction** ([`store`]) - The document store collaborator
//! - **Sanitization** ([`sanitize`]) - API arguments to native store filters and back
//! - **Operations** ([`operation`]) - Operation descriptors and their resolvers
//! - **Pagination** ([`page`]) - Pagination hints forwarded to stores
//! - **Error handling** ([`error`]) - Error types and result aliases
//!
//! # Example
//!
//! ```ignore
//! use gqlayer_core::model::{FieldType, ModelDescription, ModelRegistry};
//!
//! let registry = ModelRegistry::new()
//!     .register(
//!         ModelDescription::new("Test")
//!             .field("title", FieldType::Text)
//!             .field("content", FieldType::Text),
//!     )?;
//!
//! registry.validate()?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as gqlayer_core;

pub mod args;
pub mod config;
pub mod context;
pub mod error;
pub mod mapping;
pub mod model;
pub mod operation;
pub mod page;
pub mod permission;
pub mod sanitize;
pub mod store;
