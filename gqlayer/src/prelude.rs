//! Convenient re-exports of commonly used types from gqlayer.
//!
//! ```ignore
//! use gqlayer::prelude::*;
//! ```

pub use gqlayer_core::{
    config::{FieldSpec, GqlayerConfig},
    context::RequestContext,
    error::{ResolveError, SchemaError, SchemaResult, StoreError, StoreResult},
    model::{CompositeKind, FieldType, ModelDescription, ModelRegistry},
    operation::{OperationDescriptor, OperationKind, OperationOutput, Resolver},
    page::PaginationParams,
    permission::{Access, Capability, PermissionRecord, Permissions},
    store::{ModelStore, StoreBuilder},
};

pub use gqlayer_graphql::{GeneratedSchema, SchemaBuilder};
