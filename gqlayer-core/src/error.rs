//! Error types and result types for schema generation, store access and resolution.
//!
//! Three families of errors exist:
//!
//! - [`SchemaError`] - configuration problems, raised while building the schema
//! - [`StoreError`] - anything a store collaborator reports, passed through untouched
//! - [`ResolveError`] - what a generated resolver returns: a local permission denial or a store error

use bson::error::Error as BsonError;
use serde_json::{Error as SerdeJsonError, Value, json};
use thiserror::Error;

use crate::operation::OperationKind;

/// Machine-readable code attached to permission denials.
pub const PERMISSION_DENIED_CODE: &str = "PERMISSION_DENIED";

/// Human-readable message attached to permission denials.
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission denied";

/// Machine-readable code attached to errors raised by a store.
pub const STORE_ERROR_CODE: &str = "STORE_ERROR";

/// Represents all possible errors that can occur when talking to a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The document has an invalid structure for the requested operation.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Configuration errors detected while turning model descriptions into a schema.
///
/// All of these are fatal at startup: a registry that produces one of them never serves a request.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A field declares a type tag that has no mapping.
    #[error("Unknown field type `{type_name}` for field {model}.{field}")]
    UnknownFieldType {
        model: String,
        field: String,
        type_name: String,
    },
    /// A reference field points to a model that is not registered.
    #[error("Field {model}.{field} references unknown model `{target}`")]
    DanglingReference {
        model: String,
        field: String,
        target: String,
    },
    /// Two models would produce the same operation or collection names.
    #[error("Model {0} is registered more than once")]
    DuplicateModel(String),
    /// A model or field name cannot be exposed through the API.
    #[error("Invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },
    /// Nothing to generate.
    #[error("No models registered")]
    EmptyRegistry,
    /// The configuration document could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The GraphQL runtime rejected the assembled schema.
    #[error("Schema build error: {0}")]
    Build(String),
}

/// A specialized `Result` type for schema generation.
pub type SchemaResult<T> = Result<T, SchemaError>;

impl From<SerdeJsonError> for SchemaError {
    fn from(err: SerdeJsonError) -> Self {
        SchemaError::Config(err.to_string())
    }
}

/// The outcome of a generated resolver that did not produce a value.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The permission gate rejected the operation; the store was not called.
    #[error("Permission denied")]
    PermissionDenied { model: String, action: OperationKind },
    /// The store failed; the error is passed through as-is.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveError {
    /// Machine-readable code for the transport's error formatter.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::PermissionDenied { .. } => PERMISSION_DENIED_CODE,
            ResolveError::Store(_) => STORE_ERROR_CODE,
        }
    }

    /// Structured payload for locally produced errors, `None` for store errors.
    pub fn payload(&self) -> Option<Value> {
        match self {
            ResolveError::PermissionDenied { .. } => {
                Some(json!({ "_error": PERMISSION_DENIED_MESSAGE }))
            }
            ResolveError::Store(_) => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ResolveError::PermissionDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_carries_code_and_payload() {
        let err = ResolveError::PermissionDenied {
            model: "User".into(),
            action: OperationKind::Remove,
        };

        assert_eq!(err.to_string(), "Permission denied");
        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert_eq!(err.payload(), Some(json!({ "_error": "Permission denied" })));
        assert!(err.is_permission_denied());
    }

    #[test]
    fn store_errors_pass_through_their_message() {
        let err = ResolveError::from(StoreError::Backend("connection reset".into()));

        assert_eq!(err.to_string(), "Backend error: connection reset");
        assert_eq!(err.code(), "STORE_ERROR");
        assert!(err.payload().is_none());
    }
}
