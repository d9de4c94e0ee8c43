//! Per-request context handed to generated resolvers by the transport.

use serde_json::Value;

use crate::{
    operation::OperationKind,
    permission::{Permissions, can},
};

/// Data the transport attaches to one request. Read-only to resolvers.
///
/// The default context has no permission records and therefore follows the permissive
/// fallback policy.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    permissions: Permissions,
    identity: Option<Value>,
}

impl RequestContext {
    pub fn new(permissions: Permissions) -> Self {
        Self {
            permissions,
            identity: None,
        }
    }

    /// Attaches an opaque caller identity (a decoded token, a session, ...).
    pub fn with_identity(mut self, identity: Value) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn identity(&self) -> Option<&Value> {
        self.identity.as_ref()
    }

    /// Runs the permission gate against this context's permissions.
    pub fn can(&self, model: &str, action: OperationKind) -> bool {
        can(model, action, &self.permissions)
    }
}
