//! Permission records and the permission gate.
//!
//! Permissions are keyed by model name. A model without a record falls back to the
//! [`Permissions`] access policy, which allows by default. A model with a record is
//! restricted to exactly the capabilities the record grants; capabilities missing from a
//! record are denied.
//!
//! ```ignore
//! use gqlayer_core::{operation::OperationKind, permission::{can, PermissionRecord, Permissions}};
//!
//! let permissions = Permissions::new().with("User", PermissionRecord::view_only());
//!
//! assert!(can("User", OperationKind::List, &permissions));
//! assert!(!can("User", OperationKind::Remove, &permissions));
//! assert!(can("Post", OperationKind::Remove, &permissions));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::operation::OperationKind;

/// What a permission record can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    View,
    Create,
    Update,
    Remove,
}

impl OperationKind {
    /// The capability checked before running an operation of this kind.
    pub fn capability(&self) -> Capability {
        match self {
            OperationKind::Get | OperationKind::List => Capability::View,
            OperationKind::Create => Capability::Create,
            OperationKind::Update => Capability::Update,
            OperationKind::Remove => Capability::Remove,
        }
    }
}

/// Capabilities granted on one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_remove: bool,
}

impl PermissionRecord {
    /// A record granting every capability.
    pub fn allow_all() -> Self {
        Self {
            can_view: true,
            can_create: true,
            can_update: true,
            can_remove: true,
        }
    }

    /// A record granting nothing.
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// A record granting only reads.
    pub fn view_only() -> Self {
        Self {
            can_view: true,
            ..Self::default()
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.can_view,
            Capability::Create => self.can_create,
            Capability::Update => self.can_update,
            Capability::Remove => self.can_remove,
        }
    }
}

/// Policy applied to models that have no permission record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Allow,
    Deny,
}

/// The permission record set of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(flatten)]
    records: HashMap<String, PermissionRecord>,
    #[serde(skip)]
    fallback: Access,
}

impl Permissions {
    /// An empty, default-open permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for models without a record.
    pub fn with_fallback(mut self, fallback: Access) -> Self {
        self.fallback = fallback;
        self
    }

    /// Adds (or replaces) the record of a model.
    pub fn with(mut self, model: impl Into<String>, record: PermissionRecord) -> Self {
        self.insert(model, record);
        self
    }

    pub fn insert(&mut self, model: impl Into<String>, record: PermissionRecord) {
        self.records.insert(model.into(), record);
    }

    pub fn get(&self, model: &str) -> Option<&PermissionRecord> {
        self.records.get(model)
    }

    pub fn fallback(&self) -> Access {
        self.fallback
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The permission gate: whether `action` may run against `model`.
///
/// Pure and synchronous. Models without a record follow the fallback policy, which allows
/// unless it was explicitly set to [`Access::Deny`].
pub fn can(model: &str, action: OperationKind, permissions: &Permissions) -> bool {
    match permissions.get(model) {
        Some(record) => record.allows(action.capability()),
        None => permissions.fallback() == Access::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [OperationKind; 5] = [
        OperationKind::Get,
        OperationKind::List,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Remove,
    ];

    #[test]
    fn models_without_a_record_are_unrestricted() {
        let permissions = Permissions::new().with("User", PermissionRecord::deny_all());

        for action in ACTIONS {
            assert!(can("Post", action, &permissions));
            assert!(can("Post", action, &Permissions::new()));
        }
    }

    #[test]
    fn records_are_matched_per_capability() {
        let records = [
            PermissionRecord::allow_all(),
            PermissionRecord::deny_all(),
            PermissionRecord::view_only(),
            PermissionRecord {
                can_view: false,
                can_create: true,
                can_update: false,
                can_remove: true,
            },
        ];

        for record in records {
            let permissions = Permissions::new().with("User", record);

            assert_eq!(can("User", OperationKind::Get, &permissions), record.can_view);
            assert_eq!(can("User", OperationKind::List, &permissions), record.can_view);
            assert_eq!(can("User", OperationKind::Create, &permissions), record.can_create);
            assert_eq!(can("User", OperationKind::Update, &permissions), record.can_update);
            assert_eq!(can("User", OperationKind::Remove, &permissions), record.can_remove);
        }
    }

    #[test]
    fn missing_capabilities_in_a_record_deny() {
        let permissions: Permissions = serde_json::from_str(
            r#"{ "User": { "canView": true, "canRemove": false, "canUpdate": false } }"#,
        )
        .unwrap();

        assert!(can("User", OperationKind::Get, &permissions));
        assert!(!can("User", OperationKind::Remove, &permissions));
        assert!(!can("User", OperationKind::Update, &permissions));
        assert!(!can("User", OperationKind::Create, &permissions));
    }

    #[test]
    fn deny_fallback_closes_unlisted_models() {
        let permissions = Permissions::new()
            .with_fallback(Access::Deny)
            .with("Post", PermissionRecord::view_only());

        assert!(can("Post", OperationKind::List, &permissions));
        assert!(!can("Post", OperationKind::Create, &permissions));
        for action in ACTIONS {
            assert!(!can("User", action, &permissions));
        }
    }
}
