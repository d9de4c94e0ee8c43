//! JSON configuration: store connection options, the default access policy and model
//! declarations.
//!
//! ```json
//! {
//!   "mongoUrl": "mongodb://localhost:27017",
//!   "database": "app",
//!   "defaultAccess": "allow",
//!   "dataRequirements": {
//!     "Test": { "title": { "type": "String" }, "content": { "type": "String" } },
//!     "Course": { "sections": [{ "type": "ObjectId", "ref": "Section" }] },
//!     "Section": { "title": { "type": "String" } }
//!   }
//! }
//! ```
//!
//! Field specs use the type tags `ObjectId`, `String`, `Boolean`, `Number` and `Image`. An
//! `ObjectId` with a `ref` is a reference to the named model, and a one-element array is a
//! list of its element.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    error::{SchemaError, SchemaResult},
    model::{CompositeKind, FieldType, ModelDescription, ModelRegistry},
    permission::{Access, Permissions},
};

/// One field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// `[ element ]`
    List(Vec<FieldSpec>),
    /// `{ "type": "String" }` or `{ "type": "ObjectId", "ref": "Section" }`
    Scalar {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },
}

impl FieldSpec {
    /// Converts the declaration of `model.field` into a field descriptor.
    pub fn to_field_type(&self, model: &str, field: &str) -> SchemaResult<FieldType> {
        match self {
            FieldSpec::List(items) => match items.as_slice() {
                [element] => Ok(FieldType::list_of(element.to_field_type(model, field)?)),
                _ => Err(SchemaError::Config(format!(
                    "list field {model}.{field} must declare exactly one element type"
                ))),
            },
            FieldSpec::Scalar {
                type_name,
                reference: Some(target),
            } => {
                if type_name != "ObjectId" {
                    return Err(SchemaError::Config(format!(
                        "field {model}.{field} sets `ref` on a `{type_name}`, only `ObjectId` can reference"
                    )));
                }
                Ok(FieldType::reference(target.clone()))
            }
            FieldSpec::Scalar {
                type_name,
                reference: None,
            } => match type_name.as_str() {
                "ObjectId" => Ok(FieldType::Identifier),
                "String" => Ok(FieldType::Text),
                "Boolean" => Ok(FieldType::Boolean),
                "Number" => Ok(FieldType::Numeric),
                "Image" => Ok(FieldType::Composite(CompositeKind::Image)),
                _ => Err(SchemaError::UnknownFieldType {
                    model: model.to_string(),
                    field: field.to_string(),
                    type_name: type_name.clone(),
                }),
            },
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlayerConfig {
    /// Connection string of the MongoDB deployment, when one is used. `mongoURL` is accepted
    /// too.
    #[serde(default, alias = "mongoURL")]
    pub mongo_url: Option<String>,
    /// Database holding the model collections. Without it, stores use the default database
    /// of the connection string.
    #[serde(default)]
    pub database: Option<String>,
    /// Access policy for models without a permission record.
    #[serde(default)]
    pub default_access: Access,
    /// Model name to field declarations, in declaration order.
    #[serde(default)]
    pub data_requirements: IndexMap<String, IndexMap<String, FieldSpec>>,
}

impl GqlayerConfig {
    pub fn from_json_str(json: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            SchemaError::Config(format!("failed to read {}: {err}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration");

        Self::from_json_str(&content)
    }

    /// Builds and validates the model registry declared by `dataRequirements`.
    pub fn model_registry(&self) -> SchemaResult<ModelRegistry> {
        let mut registry = ModelRegistry::new();

        for (name, fields) in &self.data_requirements {
            let mut model = ModelDescription::new(name.clone());
            for (field, spec) in fields {
                model = model.field(field.clone(), spec.to_field_type(name, field)?);
            }
            registry.insert(model)?;
        }

        registry.validate()?;

        Ok(registry)
    }

    /// An empty permission set carrying the configured fallback policy.
    pub fn permissions(&self) -> Permissions {
        Permissions::new().with_fallback(self.default_access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;

    const CONFIG: &str = r#"{
        "mongoUrl": "mongodb://localhost:27017",
        "database": "app",
        "dataRequirements": {
            "Course": {
                "title": { "type": "String" },
                "cover": { "type": "Image" },
                "price": { "type": "Number" },
                "published": { "type": "Boolean" },
                "sections": [{ "type": "ObjectId", "ref": "Section" }],
                "tags": [{ "type": "String" }]
            },
            "Section": {
                "title": { "type": "String" },
                "course": { "type": "ObjectId", "ref": "Course" },
                "externalId": { "type": "ObjectId" }
            }
        }
    }"#;

    #[test]
    fn parses_models_in_declaration_order() {
        let config = GqlayerConfig::from_json_str(CONFIG).unwrap();
        let registry = config.model_registry().unwrap();

        assert_eq!(config.database.as_deref(), Some("app"));
        assert_eq!(
            registry.models().map(|m| m.name()).collect::<Vec<_>>(),
            vec!["Course", "Section"]
        );

        let course = registry.get("Course").unwrap();
        assert_eq!(
            course.fields().get("sections"),
            Some(&FieldType::list_of(FieldType::reference("Section")))
        );
        assert_eq!(course.fields().get("cover"), Some(&FieldType::Composite(CompositeKind::Image)));
        assert_eq!(course.fields().get("price"), Some(&FieldType::Numeric));
        assert_eq!(course.fields().get("tags"), Some(&FieldType::list_of(FieldType::Text)));

        let section = registry.get("Section").unwrap();
        assert_eq!(section.fields().get("course"), Some(&FieldType::reference("Course")));
        assert_eq!(section.fields().get("externalId"), Some(&FieldType::Identifier));
    }

    #[test]
    fn accepts_the_upper_case_url_key() {
        let config = GqlayerConfig::from_json_str(
            r#"{
                "mongoURL": "mongodb://db:27017/app",
                "dataRequirements": { "Test": { "title": { "type": "String" } } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.mongo_url.as_deref(), Some("mongodb://db:27017/app"));
        assert_eq!(config.database, None);
        assert!(config.model_registry().unwrap().contains("Test"));
    }

    #[test]
    fn unknown_type_tags_are_rejected() {
        let config = GqlayerConfig::from_json_str(
            r#"{ "dataRequirements": { "Test": { "at": { "type": "Date" } } } }"#,
        )
        .unwrap();

        assert!(matches!(
            config.model_registry(),
            Err(SchemaError::UnknownFieldType { type_name, .. }) if type_name == "Date"
        ));
    }

    #[test]
    fn dangling_references_are_rejected() {
        let config = GqlayerConfig::from_json_str(
            r#"{ "dataRequirements": { "Test": { "owner": { "type": "ObjectId", "ref": "User" } } } }"#,
        )
        .unwrap();

        assert!(matches!(config.model_registry(), Err(SchemaError::DanglingReference { .. })));
    }

    #[test]
    fn malformed_lists_and_refs_are_rejected() {
        let empty_list = GqlayerConfig::from_json_str(
            r#"{ "dataRequirements": { "Test": { "tags": [] } } }"#,
        )
        .unwrap();
        let ref_on_string = GqlayerConfig::from_json_str(
            r#"{ "dataRequirements": { "Test": { "t": { "type": "String", "ref": "Test" } } } }"#,
        )
        .unwrap();

        assert!(matches!(empty_list.model_registry(), Err(SchemaError::Config(_))));
        assert!(matches!(ref_on_string.model_registry(), Err(SchemaError::Config(_))));
    }

    #[test]
    fn default_access_drives_the_permission_fallback() {
        let open = GqlayerConfig::from_json_str(CONFIG).unwrap();
        let closed = GqlayerConfig::from_json_str(
            r#"{ "defaultAccess": "deny", "dataRequirements": {} }"#,
        )
        .unwrap();

        assert!(crate::permission::can("Course", OperationKind::Remove, &open.permissions()));
        assert!(!crate::permission::can("Course", OperationKind::Get, &closed.permissions()));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        assert!(matches!(GqlayerConfig::from_json_str("{"), Err(SchemaError::Config(_))));
        assert!(matches!(
            GqlayerConfig::from_path("/nonexistent/gqlayer.json"),
            Err(SchemaError::Config(_))
        ));
    }
}
