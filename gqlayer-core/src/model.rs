//! Model descriptions: the declared shape of every document type exposed through the API.
//!
//! A [`ModelDescription`] maps field names to [`FieldType`] descriptors and optionally carries
//! a pre-create hook. Descriptions are collected in a [`ModelRegistry`], which is validated
//! once before any schema is generated and is immutable afterwards.
//!
//! # Example
//!
//! ```ignore
//! use gqlayer_core::model::{CompositeKind, FieldType, ModelDescription, ModelRegistry};
//!
//! let registry = ModelRegistry::new()
//!     .register(
//!         ModelDescription::new("Course")
//!             .field("title", FieldType::Text)
//!             .field("cover", FieldType::Composite(CompositeKind::Image))
//!             .field("sections", FieldType::list_of(FieldType::reference("Section"))),
//!     )?
//!     .register(ModelDescription::new("Section").field("title", FieldType::Text))?;
//!
//! registry.validate()?;
//! ```

use bson::Document;
use indexmap::IndexMap;
use std::{collections::HashSet, fmt, sync::Arc};

use crate::{
    error::{SchemaError, SchemaResult},
    mapping::IMAGE_OUTPUT_TYPE,
    sanitize::{ID_FIELD, NATIVE_ID_FIELD},
};

/// Composite field kinds stored as embedded sub-documents with a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// An uploaded image: `{ public_id, url }`.
    Image,
}

impl CompositeKind {
    /// Keys of the embedded sub-document, all strings.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            CompositeKind::Image => &["public_id", "url"],
        }
    }
}

/// Semantic type of a single model field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// An opaque identifier.
    Identifier,
    /// Free text.
    Text,
    /// A boolean flag.
    Boolean,
    /// A number.
    Numeric,
    /// An embedded composite value.
    Composite(CompositeKind),
    /// A reference to a document of another model, by model name.
    Reference(String),
    /// A list of values of the inner type.
    ListOf(Box<FieldType>),
}

impl FieldType {
    /// Creates a reference to the named model.
    pub fn reference(model: impl Into<String>) -> Self {
        FieldType::Reference(model.into())
    }

    /// Creates a list of the given element type.
    pub fn list_of(inner: FieldType) -> Self {
        FieldType::ListOf(Box::new(inner))
    }

    /// Returns the model referenced by this field, looking through lists.
    pub fn referenced_model(&self) -> Option<&str> {
        match self {
            FieldType::Reference(model) => Some(model),
            FieldType::ListOf(inner) => inner.referenced_model(),
            _ => None,
        }
    }
}

/// Transform applied to the arguments of a create operation before they are persisted.
pub type BeforeCreateHook = Arc<dyn Fn(Document) -> Document + Send + Sync>;

/// Declarative description of one model.
#[derive(Clone)]
pub struct ModelDescription {
    name: String,
    fields: IndexMap<String, FieldType>,
    before_create: Option<BeforeCreateHook>,
}

impl ModelDescription {
    /// Creates a model with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            before_create: None,
        }
    }

    /// Adds (or replaces) a field.
    pub fn field(mut self, name: impl Into<String>, field: FieldType) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Sets the pre-create hook.
    pub fn before_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(Document) -> Document + Send + Sync + 'static,
    {
        self.before_create = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order. The implicit `id` is not part of this map.
    pub fn fields(&self) -> &IndexMap<String, FieldType> {
        &self.fields
    }

    pub fn before_create_hook(&self) -> Option<&BeforeCreateHook> {
        self.before_create.as_ref()
    }

    /// Runs the pre-create hook, if any, over the create arguments.
    pub fn apply_before_create(&self, document: Document) -> Document {
        match &self.before_create {
            Some(hook) => hook(document),
            None => document,
        }
    }

    /// Name of the store collection backing this model.
    pub fn collection_name(&self) -> String {
        collection_name(&self.name)
    }
}

impl fmt::Debug for ModelDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescription")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("before_create", &self.before_create.is_some())
            .finish()
    }
}

/// Collection name for a model: lowercase name plus a trailing `s`.
pub fn collection_name(model: &str) -> String {
    format!("{}s", model.to_lowercase())
}

/// The full set of models an API is generated from.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelDescription>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateModel`] if a model with the same name exists.
    pub fn register(mut self, model: ModelDescription) -> SchemaResult<Self> {
        self.insert(model)?;
        Ok(self)
    }

    /// Adds a model in place.
    pub fn insert(&mut self, model: ModelDescription) -> SchemaResult<()> {
        if self.models.contains_key(model.name()) {
            return Err(SchemaError::DuplicateModel(model.name().to_string()));
        }

        self.models.insert(model.name().to_string(), model);

        Ok(())
    }

    /// Attaches a pre-create hook to an already registered model.
    pub fn set_before_create<F>(&mut self, model: &str, hook: F) -> SchemaResult<()>
    where
        F: Fn(Document) -> Document + Send + Sync + 'static,
    {
        let description = self
            .models
            .get_mut(model)
            .ok_or_else(|| SchemaError::Config(format!("unknown model `{model}`")))?;
        description.before_create = Some(Arc::new(hook));

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ModelDescription> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Models in registration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelDescription> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Checks the registry can be turned into a schema.
    ///
    /// Rejects empty registries, names that are not valid GraphQL names, reserved names,
    /// models whose generated names collide, explicit `id` or `_id` fields and references to
    /// unregistered models.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.models.is_empty() {
            return Err(SchemaError::EmptyRegistry);
        }

        let mut lowered = HashSet::new();

        for model in self.models.values() {
            check_name(model.name())?;

            // `Image` would generate `ImageInput`, which the built-in composite already owns.
            if model.name() == IMAGE_OUTPUT_TYPE {
                return Err(SchemaError::InvalidName {
                    name: model.name().to_string(),
                    reason: "reserved for the built-in image type".into(),
                });
            }

            // `test` and `Test` would both produce the `test` query.
            if !lowered.insert(model.name().to_lowercase()) {
                return Err(SchemaError::DuplicateModel(model.name().to_string()));
            }

            for (field, ty) in model.fields() {
                check_name(field)?;

                if field == ID_FIELD || field == NATIVE_ID_FIELD {
                    return Err(SchemaError::InvalidName {
                        name: format!("{}.{}", model.name(), field),
                        reason: "`id` is implicit on every model".into(),
                    });
                }

                if let Some(target) = ty.referenced_model() {
                    if !self.models.contains_key(target) {
                        return Err(SchemaError::DanglingReference {
                            model: model.name().to_string(),
                            field: field.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

fn check_name(name: &str) -> SchemaResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid {
        return Err(SchemaError::InvalidName {
            name: name.to_string(),
            reason: "must match [_A-Za-z][_0-9A-Za-z]*".into(),
        });
    }

    if name.starts_with("__") {
        return Err(SchemaError::InvalidName {
            name: name.to_string(),
            reason: "names starting with `__` are reserved for introspection".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn course_registry() -> ModelRegistry {
        ModelRegistry::new()
            .register(
                ModelDescription::new("Course")
                    .field("title", FieldType::Text)
                    .field("sections", FieldType::list_of(FieldType::reference("Section"))),
            )
            .unwrap()
            .register(ModelDescription::new("Section").field("title", FieldType::Text))
            .unwrap()
    }

    #[test]
    fn fields_keep_declaration_order() {
        let model = ModelDescription::new("Post")
            .field("title", FieldType::Text)
            .field("body", FieldType::Text)
            .field("published", FieldType::Boolean);

        let names: Vec<_> = model.fields().keys().cloned().collect();
        assert_eq!(names, vec!["title", "body", "published"]);
        assert_eq!(model.collection_name(), "posts");
    }

    #[test]
    fn referenced_model_looks_through_lists() {
        let field = FieldType::list_of(FieldType::reference("Topic"));

        assert_eq!(field.referenced_model(), Some("Topic"));
        assert_eq!(FieldType::Text.referenced_model(), None);
    }

    #[test]
    fn before_create_hook_transforms_arguments() {
        let model = ModelDescription::new("User").before_create(|mut document| {
            document.insert("role", "member");
            document
        });

        let document = model.apply_before_create(doc! { "name": "Ada" });
        assert_eq!(document, doc! { "name": "Ada", "role": "member" });
    }

    #[test]
    fn set_before_create_requires_a_registered_model() {
        let mut registry = course_registry();

        assert!(registry.set_before_create("Course", |d| d).is_ok());
        assert!(registry.get("Course").unwrap().before_create_hook().is_some());
        assert!(matches!(
            registry.set_before_create("Missing", |d| d),
            Err(SchemaError::Config(_))
        ));
    }

    #[test]
    fn duplicate_models_are_rejected() {
        let result = course_registry().register(ModelDescription::new("Course"));

        assert!(matches!(result, Err(SchemaError::DuplicateModel(name)) if name == "Course"));
    }

    #[test]
    fn validate_accepts_cross_references() {
        assert!(course_registry().validate().is_ok());
    }

    #[test]
    fn validate_rejects_dangling_references() {
        let registry = ModelRegistry::new()
            .register(ModelDescription::new("Course").field("owner", FieldType::reference("User")))
            .unwrap();

        match registry.validate() {
            Err(SchemaError::DanglingReference { model, field, target }) => {
                assert_eq!((model.as_str(), field.as_str(), target.as_str()), ("Course", "owner", "User"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_case_insensitive_collisions() {
        let registry = ModelRegistry::new()
            .register(ModelDescription::new("Test"))
            .unwrap()
            .register(ModelDescription::new("test"))
            .unwrap();

        assert!(matches!(registry.validate(), Err(SchemaError::DuplicateModel(_))));
    }

    #[test]
    fn validate_rejects_bad_names() {
        let explicit_id = ModelRegistry::new()
            .register(ModelDescription::new("Test").field("id", FieldType::Identifier))
            .unwrap();
        let native_id = ModelRegistry::new()
            .register(ModelDescription::new("Test").field("_id", FieldType::Identifier))
            .unwrap();
        let dashed = ModelRegistry::new()
            .register(ModelDescription::new("Test").field("first-name", FieldType::Text))
            .unwrap();
        let reserved = ModelRegistry::new()
            .register(ModelDescription::new("Image"))
            .unwrap();

        assert!(matches!(explicit_id.validate(), Err(SchemaError::InvalidName { .. })));
        assert!(matches!(native_id.validate(), Err(SchemaError::InvalidName { .. })));
        assert!(matches!(dashed.validate(), Err(SchemaError::InvalidName { .. })));
        assert!(matches!(reserved.validate(), Err(SchemaError::InvalidName { .. })));
        assert!(matches!(ModelRegistry::new().validate(), Err(SchemaError::EmptyRegistry)));
    }
}
