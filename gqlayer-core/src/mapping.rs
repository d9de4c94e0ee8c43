//! Type mapping from field descriptors to API type handles.
//!
//! Every field is mapped twice: once for reads ([`Direction::Output`]) and once for writes
//! ([`Direction::Input`]). Output references resolve to the referenced model's generated
//! object type, input references to a plain `ID`.
//!
//! Generation happens in two passes so that models may reference each other in any order,
//! including cyclically:
//!
//! 1. [`ObjectTypes::declare`] reserves an object type name for every registered model.
//! 2. [`map_field`] maps fields against those names.
//!
//! | Field                 | Output          | Input        |
//! |-----------------------|-----------------|--------------|
//! | `Identifier`          | `ID`            | `ID`         |
//! | `Text`                | `String`        | `String`     |
//! | `Boolean`             | `Boolean`       | `Boolean`    |
//! | `Numeric`             | `Float`         | `Float`      |
//! | `Composite(Image)`    | `Image`         | `ImageInput` |
//! | `Reference(M)`        | `MType`         | `ID`         |
//! | `ListOf(f)`           | `[output(f)]`   | `[input(f)]` |

use indexmap::IndexMap;
use std::{collections::HashMap, fmt};

use crate::{
    error::{SchemaError, SchemaResult},
    model::{CompositeKind, FieldType, ModelDescription, ModelRegistry},
};

pub const ID: &str = "ID";
pub const STRING: &str = "String";
pub const BOOLEAN: &str = "Boolean";
pub const FLOAT: &str = "Float";
pub const INT: &str = "Int";

/// Output object type of the image composite.
pub const IMAGE_OUTPUT_TYPE: &str = "Image";
/// Input object type of the image composite.
pub const IMAGE_INPUT_TYPE: &str = "ImageInput";

/// A reference to a named API type, possibly wrapped in lists. All handles are nullable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHandle {
    Named(String),
    List(Box<TypeHandle>),
}

impl TypeHandle {
    pub fn named(name: impl Into<String>) -> Self {
        TypeHandle::Named(name.into())
    }

    pub fn list(inner: TypeHandle) -> Self {
        TypeHandle::List(Box::new(inner))
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Named(name) => write!(f, "{name}"),
            TypeHandle::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Which side of the API a mapping is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Argument and input object types.
    Input,
    /// Result object types.
    Output,
}

/// Name of the generated output object type of a model.
pub fn output_type_name(model: &str) -> String {
    format!("{model}Type")
}

/// Name of the generated input object type of a model.
pub fn input_type_name(model: &str) -> String {
    format!("{model}Input")
}

/// Object type names reserved for every model during the first generation pass.
#[derive(Debug, Clone, Default)]
pub struct ObjectTypes {
    output: HashMap<String, String>,
}

impl ObjectTypes {
    /// Reserves the output type name of every model in the registry.
    pub fn declare(registry: &ModelRegistry) -> Self {
        let mut types = Self::default();

        for model in registry.models() {
            types
                .output
                .insert(model.name().to_string(), output_type_name(model.name()));
        }

        types
    }

    pub fn output_type(&self, model: &str) -> Option<&str> {
        self.output.get(model).map(String::as_str)
    }
}

/// Raised by [`map_field`] when an output reference names a model without a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReference(pub String);

/// Maps a field descriptor in the given direction.
pub fn map_field(
    field: &FieldType,
    direction: Direction,
    known: &ObjectTypes,
) -> Result<TypeHandle, UnknownReference> {
    match direction {
        Direction::Input => Ok(map_input(field)),
        Direction::Output => map_output(field, known),
    }
}

/// Input mapping never depends on other models: references are written as ids.
pub fn map_input(field: &FieldType) -> TypeHandle {
    match field {
        FieldType::Identifier | FieldType::Reference(_) => TypeHandle::named(ID),
        FieldType::Text => TypeHandle::named(STRING),
        FieldType::Boolean => TypeHandle::named(BOOLEAN),
        FieldType::Numeric => TypeHandle::named(FLOAT),
        FieldType::Composite(CompositeKind::Image) => TypeHandle::named(IMAGE_INPUT_TYPE),
        FieldType::ListOf(inner) => TypeHandle::list(map_input(inner)),
    }
}

pub fn map_output(field: &FieldType, known: &ObjectTypes) -> Result<TypeHandle, UnknownReference> {
    Ok(match field {
        FieldType::Identifier => TypeHandle::named(ID),
        FieldType::Text => TypeHandle::named(STRING),
        FieldType::Boolean => TypeHandle::named(BOOLEAN),
        FieldType::Numeric => TypeHandle::named(FLOAT),
        FieldType::Composite(CompositeKind::Image) => TypeHandle::named(IMAGE_OUTPUT_TYPE),
        FieldType::Reference(model) => TypeHandle::named(
            known
                .output_type(model)
                .ok_or_else(|| UnknownReference(model.clone()))?,
        ),
        FieldType::ListOf(inner) => TypeHandle::list(map_output(inner, known)?),
    })
}

/// Maps every declared field of a model, prefixed by the implicit `id`.
///
/// # Errors
///
/// Returns [`SchemaError::DanglingReference`] for output references to undeclared models.
pub fn map_model_fields(
    model: &ModelDescription,
    direction: Direction,
    known: &ObjectTypes,
) -> SchemaResult<IndexMap<String, TypeHandle>> {
    let mut fields = IndexMap::with_capacity(model.fields().len() + 1);

    if direction == Direction::Output {
        fields.insert(crate::sanitize::ID_FIELD.to_string(), TypeHandle::named(ID));
    }

    for (name, field) in model.fields() {
        let handle = map_field(field, direction, known).map_err(|UnknownReference(target)| {
            SchemaError::DanglingReference {
                model: model.name().to_string(),
                field: name.clone(),
                target,
            }
        })?;
        fields.insert(name.clone(), handle);
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> ObjectTypes {
        let registry = ModelRegistry::new()
            .register(ModelDescription::new("Section"))
            .unwrap()
            .register(ModelDescription::new("Topic"))
            .unwrap();

        ObjectTypes::declare(&registry)
    }

    #[test]
    fn every_field_type_maps_in_both_directions() {
        let known = known();
        let fields = [
            FieldType::Identifier,
            FieldType::Text,
            FieldType::Boolean,
            FieldType::Numeric,
            FieldType::Composite(CompositeKind::Image),
            FieldType::reference("Section"),
            FieldType::list_of(FieldType::Text),
            FieldType::list_of(FieldType::reference("Topic")),
            FieldType::list_of(FieldType::list_of(FieldType::Boolean)),
        ];

        for field in &fields {
            assert!(map_field(field, Direction::Input, &known).is_ok(), "{field:?}");
            assert!(map_field(field, Direction::Output, &known).is_ok(), "{field:?}");
        }
    }

    #[test]
    fn scalars_map_to_builtin_types() {
        let known = known();

        assert_eq!(map_output(&FieldType::Identifier, &known).unwrap(), TypeHandle::named("ID"));
        assert_eq!(map_output(&FieldType::Text, &known).unwrap(), TypeHandle::named("String"));
        assert_eq!(map_input(&FieldType::Boolean), TypeHandle::named("Boolean"));
        assert_eq!(map_input(&FieldType::Numeric), TypeHandle::named("Float"));
    }

    #[test]
    fn image_uses_distinct_input_and_output_types() {
        let image = FieldType::Composite(CompositeKind::Image);

        assert_eq!(map_output(&image, &known()).unwrap().to_string(), "Image");
        assert_eq!(map_input(&image).to_string(), "ImageInput");
    }

    #[test]
    fn references_map_to_object_types_on_output_and_ids_on_input() {
        let known = known();
        let single = FieldType::reference("Section");
        let many = FieldType::list_of(FieldType::reference("Topic"));

        assert_eq!(map_output(&single, &known).unwrap().to_string(), "SectionType");
        assert_eq!(map_input(&single).to_string(), "ID");
        assert_eq!(map_output(&many, &known).unwrap().to_string(), "[TopicType]");
        assert_eq!(map_input(&many).to_string(), "[ID]");
    }

    #[test]
    fn undeclared_output_references_fail() {
        let result = map_output(&FieldType::list_of(FieldType::reference("User")), &known());

        assert_eq!(result, Err(UnknownReference("User".into())));
    }

    #[test]
    fn model_output_fields_start_with_implicit_id() {
        let model = ModelDescription::new("Course")
            .field("title", FieldType::Text)
            .field("sections", FieldType::list_of(FieldType::reference("Section")));

        let output = map_model_fields(&model, Direction::Output, &known()).unwrap();
        let input = map_model_fields(&model, Direction::Input, &known()).unwrap();

        assert_eq!(
            output.iter().map(|(k, v)| format!("{k}:{v}")).collect::<Vec<_>>(),
            vec!["id:ID", "title:String", "sections:[SectionType]"]
        );
        assert_eq!(
            input.iter().map(|(k, v)| format!("{k}:{v}")).collect::<Vec<_>>(),
            vec!["title:String", "sections:[ID]"]
        );
    }

    #[test]
    fn model_fields_report_the_dangling_field() {
        let model = ModelDescription::new("Course").field("owner", FieldType::reference("User"));

        assert!(matches!(
            map_model_fields(&model, Direction::Output, &known()),
            Err(SchemaError::DanglingReference { field, .. }) if field == "owner"
        ));
    }
}
