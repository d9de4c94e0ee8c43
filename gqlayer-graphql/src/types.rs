//! GraphQL object and input types generated from model descriptions.
//!
//! Every model produces a `<Model>Type` object, and a `<Model>Input` input object when it
//! declares at least one field. The built-in `Image` and `ImageInput` types are always
//! registered.

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ResolverContext, TypeRef,
};
use bson::{Bson, Document};
use gqlayer_core::{
    error::SchemaResult,
    mapping::{
        Direction, IMAGE_INPUT_TYPE, IMAGE_OUTPUT_TYPE, ObjectTypes, STRING, TypeHandle,
        input_type_name, map_model_fields, output_type_name,
    },
    model::{CompositeKind, FieldType, ModelDescription},
};

use crate::value::bson_to_gql;

/// Converts a type handle into a (nullable) GraphQL type reference.
pub fn type_ref(handle: &TypeHandle) -> TypeRef {
    match handle {
        TypeHandle::Named(name) => TypeRef::named(name.clone()),
        TypeHandle::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
    }
}

/// The `Image` output object.
pub fn image_object() -> Object {
    CompositeKind::Image
        .fields()
        .iter()
        .fold(Object::new(IMAGE_OUTPUT_TYPE), |object, name| {
            object.field(Field::new(
                *name,
                TypeRef::named(STRING),
                document_field_resolver(*name, None),
            ))
        })
}

/// The `ImageInput` input object.
pub fn image_input_object() -> InputObject {
    CompositeKind::Image
        .fields()
        .iter()
        .fold(InputObject::new(IMAGE_INPUT_TYPE), |object, name| {
            object.field(InputValue::new(*name, TypeRef::named(STRING)))
        })
}

/// Builds the `<Model>Type` object: the implicit `id` plus every declared field.
pub fn model_object(model: &ModelDescription, known: &ObjectTypes) -> SchemaResult<Object> {
    let fields = map_model_fields(model, Direction::Output, known)?;
    let mut object = Object::new(output_type_name(model.name()))
        .description(format!("Generated from model `{}`", model.name()));

    for (name, handle) in fields {
        let field_type = model.fields().get(&name).cloned();
        object = object.field(Field::new(
            name.clone(),
            type_ref(&handle),
            document_field_resolver(name, field_type),
        ));
    }

    Ok(object)
}

/// Builds the `<Model>Input` input object, or `None` for models without fields.
pub fn model_input_object(model: &ModelDescription, known: &ObjectTypes) -> SchemaResult<Option<InputObject>> {
    let fields = map_model_fields(model, Direction::Input, known)?;
    if fields.is_empty() {
        return Ok(None);
    }

    let object = fields.iter().fold(
        InputObject::new(input_type_name(model.name())),
        |object, (name, handle)| object.field(InputValue::new(name.clone(), type_ref(handle))),
    );

    Ok(Some(object))
}

/// Resolves a field of an object type by reading it from the parent document.
fn document_field_resolver(
    name: impl Into<String>,
    field_type: Option<FieldType>,
) -> impl for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static {
    let name = name.into();

    move |ctx: ResolverContext| {
        let name = name.clone();
        let field_type = field_type.clone();

        FieldFuture::new(async move {
            let document = ctx
                .parent_value
                .downcast_ref::<Document>()
                .ok_or_else(|| async_graphql::Error::new("failed to downcast parent document"))?;

            Ok(document
                .get(&name)
                .cloned()
                .map(|value| to_field_value(value, field_type.as_ref())))
        })
    }
}

/// Wraps a stored value for the GraphQL executor.
///
/// Embedded documents (populated references and composites) are passed on as documents so
/// that their own fields can be resolved; anything else becomes a plain value.
pub fn to_field_value(value: Bson, field_type: Option<&FieldType>) -> FieldValue<'static> {
    match (field_type, value) {
        (_, Bson::Null) => FieldValue::NULL,
        (Some(FieldType::Reference(_) | FieldType::Composite(_)), Bson::Document(document)) => {
            FieldValue::owned_any(document)
        }
        // An unpopulated reference is an id, which cannot stand in for an object.
        (Some(FieldType::Reference(_) | FieldType::Composite(_)), _) => FieldValue::NULL,
        (Some(FieldType::ListOf(inner)), Bson::Array(items)) => FieldValue::list(
            items
                .into_iter()
                .map(|item| to_field_value(item, Some(inner.as_ref()))),
        ),
        (Some(FieldType::ListOf(_)), _) => FieldValue::NULL,
        (_, value) => FieldValue::value(bson_to_gql(value)),
    }
}
