//! Conversions between BSON values and GraphQL values.

use async_graphql::{Name, Number, Value};
use bson::{Binary, Bson, Document, spec::BinarySubtype};

/// Converts a GraphQL input value into BSON.
///
/// Integral numbers become `Int32` when they fit and `Int64` otherwise; enums become strings.
pub fn gql_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Boolean(b) => Bson::Boolean(*b),
        Value::Enum(name) => Bson::String(name.to_string()),
        Value::Binary(bytes) => Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: bytes.to_vec(),
        }),
        Value::List(items) => Bson::Array(items.iter().map(gql_to_bson).collect()),
        Value::Object(fields) => Bson::Document(
            fields
                .iter()
                .map(|(key, value)| (key.to_string(), gql_to_bson(value)))
                .collect(),
        ),
    }
}

fn number_to_bson(n: &Number) -> Bson {
    if let Some(i) = n.as_i64() {
        return match i32::try_from(i) {
            Ok(small) => Bson::Int32(small),
            Err(_) => Bson::Int64(i),
        };
    }

    n.as_f64().map(Bson::Double).unwrap_or(Bson::Null)
}

/// Collects resolver arguments into a document, keeping argument order.
pub fn args_to_document<'a>(args: impl IntoIterator<Item = (&'a Name, &'a Value)>) -> Document {
    args.into_iter()
        .map(|(name, value)| (name.to_string(), gql_to_bson(value)))
        .collect()
}

/// Converts a BSON value into a GraphQL output value.
///
/// Object ids become hex strings. Values without a GraphQL counterpart are rendered through
/// their display form.
pub fn bson_to_gql(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Boolean(b),
        Bson::String(s) => Value::String(s),
        Bson::Int32(n) => Value::Number(Number::from(n)),
        Bson::Int64(n) => Value::Number(Number::from(n)),
        Bson::Double(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Array(items) => Value::List(items.into_iter().map(bson_to_gql).collect()),
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (Name::new(key), bson_to_gql(value)))
                .collect(),
        ),
        other => Value::String(other.to_string()),
    }
}
