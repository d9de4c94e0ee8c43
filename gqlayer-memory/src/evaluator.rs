//! Equality filter evaluation for in-memory documents.

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};
use std::collections::HashMap;

/// Comparable representation of BSON values.
///
/// Integers and floats are normalized to `f64`, so `Int32(3)`, `Int64(3)` and `Double(3.0)`
/// compare equal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Values with no meaningful comparison never equal anything.
    Opaque,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null | Bson::Undefined => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(f64::from(*value)),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            _ => Comparable::Opaque,
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Matches documents against an equality filter.
///
/// A document matches when, for every filter key, its value equals the filter value or is an
/// array containing it. A `null` filter value also matches a missing key. The empty filter
/// matches everything.
pub(crate) struct DocumentMatcher<'a> {
    filter: &'a Document,
}

impl<'a> DocumentMatcher<'a> {
    pub fn new(filter: &'a Document) -> Self {
        Self { filter }
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.filter
            .iter()
            .all(|(key, expected)| Self::matches_field(document.get(key), expected))
    }

    fn matches_field(actual: Option<&Bson>, expected: &Bson) -> bool {
        let expected = Comparable::from(expected);

        match actual {
            None => expected == Comparable::Null,
            Some(actual) => match Comparable::from(actual) {
                Comparable::Array(items) if !matches!(expected, Comparable::Array(_)) => {
                    items.iter().any(|item| item == &expected)
                }
                actual => actual == expected,
            },
        }
    }

    pub fn filter_documents<'d>(
        &self,
        documents: impl IntoIterator<Item = &'d Document>,
    ) -> Vec<Document> {
        documents
            .into_iter()
            .filter(|document| self.matches(document))
            .cloned()
            .collect()
    }
}
