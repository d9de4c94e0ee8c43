//! Translation between API argument names and the store's native document keys.
//!
//! Callers address documents by `id`; stores key them by `_id`. Incoming arguments are
//! sanitized into native filters before reaching a store, and documents coming back are
//! presented with `id` again.

use bson::{Bson, Document};

use crate::store::ModelStore;

/// Identity key exposed through the API.
pub const ID_FIELD: &str = "id";

/// Identity key used by stores.
pub const NATIVE_ID_FIELD: &str = "_id";

/// Rewrites API arguments into a native store filter.
///
/// `id` is removed and, when it carries a value, re-inserted as `_id` converted through
/// [`ModelStore::native_id`]. Every other key passes through unchanged. A null or empty `id`
/// is dropped entirely, so it does not narrow the filter.
pub fn sanitize_args<S>(mut args: Document, store: &S) -> Document
where
    S: ModelStore + ?Sized,
{
    let Some(id) = args.remove(ID_FIELD) else {
        return args;
    };

    if let Some(native) = native_id_value(id, store) {
        args.insert(NATIVE_ID_FIELD, native);
    }

    tracing::trace!(filter = %args, "sanitized arguments");

    args
}

/// Converts a raw `id` argument value into the store's native identity, or `None` if it
/// carries no identity.
pub fn native_id_value<S>(id: Bson, store: &S) -> Option<Bson>
where
    S: ModelStore + ?Sized,
{
    match id {
        Bson::Null | Bson::Undefined => None,
        Bson::String(s) if s.is_empty() => None,
        Bson::String(s) => Some(store.native_id(&s)),
        Bson::Int32(n) => Some(store.native_id(&n.to_string())),
        Bson::Int64(n) => Some(store.native_id(&n.to_string())),
        other => Some(other),
    }
}

/// Prepares a stored document for the API: `_id` becomes `id` and object ids become hex
/// strings, at every nesting level.
pub fn present_document(document: Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| {
            let key = if key == NATIVE_ID_FIELD {
                ID_FIELD.to_string()
            } else {
                key
            };
            (key, present_value(value))
        })
        .collect()
}

fn present_value(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::Document(document) => Bson::Document(present_document(document)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(present_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::StoreResult, page::PaginationParams};
    use async_trait::async_trait;
    use bson::{doc, oid::ObjectId};

    #[derive(Debug)]
    struct NoopStore;

    #[async_trait]
    impl ModelStore for NoopStore {
        async fn find_one(&self, _: &str, _: Document) -> StoreResult<Option<Document>> {
            Ok(None)
        }

        async fn find(
            &self,
            _: &str,
            _: Document,
            _: Option<PaginationParams>,
        ) -> StoreResult<Vec<Document>> {
            Ok(Vec::new())
        }

        async fn save(&self, _: &str, document: Document) -> StoreResult<Document> {
            Ok(document)
        }

        async fn find_one_and_update(
            &self,
            _: &str,
            _: Document,
            _: Document,
        ) -> StoreResult<Option<Document>> {
            Ok(None)
        }

        async fn remove(&self, _: &str, _: Document) -> StoreResult<Vec<Document>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn id_is_replaced_by_native_key() {
        let filter = sanitize_args(doc! { "id": "abc123", "title": "intro" }, &NoopStore);

        assert!(!filter.contains_key("id"));
        assert_eq!(filter.get("_id"), Some(&Bson::String("abc123".into())));
        assert_eq!(filter.get_str("title").unwrap(), "intro");
    }

    #[test]
    fn hex_ids_become_object_ids() {
        let oid = ObjectId::new();
        let filter = sanitize_args(doc! { "id": oid.to_hex() }, &NoopStore);

        assert_eq!(filter, doc! { "_id": oid });
    }

    #[test]
    fn empty_ids_do_not_narrow_the_filter() {
        assert_eq!(sanitize_args(doc! { "id": Bson::Null }, &NoopStore), doc! {});
        assert_eq!(sanitize_args(doc! { "id": "", "title": "x" }, &NoopStore), doc! { "title": "x" });
        assert_eq!(sanitize_args(doc! {}, &NoopStore), doc! {});
    }

    #[test]
    fn other_keys_pass_through_untouched() {
        let args = doc! { "published": true, "tags": ["a", "b"], "cover": { "url": "u" } };

        assert_eq!(sanitize_args(args.clone(), &NoopStore), args);
    }

    #[test]
    fn present_renames_ids_recursively() {
        let course = ObjectId::new();
        let section = ObjectId::new();
        let document = doc! {
            "_id": course,
            "title": "Rust",
            "sections": [{ "_id": section, "title": "Intro" }],
            "owner": ObjectId::new(),
        };

        let presented = present_document(document);

        assert_eq!(presented.get_str("id").unwrap(), course.to_hex());
        assert!(!presented.contains_key("_id"));
        let first = presented.get_array("sections").unwrap()[0].as_document().unwrap();
        assert_eq!(first.get_str("id").unwrap(), section.to_hex());
        assert!(presented.get_str("owner").is_ok());
        assert_eq!(presented.keys().next().map(String::as_str), Some("id"));
    }
}
