use async_graphql::{Error, ErrorExtensions, Value};
use gqlayer_core::error::ResolveError;

/// Converts a resolver outcome into a GraphQL error.
///
/// The message is the error's display string. Extensions carry the machine-readable `code`
/// and, for locally produced errors, every key of the structured payload (`_error` for
/// permission denials).
pub fn into_graphql_error(err: ResolveError) -> Error {
    let code = err.code();
    let payload = err.payload();

    Error::new(err.to_string()).extend_with(|_, extensions| {
        extensions.set("code", code);

        if let Some(serde_json::Value::Object(fields)) = payload {
            for (key, value) in fields {
                extensions.set(key, Value::from_json(value).unwrap_or(Value::Null));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlayer_core::{error::StoreError, operation::OperationKind};

    #[test]
    fn permission_denials_carry_code_and_payload() {
        let err = into_graphql_error(ResolveError::PermissionDenied {
            model: "User".into(),
            action: OperationKind::Remove,
        });
        let extensions = serde_json::to_value(&err.extensions).unwrap();

        assert_eq!(err.message, "Permission denied");
        assert_eq!(extensions["code"], "PERMISSION_DENIED");
        assert_eq!(extensions["_error"], "Permission denied");
    }

    #[test]
    fn store_errors_keep_their_message() {
        let err = into_graphql_error(ResolveError::Store(StoreError::Backend("timeout".into())));
        let extensions = serde_json::to_value(&err.extensions).unwrap();

        assert_eq!(err.message, "Backend error: timeout");
        assert_eq!(extensions["code"], "STORE_ERROR");
        assert!(extensions.get("_error").is_none());
    }
}
