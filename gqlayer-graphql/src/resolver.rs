//! Root fields wired to generated resolvers.

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue};
use gqlayer_core::{
    context::RequestContext,
    operation::{GeneratedOperation, OperationOutput},
};

use crate::{error::into_graphql_error, types::type_ref, value::args_to_document};

/// Builds the root field of a generated operation.
///
/// The request's [`RequestContext`] is read from the request data. Requests executed without
/// one run with the default context.
pub fn operation_field(operation: &GeneratedOperation) -> Field {
    let descriptor = &operation.descriptor;
    let resolver = operation.resolver.clone();

    let field = Field::new(descriptor.name.clone(), type_ref(&descriptor.output), move |ctx| {
        let resolver = resolver.clone();

        FieldFuture::new(async move {
            let args = args_to_document(ctx.args.as_index_map().iter());
            tracing::trace!(model = resolver.model().name(), kind = %resolver.kind(), %args, "received request");

            let fallback = RequestContext::default();
            let request = ctx.data_opt::<RequestContext>().unwrap_or(&fallback);

            let output = resolver
                .resolve(args, request)
                .await
                .map_err(into_graphql_error)?;

            Ok(match output {
                OperationOutput::One(document) => document.map(FieldValue::owned_any),
                OperationOutput::Many(documents) => Some(FieldValue::list(
                    documents.into_iter().map(FieldValue::owned_any),
                )),
            })
        })
    })
    .description(format!(
        "Generated {} operation on model `{}`",
        descriptor.kind, descriptor.model
    ));

    descriptor.args.iter().fold(field, |field, (name, handle)| {
        field.argument(InputValue::new(name.clone(), type_ref(handle)))
    })
}
