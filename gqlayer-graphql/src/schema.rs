//! Schema assembly.

use async_graphql::{
    Request, Response,
    dynamic::{Object, Schema},
};
use gqlayer_core::{
    context::RequestContext,
    error::{SchemaError, SchemaResult},
    mapping::ObjectTypes,
    model::ModelRegistry,
    operation::{OperationDescriptor, generate_operations},
    store::ModelStore,
};
use std::sync::Arc;

use crate::{
    resolver::operation_field,
    types::{image_input_object, image_object, model_input_object, model_object},
};

/// Name of the root query type.
pub const QUERY_ROOT: &str = "RootQuery";

/// Name of the root mutation type.
pub const MUTATION_ROOT: &str = "RootMutation";

/// Builds a [`GeneratedSchema`] from a model registry and a store.
#[derive(Debug)]
pub struct SchemaBuilder {
    registry: ModelRegistry,
    store: Arc<dyn ModelStore>,
}

impl SchemaBuilder {
    pub fn new<S>(registry: ModelRegistry, store: S) -> Self
    where
        S: ModelStore + 'static,
    {
        Self::with_shared_store(registry, Arc::new(store))
    }

    /// Uses a store that is already shared with other components.
    pub fn with_shared_store(registry: ModelRegistry, store: Arc<dyn ModelStore>) -> Self {
        Self { registry, store }
    }

    /// Validates the registry and assembles the schema.
    ///
    /// Generation runs in two passes: every model's object type name is declared first, then
    /// fields are mapped against those names, so references may form cycles.
    ///
    /// # Errors
    ///
    /// Any [`SchemaError`] found while validating the registry or mapping fields, and
    /// [`SchemaError::Build`] if the GraphQL runtime rejects the result.
    pub fn build(self) -> SchemaResult<GeneratedSchema> {
        self.registry.validate()?;

        let known = ObjectTypes::declare(&self.registry);
        let mut builder = Schema::build(QUERY_ROOT, Some(MUTATION_ROOT), None)
            .register(image_object())
            .register(image_input_object());

        for model in self.registry.models() {
            builder = builder.register(model_object(model, &known)?);
            if let Some(input) = model_input_object(model, &known)? {
                builder = builder.register(input);
            }
        }

        let operations = generate_operations(&self.registry, Arc::clone(&self.store))?;
        let mut query = Object::new(QUERY_ROOT);
        let mut mutation = Object::new(MUTATION_ROOT);

        for operation in &operations {
            let field = operation_field(operation);
            if operation.descriptor.kind.is_query() {
                query = query.field(field);
            } else {
                mutation = mutation.field(field);
            }
        }

        let schema = builder
            .register(query)
            .register(mutation)
            .finish()
            .map_err(|err| SchemaError::Build(err.to_string()))?;

        tracing::info!(
            models = self.registry.len(),
            operations = operations.len(),
            "assembled GraphQL schema"
        );

        Ok(GeneratedSchema {
            schema,
            operations: operations.into_iter().map(|op| op.descriptor).collect(),
        })
    }
}

/// An executable schema together with the catalogue of operations it exposes.
#[derive(Clone)]
pub struct GeneratedSchema {
    schema: Schema,
    operations: Vec<OperationDescriptor>,
}

impl GeneratedSchema {
    /// The underlying `async-graphql` schema, for mounting on a transport.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Every generated operation, queries and mutations alike.
    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Looks up a generated operation by its public name.
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// The schema in SDL form.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// Executes a request with the given request context attached.
    pub async fn execute(&self, request: impl Into<Request>, ctx: RequestContext) -> Response {
        self.schema.execute(request.into().data(ctx)).await
    }
}

impl std::fmt::Debug for GeneratedSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedSchema")
            .field("operations", &self.operations.len())
            .finish()
    }
}
