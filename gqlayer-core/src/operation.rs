//! Generated operations: descriptors and the resolvers behind them.
//!
//! Every registered model yields five operations:
//!
//! | Kind   | Name             | Root     | Output          |
//! |--------|------------------|----------|-----------------|
//! | get    | `course`         | query    | `CourseType`    |
//! | list   | `listCourses`    | query    | `[CourseType]`  |
//! | create | `createCourse`   | mutation | `CourseType`    |
//! | update | `updateCourse`   | mutation | `CourseType`    |
//! | remove | `removeCourse`   | mutation | `CourseType`    |
//!
//! A [`Resolver`] checks the permission gate against the request context it is given, then
//! sanitizes its arguments and delegates to the store. Denied operations never reach the store.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use crate::{
    args::{ArgumentShape, PAGE_NUMBER_ARG, PAGE_SIZE_ARG, args_for},
    context::RequestContext,
    error::{ResolveError, SchemaResult},
    mapping::{Direction, ObjectTypes, TypeHandle, map_model_fields, output_type_name},
    model::{FieldType, ModelDescription, ModelRegistry, collection_name},
    page::PaginationParams,
    sanitize::{ID_FIELD, NATIVE_ID_FIELD, native_id_value, present_document, sanitize_args},
    store::ModelStore,
};

/// The five operation kinds generated per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Get,
    List,
    Create,
    Update,
    Remove,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Get,
        OperationKind::List,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Remove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Get => "get",
            OperationKind::List => "list",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Remove => "remove",
        }
    }

    /// Whether the operation belongs on the query root (as opposed to the mutation root).
    pub fn is_query(&self) -> bool {
        matches!(self, OperationKind::Get | OperationKind::List)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public name of an operation on a model.
pub fn operation_name(kind: OperationKind, model: &str) -> String {
    match kind {
        OperationKind::Get => model.to_lowercase(),
        OperationKind::List => format!("list{model}s"),
        OperationKind::Create | OperationKind::Update | OperationKind::Remove => {
            format!("{}{model}", kind.as_str())
        }
    }
}

/// Everything about a generated operation except how it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: String,
    pub kind: OperationKind,
    pub model: String,
    pub output: TypeHandle,
    pub args: ArgumentShape,
}

/// What a resolver produced.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
    /// get, create, update and remove: one document or null.
    One(Option<Document>),
    /// list: every matching document.
    Many(Vec<Document>),
}

impl OperationOutput {
    pub fn into_one(self) -> Option<Document> {
        match self {
            OperationOutput::One(document) => document,
            OperationOutput::Many(documents) => documents.into_iter().next(),
        }
    }
}

/// Runs one operation kind for one model against a store.
#[derive(Debug, Clone)]
pub struct Resolver {
    kind: OperationKind,
    model: Arc<ModelDescription>,
    store: Arc<dyn ModelStore>,
}

impl Resolver {
    pub fn new(kind: OperationKind, model: Arc<ModelDescription>, store: Arc<dyn ModelStore>) -> Self {
        Self { kind, model, store }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn model(&self) -> &ModelDescription {
        &self.model
    }

    /// Resolves the operation for one request.
    ///
    /// `args` holds only the arguments the caller supplied, keyed by their API names.
    ///
    /// # Errors
    ///
    /// [`ResolveError::PermissionDenied`] if the gate rejects the operation, in which case
    /// the store is not called. Store failures are returned as [`ResolveError::Store`].
    pub async fn resolve(
        &self,
        args: Document,
        ctx: &RequestContext,
    ) -> Result<OperationOutput, ResolveError> {
        let model = self.model.name();

        if !ctx.can(model, self.kind) {
            tracing::warn!(model, action = %self.kind, "permission denied");
            return Err(ResolveError::PermissionDenied {
                model: model.to_string(),
                action: self.kind,
            });
        }

        let collection = self.model.collection_name();

        match self.kind {
            OperationKind::Get => {
                let filter = sanitize_args(args, self.store.as_ref());
                tracing::debug!(model, collection = %collection, "find_one");

                let found = self.store.find_one(&collection, filter).await?;

                Ok(OperationOutput::One(self.populate_one(found).await?))
            }
            OperationKind::List => {
                let mut args = args;
                let page = PaginationParams::from_args(
                    args.remove(PAGE_NUMBER_ARG).and_then(as_i64),
                    args.remove(PAGE_SIZE_ARG).and_then(as_i64),
                );
                let filter = sanitize_args(args, self.store.as_ref());
                tracing::debug!(model, collection = %collection, ?page, "find");

                let found = self.store.find(&collection, filter, page).await?;
                let mut documents = Vec::with_capacity(found.len());
                for document in found {
                    documents.push(present_document(self.populate(document).await?));
                }

                Ok(OperationOutput::Many(documents))
            }
            OperationKind::Create => {
                let document = self.model.apply_before_create(args);
                let document = sanitize_args(document, self.store.as_ref());
                tracing::debug!(model, collection = %collection, "save");

                let saved = self.store.save(&collection, document).await?;

                Ok(OperationOutput::One(self.populate_one(Some(saved)).await?))
            }
            OperationKind::Update => {
                let mut changes = args;
                let id = changes
                    .remove(ID_FIELD)
                    .and_then(|id| native_id_value(id, self.store.as_ref()))
                    .unwrap_or(Bson::Null);
                let mut filter = Document::new();
                filter.insert(NATIVE_ID_FIELD, id);
                tracing::debug!(model, collection = %collection, %filter, "find_one_and_update");

                let updated = if changes.is_empty() {
                    self.store.find_one(&collection, filter).await?
                } else {
                    self.store
                        .find_one_and_update(&collection, filter, changes)
                        .await?
                };

                Ok(OperationOutput::One(self.populate_one(updated).await?))
            }
            OperationKind::Remove => {
                let filter = sanitize_args(args, self.store.as_ref());
                if filter.is_empty() {
                    tracing::warn!(model, collection = %collection, "remove without a filter matches every document");
                }
                tracing::debug!(model, collection = %collection, "remove");

                let removed = self.store.remove(&collection, filter).await?;

                Ok(OperationOutput::One(
                    self.populate_one(removed.into_iter().next()).await?,
                ))
            }
        }
    }

    async fn populate_one(&self, document: Option<Document>) -> Result<Option<Document>, ResolveError> {
        match document {
            Some(document) => Ok(Some(present_document(self.populate(document).await?))),
            None => Ok(None),
        }
    }

    /// Replaces stored reference ids with the referenced documents, one level deep.
    async fn populate(&self, mut document: Document) -> Result<Document, ResolveError> {
        for (field, ty) in self.model.fields() {
            let Some(value) = document.get(field).cloned() else {
                continue;
            };

            let populated = match (ty, value) {
                (FieldType::Reference(target), value) => self.lookup(target, value).await?,
                (FieldType::ListOf(inner), Bson::Array(ids)) => match inner.as_ref() {
                    FieldType::Reference(target) => {
                        let mut found = Vec::with_capacity(ids.len());
                        for id in ids {
                            let related = self.lookup(target, id).await?;
                            if !matches!(related, Bson::Null) {
                                found.push(related);
                            }
                        }
                        Bson::Array(found)
                    }
                    _ => continue,
                },
                _ => continue,
            };

            document.insert(field.clone(), populated);
        }

        Ok(document)
    }

    async fn lookup(&self, target: &str, id: Bson) -> Result<Bson, ResolveError> {
        let id = match id {
            Bson::Null => return Ok(Bson::Null),
            Bson::Document(embedded) => return Ok(Bson::Document(embedded)),
            Bson::String(s) => self.store.native_id(&s),
            other => other,
        };

        let collection = collection_name(target);
        let mut filter = Document::new();
        filter.insert(NATIVE_ID_FIELD, id);
        tracing::trace!(model = target, collection = %collection, %filter, "populate");

        Ok(self
            .store
            .find_one(&collection, filter)
            .await?
            .map(Bson::Document)
            .unwrap_or(Bson::Null))
    }
}

fn as_i64(value: Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(n)),
        Bson::Int64(n) => Some(n),
        Bson::Double(n) if n.is_finite() => Some(n as i64),
        _ => None,
    }
}

/// A descriptor paired with the resolver that runs it.
#[derive(Debug, Clone)]
pub struct GeneratedOperation {
    pub descriptor: OperationDescriptor,
    pub resolver: Resolver,
}

/// Describes every operation of a registry without binding a store.
///
/// Operations are grouped per model in registration order, and per model in
/// [`OperationKind::ALL`] order.
///
/// # Errors
///
/// Returns [`SchemaError::DanglingReference`](crate::error::SchemaError::DanglingReference)
/// if a field references a model that is not part of the registry.
pub fn catalogue(registry: &ModelRegistry) -> SchemaResult<Vec<OperationDescriptor>> {
    let known = ObjectTypes::declare(registry);
    let mut descriptors = Vec::with_capacity(registry.len() * OperationKind::ALL.len());

    for model in registry.models() {
        // Mapped for validation only; the assembler maps fields again when building types.
        map_model_fields(model, Direction::Output, &known)?;

        let object = TypeHandle::named(output_type_name(model.name()));

        for kind in OperationKind::ALL {
            let output = match kind {
                OperationKind::List => TypeHandle::list(object.clone()),
                _ => object.clone(),
            };

            descriptors.push(OperationDescriptor {
                name: operation_name(kind, model.name()),
                kind,
                model: model.name().to_string(),
                output,
                args: args_for(kind, model),
            });
        }
    }

    Ok(descriptors)
}

/// Generates every operation of a registry, bound to a store.
pub fn generate_operations(
    registry: &ModelRegistry,
    store: Arc<dyn ModelStore>,
) -> SchemaResult<Vec<GeneratedOperation>> {
    let descriptors = catalogue(registry)?;
    let mut models = std::collections::HashMap::new();

    let operations = descriptors
        .into_iter()
        .filter_map(|descriptor| {
            let model = match models.get(&descriptor.model) {
                Some(model) => Arc::clone(model),
                None => {
                    let model = Arc::new(registry.get(&descriptor.model)?.clone());
                    models.insert(descriptor.model.clone(), Arc::clone(&model));
                    model
                }
            };

            tracing::debug!(operation = %descriptor.name, kind = %descriptor.kind, "generated operation");

            Some(GeneratedOperation {
                resolver: Resolver::new(descriptor.kind, model, Arc::clone(&store)),
                descriptor,
            })
        })
        .collect();

    Ok(operations)
}
