//! Argument shapes of the generated operations.
//!
//! All arguments are optional; resolvers decide how to use whichever subset a caller supplied.
//!
//! - get, update, remove: `id` plus every declared field
//! - list: the get shape plus `pageNumber` and `pageSize`
//! - create: every declared field, no `id` (the store assigns identity)

use indexmap::IndexMap;

use crate::{
    mapping::{ID, INT, TypeHandle, map_input},
    model::ModelDescription,
    operation::OperationKind,
    sanitize::ID_FIELD,
};

pub const PAGE_NUMBER_ARG: &str = "pageNumber";
pub const PAGE_SIZE_ARG: &str = "pageSize";

/// Ordered argument name to type mapping.
pub type ArgumentShape = IndexMap<String, TypeHandle>;

/// Synthesizes the argument shape of an operation kind for a model.
pub fn args_for(kind: OperationKind, model: &ModelDescription) -> ArgumentShape {
    match kind {
        OperationKind::Get | OperationKind::Update | OperationKind::Remove => lookup_args(model),
        OperationKind::List => {
            let mut args = lookup_args(model);
            args.insert(PAGE_NUMBER_ARG.to_string(), TypeHandle::named(INT));
            args.insert(PAGE_SIZE_ARG.to_string(), TypeHandle::named(INT));
            args
        }
        OperationKind::Create => field_args(model),
    }
}

fn lookup_args(model: &ModelDescription) -> ArgumentShape {
    let mut args = ArgumentShape::with_capacity(model.fields().len() + 1);
    args.insert(ID_FIELD.to_string(), TypeHandle::named(ID));
    args.extend(field_args(model));
    args
}

fn field_args(model: &ModelDescription) -> ArgumentShape {
    model
        .fields()
        .iter()
        .map(|(name, field)| (name.clone(), map_input(field)))
        .collect()
}
