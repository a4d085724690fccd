//! Entity schema: the `User` and `Company` types and the root query type
//!
//! ```graphql
//! type RootQueryType {
//!   user(id: String!): User
//!   company(id: String!): Company
//! }
//! ```
//!
//! Every resolver is a single backend point lookup; nothing is joined,
//! cached, retried or batched.

pub mod company;
pub mod user;

use crate::core::{
    ArgSpec, FieldMap, FieldSpec, RestBackend, ScalarKind, SchemaError, TypeRegistry,
};
use std::sync::Arc;

/// Name of the root query type
pub const ROOT_TYPE: &str = "RootQueryType";

/// Build the gateway's type registry over `backend`
///
/// The returned registry is validated: every reference resolves.
pub fn build_registry(backend: Arc<dyn RestBackend>) -> Result<TypeRegistry, SchemaError> {
    let mut registry = TypeRegistry::new();

    let root_backend = backend.clone();
    registry.register(ROOT_TYPE, move || root_fields(root_backend.clone()))?;

    let user_backend = backend.clone();
    registry.register(user::TYPE_NAME, move || user::fields(user_backend.clone()))?;

    let company_backend = backend;
    registry.register(company::TYPE_NAME, move || {
        company::fields(company_backend.clone())
    })?;

    registry.set_root(ROOT_TYPE)?;
    registry.validate()?;
    Ok(registry)
}

/// Entry points of the graph
fn root_fields(backend: Arc<dyn RestBackend>) -> FieldMap {
    let mut fields = FieldMap::new();

    let users = backend.clone();
    fields.insert(
        "user".to_string(),
        FieldSpec::object(user::TYPE_NAME, move |ctx| {
            let backend = users.clone();
            async move {
                let id = ctx.arg_str("id").unwrap_or_default().to_string();
                user::fetch_user(backend.as_ref(), &id).await
            }
        })
        .with_arg(ArgSpec::required("id", ScalarKind::String)),
    );

    let companies = backend;
    fields.insert(
        "company".to_string(),
        FieldSpec::object(company::TYPE_NAME, move |ctx| {
            let backend = companies.clone();
            async move {
                let id = ctx.arg_str("id").unwrap_or_default().to_string();
                company::fetch_company(backend.as_ref(), &id).await
            }
        })
        .with_arg(ArgSpec::required("id", ScalarKind::String)),
    );

    fields
}
