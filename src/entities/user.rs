//! `User` type
//!
//! Backend record shape: `{ "id": "23", "firstName": "Bill", "age": 20, "companyId": "1" }`

use super::company;
use crate::core::{
    FieldMap, FieldSpec, Record, ResolveError, RestBackend, ScalarKind, fetch_record, resource_path,
};
use std::sync::Arc;

pub const TYPE_NAME: &str = "User";

/// Backend collection holding users
pub const COLLECTION: &str = "users";

/// Fetch `/users/{id}`; `None` when the backend has no such user
pub async fn fetch_user(backend: &dyn RestBackend, id: &str) -> Result<Option<Record>, ResolveError> {
    match resource_path(COLLECTION, id, &[]) {
        Some(path) => fetch_record(backend, &path).await,
        None => Ok(None),
    }
}

pub fn fields(backend: Arc<dyn RestBackend>) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("id".to_string(), FieldSpec::scalar(ScalarKind::String));
    fields.insert("firstName".to_string(), FieldSpec::scalar(ScalarKind::String));
    fields.insert("age".to_string(), FieldSpec::scalar(ScalarKind::Int));

    // The user's own companyId; users without one have no company.
    fields.insert(
        "company".to_string(),
        FieldSpec::object(company::TYPE_NAME, move |ctx| {
            let backend = backend.clone();
            async move {
                match ctx.parent_id("companyId") {
                    Some(company_id) => company::fetch_company(backend.as_ref(), &company_id).await,
                    None => Ok(None),
                }
            }
        }),
    );

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResolverContext;
    use crate::storage::InMemoryBackend;
    use serde_json::json;

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new()
            .with_document("/users/23", json!({"id": "23", "firstName": "Bill", "companyId": "1"}))
            .with_document("/companies/1", json!({"id": "1", "name": "Apple"}))
    }

    async fn resolve_company(backend: &InMemoryBackend, parent: serde_json::Value) -> Option<Record> {
        let fields = fields(Arc::new(backend.clone()));
        let Some(FieldSpec::Object(field)) = fields.get("company") else {
            panic!("company should be an object field");
        };
        let ctx = ResolverContext {
            parent: Some(Arc::new(parent.as_object().unwrap().clone())),
            ..Default::default()
        };
        (field.resolver)(ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_fetch_user() {
        let backend = backend();
        let user = fetch_user(&backend, "23").await.unwrap().unwrap();
        assert_eq!(user["firstName"], "Bill");
        assert!(fetch_user(&backend, "999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_id_cannot_reach_other_collections() {
        let backend = backend();

        assert!(fetch_user(&backend, "../companies/1").await.unwrap().is_none());
        assert_eq!(backend.calls("/users/..%2Fcompanies%2F1"), 1);

        assert!(fetch_user(&backend, "..").await.unwrap().is_none());
        assert_eq!(backend.calls("/companies/1"), 0);
        assert_eq!(backend.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_company_uses_company_id_of_parent() {
        let backend = backend();
        let company = resolve_company(&backend, json!({"id": "23", "companyId": "1"})).await;
        assert_eq!(company.unwrap()["name"], "Apple");
        assert_eq!(backend.calls("/companies/1"), 1);
    }

    #[tokio::test]
    async fn test_company_without_company_id_is_null_and_not_fetched() {
        let backend = backend();
        let company = resolve_company(&backend, json!({"id": "23"})).await;
        assert!(company.is_none());
        assert_eq!(backend.total_calls(), 0);
    }
}
