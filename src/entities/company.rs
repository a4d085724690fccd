//! `Company` type
//!
//! Backend record shape: `{ "id": "1", "name": "Apple", "description": "iphone" }`

use super::user;
use crate::core::{
    FieldMap, FieldSpec, Record, ResolveError, RestBackend, ScalarKind, fetch_record, fetch_records,
    resource_path,
};
use std::sync::Arc;

pub const TYPE_NAME: &str = "Company";

/// Backend collection holding companies
pub const COLLECTION: &str = "companies";

/// Fetch `/companies/{id}`; `None` when the backend has no such company
pub async fn fetch_company(
    backend: &dyn RestBackend,
    id: &str,
) -> Result<Option<Record>, ResolveError> {
    match resource_path(COLLECTION, id, &[]) {
        Some(path) => fetch_record(backend, &path).await,
        None => Ok(None),
    }
}

/// Fetch `/companies/{id}/users`, in backend order
pub async fn fetch_company_users(
    backend: &dyn RestBackend,
    id: &str,
) -> Result<Vec<Record>, ResolveError> {
    match resource_path(COLLECTION, id, &[user::COLLECTION]) {
        Some(path) => fetch_records(backend, &path).await,
        None => Ok(Vec::new()),
    }
}

pub fn fields(backend: Arc<dyn RestBackend>) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("id".to_string(), FieldSpec::scalar(ScalarKind::String));
    fields.insert("name".to_string(), FieldSpec::scalar(ScalarKind::String));
    fields.insert("description".to_string(), FieldSpec::scalar(ScalarKind::String));

    fields.insert(
        "users".to_string(),
        FieldSpec::list(user::TYPE_NAME, move |ctx| {
            let backend = backend.clone();
            async move {
                let id = ctx.parent_id("id").ok_or_else(|| ResolveError::InvalidValue {
                    field: "users".to_string(),
                    message: "company record has no id".to_string(),
                })?;
                fetch_company_users(backend.as_ref(), &id).await
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

    fn users_resolver(backend: &InMemoryBackend) -> crate::core::field::ListResolver {
        let fields = fields(Arc::new(backend.clone()));
        match fields.get("users") {
            Some(FieldSpec::List(field)) => field.resolver.clone(),
            other => panic!("users should be a list field, got {:?}", other),
        }
    }

    fn parent(value: serde_json::Value) -> ResolverContext {
        ResolverContext {
            parent: Some(Arc::new(value.as_object().unwrap().clone())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_users_are_returned_in_backend_order() {
        let backend = InMemoryBackend::new().with_document(
            "/companies/1/users",
            json!([{"id": "47"}, {"id": "23"}, {"id": "40"}]),
        );

        let users = users_resolver(&backend)(parent(json!({"id": "1"}))).await.unwrap();
        let ids: Vec<&str> = users.iter().map(|u| u["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["47", "23", "40"]);
        assert_eq!(backend.calls("/companies/1/users"), 1);
    }

    #[tokio::test]
    async fn test_numeric_company_id() {
        let backend = InMemoryBackend::new().with_document("/companies/2/users", json!([]));
        let users = users_resolver(&backend)(parent(json!({"id": 2}))).await.unwrap();
        assert!(users.is_empty());
        assert_eq!(backend.calls("/companies/2/users"), 1);
    }

    #[tokio::test]
    async fn test_company_without_id_is_an_error() {
        let backend = InMemoryBackend::new();
        let err = users_resolver(&backend)(parent(json!({"name": "Anon"})))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_VALUE");
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_company_id_is_a_single_segment() {
        let backend = InMemoryBackend::new()
            .with_document("/companies/1", json!({"id": "1", "name": "Apple"}))
            .with_document("/companies/1/users", json!([{"id": "23"}]));

        assert!(fetch_company(&backend, "1/users").await.unwrap().is_none());
        assert_eq!(backend.calls("/companies/1%2Fusers"), 1);
        assert_eq!(backend.calls("/companies/1/users"), 0);

        let users = users_resolver(&backend)(parent(json!({"id": "../companies/1"})))
            .await
            .unwrap();
        assert!(users.is_empty());
        assert_eq!(backend.calls("/companies/..%2Fcompanies%2F1/users"), 1);
        assert_eq!(backend.calls("/companies/1"), 0);
    }

    #[tokio::test]
    async fn test_fetch_company_not_found() {
        let backend = InMemoryBackend::new();
        assert!(fetch_company(&backend, "1").await.unwrap().is_none());
    }
}
