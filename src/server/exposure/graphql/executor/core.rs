//! Core GraphQL executor orchestration

use serde_json::{Map, Value};
use std::sync::Arc;

use super::document;
use super::query_executor;
use crate::core::{GatewayError, GraphQLResponse, Query, SchemaError, TypeRegistry};

/// GraphQL executor that runs queries against the type registry
#[derive(Debug, Clone)]
pub struct GraphQLExecutor {
    registry: Arc<TypeRegistry>,
}

impl GraphQLExecutor {
    /// Create an executor over `registry`
    ///
    /// Fails if the registry has no root type.
    pub fn new(registry: Arc<TypeRegistry>) -> Result<Self, SchemaError> {
        registry.root()?;
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Execute a GraphQL document
    ///
    /// # Returns
    /// `Err` when the document is rejected as a whole (nothing executed).
    /// Otherwise a response with `data` and any field-level errors.
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Result<GraphQLResponse, GatewayError> {
        let root = self.registry.root()?;
        let variables = variables.unwrap_or_default();

        let query = document::prepare_query(&self.registry, root, query, operation_name, &variables)
            .inspect_err(|e| tracing::debug!(code = e.error_code(), "query rejected: {}", e))?;

        Ok(query_executor::execute_root(&self.registry, root, &query).await)
    }

    /// Execute an already built query, skipping document validation
    pub async fn execute_query(&self, query: &Query) -> Result<GraphQLResponse, GatewayError> {
        let root = self.registry.root()?;
        Ok(query_executor::execute_root(&self.registry, root, query).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldSelection, QueryError};
    use crate::entities::build_registry;
    use crate::storage::InMemoryBackend;
    use serde_json::json;

    fn fixtures() -> InMemoryBackend {
        InMemoryBackend::new()
            .with_document(
                "/users/23",
                json!({"id": "23", "firstName": "Bill", "age": 20, "companyId": "1"}),
            )
            .with_document(
                "/users/47",
                json!({"id": "47", "firstName": "Samantha", "age": 21, "companyId": "2"}),
            )
            .with_document(
                "/companies/1",
                json!({"id": "1", "name": "Apple", "description": "iphone"}),
            )
            .with_document(
                "/companies/2",
                json!({"id": "2", "name": "Google", "description": "search"}),
            )
            .with_document(
                "/companies/2/users",
                json!([
                    {"id": "47", "firstName": "Samantha", "age": 21, "companyId": "2"},
                    {"id": "40", "firstName": "Alex", "age": 40, "companyId": "2"}
                ]),
            )
    }

    fn executor(backend: &InMemoryBackend) -> GraphQLExecutor {
        let registry = build_registry(Arc::new(backend.clone())).expect("registry should build");
        GraphQLExecutor::new(Arc::new(registry)).expect("registry has a root")
    }

    #[tokio::test]
    async fn test_scalar_query() {
        let backend = fixtures();
        let response = executor(&backend)
            .execute(r#"{ user(id: "23") { firstName } }"#, None, None)
            .await
            .expect("query should execute");

        assert!(response.is_ok());
        assert_eq!(response.data, Some(json!({"user": {"firstName": "Bill"}})));
        assert_eq!(backend.calls("/users/23"), 1);
        assert_eq!(backend.calls("/companies/1"), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_null_without_errors() {
        let backend = fixtures();
        let response = executor(&backend)
            .execute(r#"{ user(id: "999") { firstName company { name } } }"#, None, None)
            .await
            .expect("query should execute");

        assert_eq!(response.data, Some(json!({"user": null})));
        assert!(response.errors.is_empty());
        assert_eq!(backend.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_nested_traversal_both_directions() {
        let backend = fixtures();
        let query = r#"
            query Traverse($id: String!) {
                user(id: $id) {
                    firstName
                    company {
                        name
                        users { firstName age }
                    }
                }
            }
        "#;
        let mut variables = Map::new();
        variables.insert("id".to_string(), json!(47));

        let response = executor(&backend)
            .execute(query, Some(variables), Some("Traverse"))
            .await
            .expect("query should execute");

        assert!(response.is_ok(), "{:?}", response.errors);
        assert_eq!(
            response.data,
            Some(json!({
                "user": {
                    "firstName": "Samantha",
                    "company": {
                        "name": "Google",
                        "users": [
                            {"firstName": "Samantha", "age": 21},
                            {"firstName": "Alex", "age": 40}
                        ]
                    }
                }
            }))
        );
        assert_eq!(backend.calls("/companies/2/users"), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_is_partial() {
        let backend = fixtures();
        backend.fail_path("/companies/2/users", "connection reset");

        let response = executor(&backend)
            .execute(r#"{ company(id: "2") { name users { firstName } } }"#, None, None)
            .await
            .expect("query should execute");

        assert_eq!(
            response.data,
            Some(json!({"company": {"name": "Google", "users": null}}))
        );
        assert_eq!(response.errors.len(), 1);
        assert_eq!(
            response.errors[0].path,
            Some(vec!["company".into(), "users".into()])
        );
        assert_eq!(response.errors[0].extensions.code, "BACKEND_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_parse_error_is_rejected() {
        let backend = fixtures();
        let err = executor(&backend)
            .execute("not valid graphql {{{{", None, None)
            .await
            .expect_err("parse error should be rejected");

        assert!(matches!(err, GatewayError::Query(QueryError::Parse { .. })));
        assert!(err.to_string().contains("Failed to parse query"));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected_before_any_fetch() {
        let backend = fixtures();
        let err = executor(&backend)
            .execute(r#"{ user(id: "23") { firstName email } }"#, None, None)
            .await
            .expect_err("unknown field should be rejected");

        assert_eq!(err.error_code(), "GRAPHQL_VALIDATION_FAILED");
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_execute_prebuilt_query() {
        let backend = fixtures();
        let query = Query::new().with_selection(
            FieldSelection::new("company")
                .with_alias("apple")
                .with_argument("id", json!(1))
                .with_selection(FieldSelection::new("name")),
        );

        let response = executor(&backend)
            .execute_query(&query)
            .await
            .expect("query should execute");
        assert_eq!(response.data, Some(json!({"apple": {"name": "Apple"}})));
    }

    #[tokio::test]
    async fn test_prebuilt_query_with_bad_argument_continues() {
        let backend = fixtures();
        let query = Query::new()
            .with_selection(
                FieldSelection::new("user")
                    .with_argument("id", json!(true))
                    .with_selection(FieldSelection::new("firstName")),
            )
            .with_selection(
                FieldSelection::new("company")
                    .with_argument("id", json!("1"))
                    .with_selection(FieldSelection::new("name")),
            );

        let response = executor(&backend)
            .execute_query(&query)
            .await
            .expect("query should execute");
        assert_eq!(
            response.data,
            Some(json!({"user": null, "company": {"name": "Apple"}}))
        );
        assert_eq!(response.errors.len(), 1);
        assert_eq!(
            response.errors[0].extensions.code,
            "ARGUMENT_COERCION_FAILURE"
        );
    }

    #[test]
    fn test_new_requires_root() {
        let err = GraphQLExecutor::new(Arc::new(TypeRegistry::new())).unwrap_err();
        assert_eq!(err, SchemaError::MissingRoot);
    }
}
