//! GraphQL API exposure for the gateway
//!
//! This module provides GraphQL-specific routing and schema generation.
//! It is completely separate from the core resolution logic.

mod executor;
mod schema_generator;

pub use executor::{GraphQLExecutor, TYPENAME_FIELD};
pub use schema_generator::SchemaGenerator;

use crate::core::{GatewayError, GraphQLResponse, QueryError};
use crate::server::host::ServerHost;
use anyhow::Result;
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use axum::{
    Router,
    extract::{Extension, Json as AxumJson, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Body of `POST /graphql`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequestBody {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    #[serde(default)]
    pub operation_name: Option<String>,
}

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// # Returns
    ///
    /// An Axum router with:
    /// - `POST /graphql`: query endpoint
    /// - `GET /graphql`: playground, when enabled in the config
    /// - `GET /graphql/schema`: SDL of the registry
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let host = Arc::new(builder.build_host()?);
    /// let graphql_app = GraphQLExposure::build_router(host)?;
    /// ```
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let executor = Arc::new(GraphQLExecutor::new(host.registry.clone())?);

        let endpoint = if host.config.server.playground {
            post(graphql_handler).get(graphql_playground)
        } else {
            post(graphql_handler)
        };

        let router = Router::new()
            .route("/graphql", endpoint)
            .route("/graphql/schema", get(graphql_schema))
            .layer(Extension(executor))
            .layer(Extension(host));

        Ok(router)
    }
}

/// Handler for GraphQL queries
///
/// Field failures still answer `200` with `data` and `errors`; a rejected
/// document answers with its error status and no `data`. So does a body
/// that is not a JSON GraphQL request.
async fn graphql_handler(
    Extension(executor): Extension<Arc<GraphQLExecutor>>,
    body: Result<AxumJson<GraphQLRequestBody>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(AxumJson(request)) => request,
        Err(rejection) => {
            let message = rejection.body_text();
            tracing::debug!(status = %rejection.status(), "unreadable graphql request: {}", message);
            return rejected(QueryError::InvalidRequest { message }.into());
        }
    };

    match executor
        .execute(
            &request.query,
            request.variables,
            request.operation_name.as_deref(),
        )
        .await
    {
        Ok(response) => AxumJson(response).into_response(),
        Err(e) => rejected(e),
    }
}

fn rejected(error: GatewayError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!("graphql request failed: {}", error);
    }
    (status, AxumJson(GraphQLResponse::rejected(&error))).into_response()
}

/// Handler for GraphQL playground UI
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(Extension(host): Extension<Arc<ServerHost>>) -> Response {
    match SchemaGenerator::new(&host.registry).generate_sdl() {
        Ok(sdl) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            sdl,
        )
            .into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}
