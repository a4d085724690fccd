//! Query execution for GraphQL

use std::time::Instant;

use super::field_resolver;
use crate::core::{EntityType, GraphQLResponse, Query, TypeRegistry};

/// Execute a validated query against the root type
///
/// Always produces `data`; field failures are reported next to it.
pub async fn execute_root(registry: &TypeRegistry, root: &EntityType, query: &Query) -> GraphQLResponse {
    let started = Instant::now();
    let root_fields: Vec<&str> = query.selections.iter().map(|s| s.name.as_str()).collect();
    tracing::debug!(root = root.name(), fields = ?root_fields, "executing query");

    let resolved =
        field_resolver::resolve_selections(registry, root, None, &query.selections, Vec::new())
            .await;

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        errors = resolved.errors.len(),
        "query executed"
    );
    GraphQLResponse::partial(resolved.value, resolved.errors)
}
