//! REST exposure for the gateway
//!
//! Operational endpoints that are not part of the graph: health checks
//! plus any custom routes registered on the builder.

use super::super::host::ServerHost;
use anyhow::Result;
use axum::{Extension, Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

/// Name reported by the health endpoints
pub const SERVICE_NAME: &str = "restgraph";

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Arguments
    ///
    /// * `host` - The server host containing all gateway state
    /// * `custom_routes` - Additional custom routes to merge
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes().layer(Extension(host));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check(Extension(host): Extension<Arc<ServerHost>>) -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "types": host.type_names(),
        }))
    }
}
