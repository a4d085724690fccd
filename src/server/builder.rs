//! ServerBuilder for fluent API to build the gateway server

use super::exposure::{GraphQLExposure, RestExposure};
use super::host::ServerHost;
use crate::config::GatewayConfig;
use crate::core::{RestBackend, TypeRegistry};
use crate::storage::{HttpBackend, InMemoryBackend};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for creating the gateway server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(GatewayConfig::from_yaml_file("config.yaml")?)
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: GatewayConfig,
    backend: Option<Arc<dyn RestBackend>>,
    registry: Option<TypeRegistry>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            backend: None,
            registry: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the gateway configuration
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `backend` instead of the one described by the configuration
    pub fn with_backend(self, backend: impl RestBackend + 'static) -> Self {
        self.with_backend_arc(Arc::new(backend))
    }

    /// Use a shared backend instead of the one described by the configuration
    pub fn with_backend_arc(mut self, backend: Arc<dyn RestBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Serve `registry` instead of the built-in User/Company schema
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Add custom routes to the server
    ///
    /// # Example
    ///
    /// ```ignore
    /// let admin = Router::new().route("/admin/version", get(version));
    ///
    /// ServerBuilder::new()
    ///     .with_custom_routes(admin)
    ///     .build()?;
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Without an explicit backend, `backend.fixtures` selects an in-memory
    /// backend loaded from that `db.json`; otherwise the HTTP backend at
    /// `backend.base_url` is used.
    pub fn build_host(mut self) -> Result<ServerHost> {
        let backend = match self.backend.take() {
            Some(backend) => backend,
            None => Self::backend_from_config(&self.config)?,
        };

        ServerHost::from_builder_components(self.config, backend, self.registry)
    }

    fn backend_from_config(config: &GatewayConfig) -> Result<Arc<dyn RestBackend>> {
        if let Some(fixtures) = &config.backend.fixtures {
            tracing::info!("Serving fixtures from {}", fixtures.display());
            return Ok(Arc::new(InMemoryBackend::from_db_json_file(fixtures)?));
        }

        let backend = HttpBackend::new(&config.backend)?;
        tracing::info!("Using REST backend at {}", backend.base_url());
        Ok(Arc::new(backend))
    }

    /// Build the final router
    ///
    /// Merges the REST (health and custom routes) and GraphQL exposures and
    /// adds request tracing and permissive CORS.
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Self::router_for(host, custom_routes)
    }

    fn router_for(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let rest_router = RestExposure::build_router(host.clone(), custom_routes)?;
        let graphql_router = GraphQLExposure::build_router(host)?;

        Ok(rest_router
            .merge(graphql_router)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to `server.host:server.port` from the configuration
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_config(config)
    ///     .serve()
    ///     .await?;
    /// ```
    pub async fn serve(mut self) -> Result<()> {
        let addr = self.config.listen_addr()?;
        let playground = self.config.server.playground;

        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let app = Self::router_for(host, custom_routes)?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);
        if playground {
            tracing::info!("GraphQL playground available at http://{}/graphql", addr);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
