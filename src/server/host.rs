//! Server host for transport-agnostic API exposure
//!
//! The host bundles everything an exposure needs to serve requests: the
//! configuration, the REST backend and the validated type registry. Routers
//! are built from it and never from the builder directly.

use crate::config::GatewayConfig;
use crate::core::{RestBackend, TypeRegistry};
use crate::entities;
use anyhow::Result;
use std::sync::Arc;

/// Host context containing all gateway state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::from_builder_components(config, backend, None)?);
/// let rest_app = RestExposure::build_router(host.clone(), vec![])?;
/// let graphql_app = GraphQLExposure::build_router(host)?;
/// ```
pub struct ServerHost {
    /// Gateway configuration
    pub config: Arc<GatewayConfig>,

    /// Data source for every resolver
    pub backend: Arc<dyn RestBackend>,

    /// Validated type registry, read-only from here on
    pub registry: Arc<TypeRegistry>,
}

impl ServerHost {
    /// Build the host from builder components
    ///
    /// Without an explicit `registry` the gateway's own entity schema is
    /// built over `backend`. Either way the registry is validated here, so
    /// a dangling type reference fails startup.
    pub fn from_builder_components(
        config: GatewayConfig,
        backend: Arc<dyn RestBackend>,
        registry: Option<TypeRegistry>,
    ) -> Result<Self> {
        let registry = match registry {
            Some(registry) => registry,
            None => entities::build_registry(backend.clone())?,
        };
        registry.validate()?;
        registry.root()?;

        Ok(Self {
            config: Arc::new(config),
            backend,
            registry: Arc::new(registry),
        })
    }

    /// Names of the registered types
    pub fn type_names(&self) -> Vec<&str> {
        self.registry.type_names().collect()
    }
}
