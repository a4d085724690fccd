//! # restgraph
//!
//! A GraphQL gateway over a REST backend.
//!
//! ## Features
//!
//! - **Name-Referenced Types**: entity types refer to each other by name, so
//!   `User -> Company -> [User]` cycles need no ownership cycles
//! - **Deferred Field Binding**: field maps are produced by thunks on first
//!   access and memoized
//! - **Typed Resolvers**: scalar, object and list fields each carry an async
//!   resolver with its own result type
//! - **Partial Results**: a failing field becomes `null` plus an entry in
//!   `errors`; its siblings still resolve
//! - **Swappable Backends**: HTTP via `reqwest`, or a json-server style
//!   `db.json` held in memory
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restgraph::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = GatewayConfig::from_yaml_file("config.yaml")?;
//!     ServerBuilder::new().with_config(config).serve().await
//! }
//! ```
//!
//! ```graphql
//! {
//!   user(id: "23") {
//!     firstName
//!     company { name users { firstName } }
//!   }
//! }
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ArgSpec, Arguments, BackendError, ConfigError, EntityType, FieldMap, FieldSelection,
        FieldSpec, GatewayError, GraphQLResponse, PathSegment, Query, QueryError, Record,
        ResolveError, ResolverContext, ResponseError, RestBackend, ScalarKind, SchemaError,
        TypeRegistry, fetch_record, fetch_records, resource_path,
    };

    // === Entities ===
    pub use crate::entities::{ROOT_TYPE, build_registry};

    // === Storage ===
    pub use crate::storage::{HttpBackend, InMemoryBackend};

    // === Config ===
    pub use crate::config::{BackendConfig, GatewayConfig, ServerConfig};

    // === Server ===
    pub use crate::server::exposure::graphql::{GraphQLExecutor, SchemaGenerator};
    pub use crate::server::{GraphQLExposure, RestExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};

    // === Axum ===
    pub use axum::{
        Router,
        routing::{get, post},
    };
}
