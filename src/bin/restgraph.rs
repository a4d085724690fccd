//! `restgraph`: serve the GraphQL gateway
//!
//! ```text
//! restgraph --config config.yaml
//! restgraph --fixtures demos/db.json --port 4000
//! RESTGRAPH_BACKEND_URL=http://api.internal:3000 restgraph
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use restgraph::config::GatewayConfig;
use restgraph::server::ServerBuilder;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "GraphQL gateway over a REST backend")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "RESTGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides server.port)
    #[arg(long, env = "RESTGRAPH_PORT")]
    port: Option<u16>,

    /// Base URL of the REST backend (overrides backend.base_url)
    #[arg(long, env = "RESTGRAPH_BACKEND_URL")]
    backend_url: Option<String>,

    /// Serve a json-server `db.json` from memory instead of calling the backend
    #[arg(long, env = "RESTGRAPH_FIXTURES")]
    fixtures: Option<PathBuf>,
}

impl Args {
    /// Load the configuration file, if any, and apply overrides
    fn into_config(self) -> Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let path = path.to_string_lossy();
                GatewayConfig::from_yaml_file(&path)
                    .with_context(|| format!("loading configuration from {}", path))?
            }
            None => GatewayConfig::default(),
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.backend_url {
            config.backend.base_url = url;
        }
        if let Some(fixtures) = self.fixtures {
            config.backend.fixtures = Some(fixtures);
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().into_config()?;

    let default_level = config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    ServerBuilder::new().with_config(config).serve().await
}
