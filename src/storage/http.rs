//! HTTP REST backend using reqwest

use crate::config::BackendConfig;
use crate::core::{BackendError, RestBackend};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// REST backend reached over HTTP
///
/// `GET {base_url}{path}`; a 404 is "not found", any other non-success
/// status, transport failure, timeout or undecodable body is "unavailable".
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend from configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl RestBackend for HttpBackend {
    async fn fetch(&self, path: &str) -> Result<Value, BackendError> {
        let url = self.url_for(path);
        tracing::debug!(url = %url, "Backend fetch");

        let unavailable = |message: String| BackendError::Unavailable {
            path: path.to_string(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Backend returned an error status");
            return Err(unavailable(format!("backend responded with {}", status)));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                BackendError::InvalidPayload {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            } else {
                unavailable(e.to_string())
            }
        })
    }
}
