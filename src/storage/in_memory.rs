//! In-memory REST backend for testing and development
//!
//! Holds JSON documents keyed by path. It can be seeded from a json-server
//! style `db.json`:
//!
//! ```json
//! {
//!   "users": [{ "id": "23", "firstName": "Bill", "age": 20, "companyId": "1" }],
//!   "companies": [{ "id": "1", "name": "Apple", "description": "iphone" }]
//! }
//! ```
//!
//! which serves `/users/23`, `/companies/1` and the nested list
//! `/companies/1/users` (every user whose `companyId` is `"1"`, in file
//! order). Every fetch is counted per path and paths can be made to fail,
//! so tests can assert exactly which backend calls a query made.

use crate::core::{BackendError, RestBackend, resource_path};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// In-memory backend implementation
///
/// Cloning shares the underlying store, call counters and failures.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    documents: Arc<RwLock<HashMap<String, Value>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<HashMap<String, usize>>>,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a json-server `db.json` document
    pub fn from_db_json(db: &Value) -> Result<Self> {
        let collections = db
            .as_object()
            .ok_or_else(|| anyhow!("db.json must be an object of collections"))?;

        let backend = Self::new();
        for (collection, records) in collections {
            let records = records
                .as_array()
                .ok_or_else(|| anyhow!("collection '{}' must be an array", collection))?;

            backend.insert(format!("/{}", collection), Value::Array(records.clone()));

            for record in records {
                if let Some(id) = record.get("id").and_then(id_string)
                    && let Some(path) = resource_path(collection, &id, &[])
                {
                    backend.insert(path, record.clone());
                }
            }
        }

        backend.derive_nested_lists(collections);
        Ok(backend)
    }

    /// Load and seed from a `db.json` file
    pub fn from_db_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures from {}", path.display()))?;
        let db: Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        Self::from_db_json(&db)
    }

    /// Build `/{parents}/{id}/{children}` lists from `{parent}Id` foreign keys
    fn derive_nested_lists(&self, collections: &serde_json::Map<String, Value>) {
        for parent_collection in collections.keys() {
            let foreign_key = format!("{}Id", singular(parent_collection));

            for (child_collection, children) in collections {
                let Some(children) = children.as_array() else {
                    continue;
                };
                if !children.iter().any(|c| c.get(&foreign_key).is_some()) {
                    continue;
                }

                let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
                for child in children {
                    if let Some(parent_id) = child.get(&foreign_key).and_then(id_string) {
                        grouped.entry(parent_id).or_default().push(child.clone());
                    }
                }

                let parents = collections[parent_collection].as_array();
                for parent in parents.into_iter().flatten() {
                    if let Some(id) = parent.get("id").and_then(id_string)
                        && let Some(path) = resource_path(parent_collection, &id, &[child_collection.as_str()])
                    {
                        let items = grouped.remove(&id).unwrap_or_default();
                        self.insert(path, Value::Array(items));
                    }
                }
            }
        }
    }

    /// Store `document` at `path`
    pub fn insert(&self, path: impl Into<String>, document: Value) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(path.into(), document);
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_document(self, path: impl Into<String>, document: Value) -> Self {
        self.insert(path, document);
        self
    }

    /// Make every fetch of `path` fail as unavailable
    pub fn fail_path(&self, path: impl Into<String>, message: impl Into<String>) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(path.into(), message.into());
        }
    }

    /// Number of fetches made for `path`
    pub fn calls(&self, path: &str) -> usize {
        self.calls
            .read()
            .map(|calls| calls.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of fetches made for any path
    pub fn total_calls(&self) -> usize {
        self.calls
            .read()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }

    fn record_call(&self, path: &str) -> Result<(), BackendError> {
        let mut calls = self.calls.write().map_err(|e| lock_error(path, e))?;
        *calls.entry(path.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

#[async_trait]
impl RestBackend for InMemoryBackend {
    async fn fetch(&self, path: &str) -> Result<Value, BackendError> {
        self.record_call(path)?;
        tracing::debug!(path = %path, "In-memory backend fetch");

        let failures = self.failures.read().map_err(|e| lock_error(path, e))?;
        if let Some(message) = failures.get(path) {
            return Err(BackendError::Unavailable {
                path: path.to_string(),
                message: message.clone(),
            });
        }
        drop(failures);

        let documents = self.documents.read().map_err(|e| lock_error(path, e))?;
        documents
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                path: path.to_string(),
            })
    }
}

fn lock_error(path: &str, err: impl std::fmt::Display) -> BackendError {
    BackendError::Unavailable {
        path: path.to_string(),
        message: format!("Failed to acquire lock: {}", err),
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Singular form of a collection name (`companies` -> `company`)
fn singular(collection: &str) -> String {
    if let Some(stem) = collection.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = collection
        .strip_suffix("ses")
        .or_else(|| collection.strip_suffix("xes"))
        .or_else(|| collection.strip_suffix("ches"))
        .or_else(|| collection.strip_suffix("shes"))
    {
        let suffix = &collection[stem.len()..collection.len() - 2];
        format!("{}{}", stem, suffix)
    } else if let Some(stem) = collection.strip_suffix('s') {
        stem.to_string()
    } else {
        collection.to_string()
    }
}
