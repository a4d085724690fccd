//! REST backend abstraction
//!
//! The gateway treats the backend as an opaque JSON source addressed by
//! path (`/users/23`, `/companies/1/users`). Resolvers go through the
//! [`RestBackend`] trait so the HTTP client can be swapped for an
//! in-memory fixture store in tests.

use super::error::{BackendError, ResolveError};
use super::field::Record;
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

/// Bytes escaped in an id segment: everything outside RFC 3986 "unreserved"
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A REST-style JSON data source
#[async_trait]
pub trait RestBackend: Send + Sync {
    /// Fetch the JSON document at `path`
    ///
    /// # Returns
    /// The decoded body, [`BackendError::NotFound`] when the backend has no
    /// such resource, or another [`BackendError`] when the call failed.
    async fn fetch(&self, path: &str) -> Result<Value, BackendError>;
}

/// Path of the record `id` in `collection`, followed by `nested` segments
///
/// `resource_path("companies", "1", &["users"])` is `/companies/1/users`.
/// The id is percent-encoded as exactly one segment, so no id can address
/// a path outside its collection. Returns `None` for ids that cannot name a
/// record: empty, `.` and `..`.
pub fn resource_path(collection: &str, id: &str, nested: &[&str]) -> Option<String> {
    if matches!(id, "" | "." | "..") {
        return None;
    }

    let mut path = format!("/{}/{}", collection, utf8_percent_encode(id, ID_SEGMENT));
    for segment in nested {
        path.push('/');
        path.push_str(segment);
    }
    Some(path)
}

/// Fetch a single record, mapping "not found" to `None`
pub async fn fetch_record(
    backend: &dyn RestBackend,
    path: &str,
) -> Result<Option<Record>, ResolveError> {
    match backend.fetch(path).await {
        Ok(Value::Object(record)) => Ok(Some(record)),
        Ok(Value::Null) => Ok(None),
        Ok(other) => Err(BackendError::InvalidPayload {
            path: path.to_string(),
            message: format!("expected an object, got {}", json_kind(&other)),
        }
        .into()),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch a list of records, keeping the backend's order
///
/// A missing collection is an empty list.
pub async fn fetch_records(
    backend: &dyn RestBackend,
    path: &str,
) -> Result<Vec<Record>, ResolveError> {
    let items = match backend.fetch(path).await {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            return Err(BackendError::InvalidPayload {
                path: path.to_string(),
                message: format!("expected an array, got {}", json_kind(&other)),
            }
            .into());
        }
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(BackendError::InvalidPayload {
                path: path.to_string(),
                message: format!("item {} is {}, not an object", index, json_kind(&other)),
            }
            .into()),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
