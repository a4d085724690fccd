//! GraphQL response envelope
//!
//! A response carries `data`, `errors`, or both (partial success):
//!
//! ```json
//! {
//!   "data": { "company": { "name": "Apple", "users": null } },
//!   "errors": [{
//!     "message": "Backend unavailable for '/companies/1/users': ...",
//!     "path": ["company", "users"],
//!     "extensions": { "code": "BACKEND_UNAVAILABLE" }
//!   }]
//! }
//! ```

use super::error::{GatewayError, ResolveError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of a response path: an object key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Extra machine-readable error data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: String,
}

/// An entry of the response `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,

    /// Position in the data tree; absent for request-level errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    pub extensions: ErrorExtensions,
}

impl ResponseError {
    /// A field-level error at `path`
    pub fn at_path(path: Vec<PathSegment>, error: &ResolveError) -> Self {
        Self {
            message: error.to_string(),
            path: Some(path),
            extensions: ErrorExtensions {
                code: error.error_code().to_string(),
            },
        }
    }

    /// A request-level error (no path)
    pub fn request(error: &GatewayError) -> Self {
        Self {
            message: error.to_string(),
            path: None,
            extensions: ErrorExtensions {
                code: error.error_code().to_string(),
            },
        }
    }
}

/// Result of executing one GraphQL request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl GraphQLResponse {
    /// A response with data and any field-level errors
    pub fn partial(data: Value, errors: Vec<ResponseError>) -> Self {
        Self {
            data: Some(data),
            errors,
        }
    }

    /// A response rejecting the whole request (no `data`)
    pub fn rejected(error: &GatewayError) -> Self {
        Self {
            data: None,
            errors: vec![ResponseError::request(error)],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
