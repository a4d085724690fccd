//! Typed error handling for the gateway
//!
//! Errors fall into two propagation classes:
//!
//! - **Request-level** errors abort the whole request before execution:
//!   [`QueryError`] (malformed or invalid documents) and [`SchemaError`]
//!   (registry misconfiguration, normally caught at startup).
//! - **Field-level** errors are attached to one position of the response
//!   tree and never abort sibling resolution: [`ResolveError`], which wraps
//!   [`BackendError`] and argument coercion failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use restgraph::prelude::*;
//!
//! match registry.lookup("Usr") {
//!     Ok(entity) => println!("found {}", entity.name()),
//!     Err(SchemaError::UnknownType { name }) => eprintln!("no type named {}", name),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Schema / registry errors
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Query document errors (parse and validation)
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl GatewayError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Query(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Schema(e) => e.error_code(),
            GatewayError::Query(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors raised by the type registry
///
/// These indicate a misconfigured schema and are fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A type name was looked up (or referenced) but never registered
    #[error("Unknown type '{name}'")]
    UnknownType { name: String },

    /// The same type name was registered twice
    #[error("Type '{name}' is already registered")]
    DuplicateType { name: String },

    /// No root type was designated
    #[error("No root query type has been set")]
    MissingRoot,
}

impl SchemaError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaError::UnknownType { .. } => "UNKNOWN_TYPE",
            SchemaError::DuplicateType { .. } => "DUPLICATE_TYPE",
            SchemaError::MissingRoot => "MISSING_ROOT_TYPE",
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Malformed query errors
///
/// Any of these rejects the whole request before execution begins; no
/// partial data tree is produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The document could not be parsed
    #[error("Failed to parse query: {message}")]
    Parse { message: String },

    /// The document has no executable operation
    #[error("No operation found in query")]
    NoOperation,

    /// Several operations and no `operationName` to pick one
    #[error("Must provide operation name if query contains multiple operations")]
    AmbiguousOperation,

    /// `operationName` does not match any operation in the document
    #[error("Unknown operation named '{name}'")]
    UnknownOperation { name: String },

    /// Mutations and subscriptions are not served
    #[error("{operation} operations are not supported")]
    UnsupportedOperation { operation: String },

    /// The field is not declared on the type
    #[error("Cannot query field '{field}' on type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    /// An object or list field was requested without sub-fields
    #[error("Field '{field}' of type '{type_name}' must have a selection of subfields")]
    MissingSelection { type_name: String, field: String },

    /// A scalar field was given sub-fields
    #[error("Field '{field}' must not have a selection since type '{type_name}' has no subfields")]
    UnexpectedSelection { type_name: String, field: String },

    /// The argument is not declared on the field
    #[error("Unknown argument '{argument}' on field '{field}'")]
    UnknownArgument { field: String, argument: String },

    /// A required argument was not supplied
    #[error("Field '{field}' argument '{argument}' is required")]
    MissingArgument { field: String, argument: String },

    /// A `$variable` was used but not defined by the operation
    #[error("Variable '${name}' is not defined")]
    UndefinedVariable { name: String },

    /// A fragment spread names an unknown fragment
    #[error("Unknown fragment '{name}'")]
    UnknownFragment { name: String },

    /// A fragment spreads itself, directly or through other fragments
    #[error("Cannot spread fragment '{name}' within itself")]
    FragmentCycle { name: String },

    /// A type condition names a type that is not registered
    #[error("Unknown type '{name}' in type condition")]
    UnknownTypeCondition { name: String },

    /// Two fields share a response key but select different things
    #[error("Fields '{response_key}' conflict because they have differing names or arguments")]
    ConflictingFields { response_key: String },

    /// A directive other than `@skip` or `@include`
    #[error("Unknown directive '@{name}'")]
    UnknownDirective { name: String },

    /// `@skip`/`@include` without a boolean `if`, or with extra arguments
    #[error("Invalid use of directive '@{directive}': {message}")]
    InvalidDirectiveArgument { directive: String, message: String },

    /// The HTTP request body is not a GraphQL request
    #[error("Invalid GraphQL request: {message}")]
    InvalidRequest { message: String },
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::Parse { .. } => "GRAPHQL_PARSE_FAILED",
            QueryError::InvalidRequest { .. } => "BAD_REQUEST",
            _ => "GRAPHQL_VALIDATION_FAILED",
        }
    }
}

// =============================================================================
// Backend Errors
// =============================================================================

/// Errors raised while talking to the REST backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend has no record at this path
    #[error("Backend has no record at '{path}'")]
    NotFound { path: String },

    /// Network failure, timeout or unexpected status
    #[error("Backend unavailable for '{path}': {message}")]
    Unavailable { path: String, message: String },

    /// The backend answered with something that is not the expected JSON shape
    #[error("Backend returned an invalid payload for '{path}': {message}")]
    InvalidPayload { path: String, message: String },
}

impl BackendError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BackendError::NotFound { .. } => StatusCode::NOT_FOUND,
            BackendError::Unavailable { .. } => StatusCode::BAD_GATEWAY,
            BackendError::InvalidPayload { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BackendError::NotFound { .. } => "BACKEND_NOT_FOUND",
            BackendError::Unavailable { .. } => "BACKEND_UNAVAILABLE",
            BackendError::InvalidPayload { .. } => "BACKEND_INVALID_PAYLOAD",
        }
    }

    /// True when the backend signalled "no such record"
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    /// The configuration could not be parsed
    #[error("Failed to parse config: {message}")]
    Parse { message: String },

    /// A configuration value is invalid
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Field resolution errors
// =============================================================================

/// Errors a resolver may produce for its own field
///
/// These are reported in the response `errors` array at the field's path.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    /// The backend fetch failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// An argument could not be coerced to its declared type
    #[error("Argument '{argument}' expected {expected}, got {value}")]
    ArgumentCoercion {
        argument: String,
        expected: String,
        value: String,
    },

    /// A resolver produced a value that does not fit the declared field type
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// The field's target type is not registered
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ResolveError {
    /// Code placed in the error's `extensions.code`
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolveError::Backend(e) => e.error_code(),
            ResolveError::ArgumentCoercion { .. } => "ARGUMENT_COERCION_FAILURE",
            ResolveError::InvalidValue { .. } => "INVALID_VALUE",
            ResolveError::Schema(e) => e.error_code(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
