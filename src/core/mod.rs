//! Core module containing the graph model: types, fields, queries and errors

pub mod backend;
pub mod error;
pub mod field;
pub mod query;
pub mod registry;
pub mod response;

pub use backend::{RestBackend, fetch_record, fetch_records, resource_path};
pub use error::{BackendError, ConfigError, GatewayError, QueryError, ResolveError, SchemaError};
pub use field::{
    ArgSpec, FieldSpec, ListField, ObjectField, Record, ResolverContext, ScalarField, ScalarKind,
};
pub use query::{Arguments, FieldSelection, Query};
pub use registry::{EntityType, FieldMap, TypeRegistry};
pub use response::{GraphQLResponse, PathSegment, ResponseError};
