//! Utility functions for GraphQL execution

use crate::core::{ArgSpec, Arguments, PathSegment, ResolveError};
use graphql_parser::query::Value as GqlValue;
use serde_json::{Map, Value, json};

/// Convert a constant GraphQL value to JSON
///
/// Variables must be substituted before calling this; any left over become
/// `null`.
pub fn gql_value_to_json(value: &GqlValue<'_, String>) -> Value {
    match value {
        GqlValue::Null | GqlValue::Variable(_) => Value::Null,
        GqlValue::Int(i) => i.as_i64().map(Value::from).unwrap_or(Value::Null),
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(list) => Value::Array(list.iter().map(gql_value_to_json).collect()),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), gql_value_to_json(v));
            }
            Value::Object(map)
        }
    }
}

/// Coerce raw argument values to the field's declared argument types
///
/// Optional arguments that were not supplied are left out. A required
/// argument that is missing or null, or any value that does not fit its
/// scalar, is an [`ResolveError::ArgumentCoercion`].
pub fn coerce_arguments(specs: &[ArgSpec], raw: &Arguments) -> Result<Arguments, ResolveError> {
    let mut coerced = Arguments::new();

    for spec in specs {
        let value = match raw.get(&spec.name) {
            None | Some(Value::Null) if spec.required => {
                return Err(coercion_error(spec, &Value::Null));
            }
            None => continue,
            Some(Value::Null) => Value::Null,
            Some(value) => spec
                .kind
                .coerce_input(value)
                .ok_or_else(|| coercion_error(spec, value))?,
        };
        coerced.insert(spec.name.clone(), value);
    }

    Ok(coerced)
}

fn coercion_error(spec: &ArgSpec, value: &Value) -> ResolveError {
    ResolveError::ArgumentCoercion {
        argument: spec.name.clone(),
        expected: spec.type_ref(),
        value: value.to_string(),
    }
}

/// Extend a response path by one segment
pub fn child_path(path: &[PathSegment], segment: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(segment.into());
    child
}

/// Render a response path as `company.users.0` for logs
pub fn display_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}
