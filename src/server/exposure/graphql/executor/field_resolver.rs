//! Field resolution over the type registry
//!
//! Resolution is depth-first: a field's resolver runs before any of its
//! children, and children run only when the parent produced a record.
//! Sibling fields and list items are resolved concurrently; results are
//! assembled in request order regardless of completion order.

use futures::future::{BoxFuture, FutureExt, join_all};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::document::TYPENAME_FIELD;
use super::utils::{child_path, coerce_arguments, display_path};
use crate::core::{
    EntityType, FieldSelection, FieldSpec, PathSegment, Record, ResolveError, ResolverContext,
    ResponseError, TypeRegistry,
};

/// A resolved subtree and the field errors raised inside it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub errors: Vec<ResponseError>,
}

impl Resolved {
    fn value(value: Value) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    fn null() -> Self {
        Self::value(Value::Null)
    }

    /// `null` at `path`, reporting `error`
    fn failed(path: Vec<PathSegment>, error: &ResolveError) -> Self {
        tracing::warn!(
            path = %display_path(&path),
            code = error.error_code(),
            "field resolution failed: {}",
            error
        );
        Self {
            value: Value::Null,
            errors: vec![ResponseError::at_path(path, error)],
        }
    }
}

/// Resolve `selections` on a record of `entity` into a JSON object
///
/// `parent` is `None` only for the root type.
pub fn resolve_selections<'a>(
    registry: &'a TypeRegistry,
    entity: &'a EntityType,
    parent: Option<Arc<Record>>,
    selections: &'a [FieldSelection],
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Resolved> {
    async move {
        let fields = join_all(selections.iter().map(|selection| {
            resolve_field(
                registry,
                entity,
                parent.clone(),
                selection,
                child_path(&path, selection.response_key()),
            )
        }))
        .await;

        let mut object = Map::new();
        let mut errors = Vec::new();
        for (selection, resolved) in selections.iter().zip(fields) {
            object.insert(selection.response_key().to_string(), resolved.value);
            errors.extend(resolved.errors);
        }

        Resolved {
            value: Value::Object(object),
            errors,
        }
    }
    .boxed()
}

/// Resolve one field of `entity` at `path`
fn resolve_field<'a>(
    registry: &'a TypeRegistry,
    entity: &'a EntityType,
    parent: Option<Arc<Record>>,
    selection: &'a FieldSelection,
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Resolved> {
    async move {
        if selection.name == TYPENAME_FIELD {
            return Resolved::value(Value::String(entity.name().to_string()));
        }

        let Some(spec) = entity.field(&selection.name) else {
            let error = ResolveError::InvalidValue {
                field: selection.name.clone(),
                message: format!("not declared on type '{}'", entity.name()),
            };
            return Resolved::failed(path, &error);
        };

        let args = match coerce_arguments(spec.args(), &selection.arguments) {
            Ok(args) => args,
            Err(e) => return Resolved::failed(path, &e),
        };
        let ctx = ResolverContext {
            parent: parent.clone(),
            args,
        };

        match spec {
            FieldSpec::Scalar(field) => {
                let raw = match &field.resolver {
                    Some(resolver) => match resolver(ctx).await {
                        Ok(raw) => raw,
                        Err(e) => return Resolved::failed(path, &e),
                    },
                    None => parent
                        .as_ref()
                        .and_then(|record| record.get(&selection.name))
                        .cloned(),
                };

                match raw {
                    None | Some(Value::Null) => Resolved::null(),
                    Some(raw) => match field.kind.coerce_output(&raw) {
                        Some(value) => Resolved::value(value),
                        None => {
                            let error = ResolveError::InvalidValue {
                                field: selection.name.clone(),
                                message: format!("{} cannot represent {}", field.kind, raw),
                            };
                            Resolved::failed(path, &error)
                        }
                    },
                }
            }

            FieldSpec::Object(field) => {
                let target = match registry.lookup(&field.target) {
                    Ok(target) => target,
                    Err(e) => return Resolved::failed(path, &e.into()),
                };
                match (field.resolver)(ctx).await {
                    Ok(Some(record)) => {
                        resolve_selections(
                            registry,
                            target,
                            Some(Arc::new(record)),
                            &selection.selections,
                            path,
                        )
                        .await
                    }
                    Ok(None) => Resolved::null(),
                    Err(e) => Resolved::failed(path, &e),
                }
            }

            FieldSpec::List(field) => {
                let target = match registry.lookup(&field.target) {
                    Ok(target) => target,
                    Err(e) => return Resolved::failed(path, &e.into()),
                };
                let records = match (field.resolver)(ctx).await {
                    Ok(records) => records,
                    Err(e) => return Resolved::failed(path, &e),
                };

                let items = join_all(records.into_iter().enumerate().map(|(index, record)| {
                    resolve_selections(
                        registry,
                        target,
                        Some(Arc::new(record)),
                        &selection.selections,
                        child_path(&path, index),
                    )
                }))
                .await;

                let mut values = Vec::with_capacity(items.len());
                let mut errors = Vec::new();
                for item in items {
                    values.push(item.value);
                    errors.extend(item.errors);
                }
                Resolved {
                    value: Value::Array(values),
                    errors,
                }
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArgSpec, BackendError, FieldMap, ScalarKind};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    /// Root { thing(n: Int): Thing, things: [Thing], broken: Thing }
    /// Thing { name: String, size: Int, upper: String, self: Thing }
    fn registry(calls: Arc<AtomicUsize>) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register("Root", || {
                let mut fields = FieldMap::new();
                fields.insert(
                    "thing".to_string(),
                    FieldSpec::object("Thing", |ctx| async move {
                        Ok(Some(record(json!({
                            "name": format!("thing-{}", ctx.arg_i64("n").unwrap_or(0)),
                            "size": "12"
                        }))))
                    })
                    .with_arg(ArgSpec::optional("n", ScalarKind::Int)),
                );
                fields.insert(
                    "things".to_string(),
                    FieldSpec::list("Thing", |_| async {
                        Ok(vec![
                            record(json!({"name": "a"})),
                            record(json!({"name": "b", "size": "big"})),
                        ])
                    }),
                );
                fields.insert(
                    "broken".to_string(),
                    FieldSpec::object("Thing", |_| async {
                        Err(BackendError::Unavailable {
                            path: "/broken".to_string(),
                            message: "down".to_string(),
                        }
                        .into())
                    }),
                );
                fields
            })
            .unwrap();
        registry
            .register("Thing", move || {
                let calls = calls.clone();
                let mut fields = FieldMap::new();
                fields.insert("name".to_string(), FieldSpec::scalar(ScalarKind::String));
                fields.insert("size".to_string(), FieldSpec::scalar(ScalarKind::Int));
                fields.insert(
                    "upper".to_string(),
                    FieldSpec::scalar_with(ScalarKind::String, |ctx| async move {
                        Ok(ctx
                            .parent_attr("name")
                            .and_then(Value::as_str)
                            .map(|s| Value::String(s.to_uppercase())))
                    }),
                );
                fields.insert(
                    "self".to_string(),
                    FieldSpec::object("Thing", move |ctx| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move { Ok(ctx.parent.map(|p| (*p).clone())) }
                    }),
                );
                fields
            })
            .unwrap();
        registry.set_root("Root").unwrap();
        registry
    }

    async fn run(registry: &TypeRegistry, selections: Vec<FieldSelection>) -> Resolved {
        let root = registry.root().unwrap();
        resolve_selections(registry, root, None, &selections, Vec::new()).await
    }

    #[tokio::test]
    async fn test_nested_object_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(calls.clone());
        let selections = vec![
            FieldSelection::new("thing")
                .with_argument("n", json!("7"))
                .with_selection(FieldSelection::new("name"))
                .with_selection(FieldSelection::new("size"))
                .with_selection(FieldSelection::new("upper"))
                .with_selection(
                    FieldSelection::new("self")
                        .with_alias("again")
                        .with_selection(FieldSelection::new("__typename")),
                ),
        ];

        let resolved = run(&registry, selections).await;
        assert!(resolved.errors.is_empty(), "{:?}", resolved.errors);
        assert_eq!(
            resolved.value,
            json!({
                "thing": {
                    "name": "thing-7",
                    "size": 12,
                    "upper": "THING-7",
                    "again": {"__typename": "Thing"}
                }
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scalar_only_selection_skips_reference_resolvers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(calls.clone());
        let selections =
            vec![FieldSelection::new("thing").with_selection(FieldSelection::new("name"))];

        let resolved = run(&registry, selections).await;
        assert_eq!(resolved.value, json!({"thing": {"name": "thing-0"}}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_list_items_keep_order_and_report_indexed_errors() {
        let registry = registry(Arc::new(AtomicUsize::new(0)));
        let selections = vec![
            FieldSelection::new("things")
                .with_selection(FieldSelection::new("name"))
                .with_selection(FieldSelection::new("size")),
        ];

        let resolved = run(&registry, selections).await;
        assert_eq!(
            resolved.value,
            json!({"things": [{"name": "a", "size": null}, {"name": "b", "size": null}]})
        );
        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(
            resolved.errors[0].path,
            Some(vec!["things".into(), 1usize.into(), "size".into()])
        );
        assert_eq!(resolved.errors[0].extensions.code, "INVALID_VALUE");
    }

    #[tokio::test]
    async fn test_failing_resolver_does_not_affect_siblings() {
        let registry = registry(Arc::new(AtomicUsize::new(0)));
        let selections = vec![
            FieldSelection::new("broken").with_selection(FieldSelection::new("name")),
            FieldSelection::new("thing").with_selection(FieldSelection::new("name")),
        ];

        let resolved = run(&registry, selections).await;
        assert_eq!(
            resolved.value,
            json!({"broken": null, "thing": {"name": "thing-0"}})
        );
        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(resolved.errors[0].path, Some(vec!["broken".into()]));
        assert_eq!(resolved.errors[0].extensions.code, "BACKEND_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_argument_coercion_failure_nulls_the_field() {
        let registry = registry(Arc::new(AtomicUsize::new(0)));
        let selections = vec![
            FieldSelection::new("thing")
                .with_argument("n", json!("seven"))
                .with_selection(FieldSelection::new("name")),
            FieldSelection::new("things").with_selection(FieldSelection::new("name")),
        ];

        let resolved = run(&registry, selections).await;
        assert_eq!(
            resolved.value,
            json!({"thing": null, "things": [{"name": "a"}, {"name": "b"}]})
        );
        assert_eq!(resolved.errors[0].extensions.code, "ARGUMENT_COERCION_FAILURE");
    }
}
