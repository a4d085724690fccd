//! Field specifications and resolver contracts
//!
//! A field is one of three tagged variants:
//!
//! - [`ScalarField`]: a leaf value (`String`, `Int`, ...), read from the parent
//!   record by default or produced by an optional async resolver.
//! - [`ObjectField`]: a reference to a single record of another type.
//! - [`ListField`]: a reference to an ordered list of records of another type.
//!
//! Reference targets are type *names*; they are looked up through the
//! [`TypeRegistry`](super::registry::TypeRegistry) when the field is resolved,
//! so types may reference each other in cycles.

use super::error::ResolveError;
use super::query::Arguments;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A record as seen through the graph: a JSON object
pub type Record = Map<String, Value>;

/// Future returned by every resolver
pub type ResolveFuture<T> = BoxFuture<'static, Result<T, ResolveError>>;

/// Resolver for a scalar field: one scalar value or null
pub type ScalarResolver = Arc<dyn Fn(ResolverContext) -> ResolveFuture<Option<Value>> + Send + Sync>;

/// Resolver for an object field: one record or null
pub type ObjectResolver = Arc<dyn Fn(ResolverContext) -> ResolveFuture<Option<Record>> + Send + Sync>;

/// Resolver for a list field: an ordered, possibly empty, sequence of records
pub type ListResolver = Arc<dyn Fn(ResolverContext) -> ResolveFuture<Vec<Record>> + Send + Sync>;

/// Input handed to a resolver
#[derive(Debug, Clone, Default)]
pub struct ResolverContext {
    /// The record this field belongs to (`None` for root fields)
    pub parent: Option<Arc<Record>>,

    /// Coerced arguments of this field
    pub args: Arguments,
}

impl ResolverContext {
    /// Get a string argument
    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Value::as_str)
    }

    /// Get an integer argument
    pub fn arg_i64(&self, name: &str) -> Option<i64> {
        self.args.get(name).and_then(Value::as_i64)
    }

    /// Get an attribute of the parent record
    pub fn parent_attr(&self, name: &str) -> Option<&Value> {
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Get an identifier-like attribute of the parent record as a string
    ///
    /// REST backends are not consistent about ids: `"1"` and `1` both
    /// identify the same record.
    pub fn parent_id(&self, name: &str) -> Option<String> {
        match self.parent_attr(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Scalar types known to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Boolean,
    Id,
}

impl ScalarKind {
    /// GraphQL name of the scalar
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Id => "ID",
        }
    }

    /// Coerce an argument value to this scalar
    ///
    /// Strings are parsed for `Int`, `Float` and `Boolean` arguments and
    /// integers are accepted for `String` and `ID` arguments. Returns `None`
    /// when the value cannot be represented.
    pub fn coerce_input(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ScalarKind::String | ScalarKind::Id, Value::String(_)) => Some(value.clone()),
            (ScalarKind::String | ScalarKind::Id, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Some(Value::String(n.to_string()))
            }
            (ScalarKind::Int, Value::Number(n)) => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(Value::from),
            (ScalarKind::Int, Value::String(s)) => s.trim().parse::<i32>().ok().map(Value::from),
            (ScalarKind::Float, Value::Number(n)) => n.as_f64().and_then(float_value),
            (ScalarKind::Float, Value::String(s)) => {
                s.trim().parse::<f64>().ok().and_then(float_value)
            }
            (ScalarKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ScalarKind::Boolean, Value::String(s)) => match s.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Serialize a resolved value as this scalar
    ///
    /// Returns `None` when the value cannot be represented.
    pub fn coerce_output(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ScalarKind::String | ScalarKind::Id, Value::String(_)) => Some(value.clone()),
            (ScalarKind::String | ScalarKind::Id, Value::Number(n)) => {
                Some(Value::String(n.to_string()))
            }
            (ScalarKind::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ScalarKind::Int, Value::Number(n)) => match n.as_i64() {
                Some(i) => i32::try_from(i).ok().map(Value::from),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .filter(|f| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(f))
                    .map(|f| Value::from(f as i32)),
            },
            (ScalarKind::Int, Value::String(s)) => s.trim().parse::<i32>().ok().map(Value::from),
            (ScalarKind::Float, Value::Number(n)) => n.as_f64().and_then(float_value),
            (ScalarKind::Float, Value::String(s)) => {
                s.trim().parse::<f64>().ok().and_then(float_value)
            }
            (ScalarKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            _ => None,
        }
    }
}

fn float_value(f: f64) -> Option<Value> {
    Number::from_f64(f).map(Value::Number)
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared argument of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub kind: ScalarKind,
    pub required: bool,
}

impl ArgSpec {
    /// A non-null argument
    pub fn required(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    /// A nullable argument
    pub fn optional(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }

    /// GraphQL type of the argument (`String!`, `Int`, ...)
    pub fn type_ref(&self) -> String {
        if self.required {
            format!("{}!", self.kind)
        } else {
            self.kind.to_string()
        }
    }
}

/// A leaf field
#[derive(Clone)]
pub struct ScalarField {
    pub kind: ScalarKind,
    pub args: Vec<ArgSpec>,
    pub resolver: Option<ScalarResolver>,
}

/// A field referencing one record of `target`
#[derive(Clone)]
pub struct ObjectField {
    pub target: String,
    pub args: Vec<ArgSpec>,
    pub resolver: ObjectResolver,
}

/// A field referencing a list of records of `target`
#[derive(Clone)]
pub struct ListField {
    pub target: String,
    pub args: Vec<ArgSpec>,
    pub resolver: ListResolver,
}

/// Specification of one field of an entity type
#[derive(Clone)]
pub enum FieldSpec {
    Scalar(ScalarField),
    Object(ObjectField),
    List(ListField),
}

impl FieldSpec {
    /// A scalar read from the parent record's attribute of the same name
    pub fn scalar(kind: ScalarKind) -> Self {
        FieldSpec::Scalar(ScalarField {
            kind,
            args: Vec::new(),
            resolver: None,
        })
    }

    /// A scalar produced by an async resolver
    pub fn scalar_with<F, Fut>(kind: ScalarKind, resolve: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, ResolveError>> + Send + 'static,
    {
        FieldSpec::Scalar(ScalarField {
            kind,
            args: Vec::new(),
            resolver: Some(Arc::new(move |ctx| resolve(ctx).boxed())),
        })
    }

    /// A single-record reference resolved by `resolve`
    pub fn object<F, Fut>(target: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Record>, ResolveError>> + Send + 'static,
    {
        FieldSpec::Object(ObjectField {
            target: target.into(),
            args: Vec::new(),
            resolver: Arc::new(move |ctx| resolve(ctx).boxed()),
        })
    }

    /// A list reference resolved by `resolve`
    pub fn list<F, Fut>(target: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Record>, ResolveError>> + Send + 'static,
    {
        FieldSpec::List(ListField {
            target: target.into(),
            args: Vec::new(),
            resolver: Arc::new(move |ctx| resolve(ctx).boxed()),
        })
    }

    /// Declare an argument on this field
    pub fn with_arg(mut self, arg: ArgSpec) -> Self {
        match &mut self {
            FieldSpec::Scalar(f) => f.args.push(arg),
            FieldSpec::Object(f) => f.args.push(arg),
            FieldSpec::List(f) => f.args.push(arg),
        }
        self
    }

    /// Declared arguments
    pub fn args(&self) -> &[ArgSpec] {
        match self {
            FieldSpec::Scalar(f) => &f.args,
            FieldSpec::Object(f) => &f.args,
            FieldSpec::List(f) => &f.args,
        }
    }

    /// Name of the referenced type, `None` for scalars
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldSpec::Scalar(_) => None,
            FieldSpec::Object(f) => Some(&f.target),
            FieldSpec::List(f) => Some(&f.target),
        }
    }

    /// GraphQL output type (`String`, `Company`, `[User]`)
    pub fn type_ref(&self) -> String {
        match self {
            FieldSpec::Scalar(f) => f.kind.to_string(),
            FieldSpec::Object(f) => f.target.clone(),
            FieldSpec::List(f) => format!("[{}]", f.target),
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            FieldSpec::Scalar(_) => "Scalar",
            FieldSpec::Object(_) => "Object",
            FieldSpec::List(_) => "List",
        };
        f.debug_struct(variant)
            .field("type", &self.type_ref())
            .field("args", &self.args())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_input_coercion() {
        assert_eq!(ScalarKind::Int.coerce_input(&json!(20)), Some(json!(20)));
        assert_eq!(ScalarKind::Int.coerce_input(&json!("20")), Some(json!(20)));
        assert_eq!(ScalarKind::Int.coerce_input(&json!(" 7 ")), Some(json!(7)));
        assert_eq!(ScalarKind::Int.coerce_input(&json!("abc")), None);
        assert_eq!(ScalarKind::Int.coerce_input(&json!(1.5)), None);
        assert_eq!(ScalarKind::Int.coerce_input(&json!(true)), None);
        assert_eq!(ScalarKind::Int.coerce_input(&json!(5_000_000_000i64)), None);
    }

    #[test]
    fn test_string_input_accepts_integers() {
        assert_eq!(ScalarKind::String.coerce_input(&json!("23")), Some(json!("23")));
        assert_eq!(ScalarKind::String.coerce_input(&json!(23)), Some(json!("23")));
        assert_eq!(ScalarKind::Id.coerce_input(&json!(23)), Some(json!("23")));
        assert_eq!(ScalarKind::String.coerce_input(&json!(2.5)), None);
        assert_eq!(ScalarKind::String.coerce_input(&json!({"a": 1})), None);
    }

    #[test]
    fn test_boolean_and_float_input() {
        assert_eq!(ScalarKind::Boolean.coerce_input(&json!("true")), Some(json!(true)));
        assert_eq!(ScalarKind::Boolean.coerce_input(&json!(1)), None);
        assert_eq!(ScalarKind::Float.coerce_input(&json!("2.5")), Some(json!(2.5)));
        assert_eq!(ScalarKind::Float.coerce_input(&json!(3)), Some(json!(3.0)));
    }

    #[test]
    fn test_output_coercion() {
        assert_eq!(ScalarKind::String.coerce_output(&json!(1)), Some(json!("1")));
        assert_eq!(ScalarKind::Int.coerce_output(&json!(20)), Some(json!(20)));
        assert_eq!(ScalarKind::Int.coerce_output(&json!(20.0)), Some(json!(20)));
        assert_eq!(ScalarKind::Int.coerce_output(&json!("21")), Some(json!(21)));
        assert_eq!(ScalarKind::Int.coerce_output(&json!("twenty")), None);
        assert_eq!(ScalarKind::Int.coerce_output(&json!(-2_147_483_648i64)), Some(json!(-2_147_483_648i64)));
        assert_eq!(ScalarKind::Int.coerce_output(&json!(5_000_000_000i64)), None);
        assert_eq!(ScalarKind::Int.coerce_output(&json!(u64::MAX)), None);
        assert_eq!(ScalarKind::Int.coerce_output(&json!(3e10)), None);
        assert_eq!(ScalarKind::Int.coerce_output(&json!("5000000000")), None);
        assert_eq!(ScalarKind::Boolean.coerce_output(&json!("yes")), None);
    }

    #[test]
    fn test_type_refs() {
        let scalar = FieldSpec::scalar(ScalarKind::Int);
        assert_eq!(scalar.type_ref(), "Int");
        assert_eq!(scalar.target(), None);

        let object = FieldSpec::object("Company", |_ctx| async { Ok(None) })
            .with_arg(ArgSpec::required("id", ScalarKind::String));
        assert_eq!(object.type_ref(), "Company");
        assert_eq!(object.target(), Some("Company"));
        assert_eq!(object.args()[0].type_ref(), "String!");

        let list = FieldSpec::list("User", |_ctx| async { Ok(Vec::new()) });
        assert_eq!(list.type_ref(), "[User]");
    }

    #[test]
    fn test_parent_id_accepts_numbers() {
        let mut record = Record::new();
        record.insert("companyId".to_string(), json!(2));
        record.insert("id".to_string(), json!("23"));
        let ctx = ResolverContext {
            parent: Some(Arc::new(record)),
            args: Arguments::new(),
        };
        assert_eq!(ctx.parent_id("companyId").as_deref(), Some("2"));
        assert_eq!(ctx.parent_id("id").as_deref(), Some("23"));
        assert_eq!(ctx.parent_id("missing"), None);
    }

    #[tokio::test]
    async fn test_resolver_is_boxed_future() {
        let spec = FieldSpec::scalar_with(ScalarKind::String, |ctx| async move {
            Ok(ctx.arg_str("name").map(|s| json!(s.to_uppercase())))
        });
        let FieldSpec::Scalar(field) = spec else {
            panic!("expected scalar field");
        };
        let resolver = field.resolver.expect("resolver should be set");

        let mut args = Arguments::new();
        args.insert("name".to_string(), json!("bill"));
        let value = resolver(ResolverContext { parent: None, args })
            .await
            .expect("resolver should succeed");
        assert_eq!(value, Some(json!("BILL")));
    }
}
