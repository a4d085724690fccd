//! Executable query tree
//!
//! A [`Query`] is what the executor runs: the root field selections of one
//! operation with fragments flattened, directives applied and variables
//! substituted. It is produced from a GraphQL document by the planner in
//! the GraphQL exposure, or built directly:
//!
//! ```rust,ignore
//! let query = Query::new().with_selection(
//!     FieldSelection::new("user")
//!         .with_argument("id", json!("23"))
//!         .with_selection(FieldSelection::new("firstName")),
//! );
//! ```

use indexmap::IndexMap;
use serde_json::Value;

/// Argument values keyed by argument name, in document order
pub type Arguments = IndexMap<String, Value>;

/// One requested field and its requested sub-fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSelection {
    /// Field name as declared on the type
    pub name: String,

    /// Response key override (`alias: field`)
    pub alias: Option<String>,

    /// Argument values before coercion
    pub arguments: Arguments,

    /// Requested sub-fields (empty for scalars)
    pub selections: Vec<FieldSelection>,
}

impl FieldSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_selection(mut self, selection: FieldSelection) -> Self {
        self.selections.push(selection);
        self
    }

    /// Key under which this field appears in the response
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Root selections of one operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub selections: Vec<FieldSelection>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, selection: FieldSelection) -> Self {
        self.selections.push(selection);
        self
    }
}
