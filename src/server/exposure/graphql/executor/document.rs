//! Turn a GraphQL document into an executable [`Query`]
//!
//! This is where a request is accepted or rejected as a whole: parsing,
//! operation selection, variable substitution, fragment flattening,
//! `@skip`/`@include`, and validation of every selected field and argument
//! against the type registry. Anything wrong here is a [`QueryError`] and
//! nothing is executed.

use super::utils::gql_value_to_json;
use crate::core::{
    Arguments, EntityType, FieldSelection, GatewayError, Query, QueryError, TypeRegistry,
};
use graphql_parser::query::{
    Definition, Directive, Field, FragmentDefinition, OperationDefinition, Selection,
    TypeCondition, Value as GqlValue, VariableDefinition, parse_query,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Name of the introspection field available on every type
pub const TYPENAME_FIELD: &str = "__typename";

/// Parse, validate and flatten `source` into a [`Query`] rooted at `root`
pub fn prepare_query(
    registry: &TypeRegistry,
    root: &EntityType,
    source: &str,
    operation_name: Option<&str>,
    variables: &Map<String, Value>,
) -> Result<Query, GatewayError> {
    let doc = parse_query::<String>(source).map_err(|e| QueryError::Parse {
        message: e.to_string(),
    })?;

    let mut operations = Vec::new();
    let mut fragments = HashMap::new();
    for definition in &doc.definitions {
        match definition {
            Definition::Operation(op) => operations.push(op),
            Definition::Fragment(fragment) => {
                fragments.insert(fragment.name.as_str(), fragment);
            }
        }
    }

    let operation = select_operation(&operations, operation_name)?;
    let (variable_definitions, selection_set) = match operation {
        OperationDefinition::SelectionSet(set) => (&[][..], set),
        OperationDefinition::Query(query) => (&query.variable_definitions[..], &query.selection_set),
        OperationDefinition::Mutation(_) => {
            return Err(QueryError::UnsupportedOperation {
                operation: "Mutation".to_string(),
            }
            .into());
        }
        OperationDefinition::Subscription(_) => {
            return Err(QueryError::UnsupportedOperation {
                operation: "Subscription".to_string(),
            }
            .into());
        }
    };

    let planner = Planner {
        registry,
        fragments,
        variables: bind_variables(variable_definitions, variables),
    };
    let selections = planner.plan_selections(root, &selection_set.items, &mut Vec::new())?;
    Ok(Query { selections })
}

fn select_operation<'d, 'a>(
    operations: &[&'d OperationDefinition<'a, String>],
    operation_name: Option<&str>,
) -> Result<&'d OperationDefinition<'a, String>, QueryError> {
    match operation_name {
        Some(name) => operations
            .iter()
            .copied()
            .find(|op| operation_label(op) == Some(name))
            .ok_or_else(|| QueryError::UnknownOperation {
                name: name.to_string(),
            }),
        None => match operations {
            [] => Err(QueryError::NoOperation),
            [single] => Ok(*single),
            _ => Err(QueryError::AmbiguousOperation),
        },
    }
}

fn operation_label<'d>(op: &'d OperationDefinition<'_, String>) -> Option<&'d str> {
    match op {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

/// Values of the operation's declared variables
///
/// Supplied value, else the declared default, else `null`. Supplied values
/// for undeclared variables are ignored.
fn bind_variables(
    definitions: &[VariableDefinition<'_, String>],
    supplied: &Map<String, Value>,
) -> HashMap<String, Value> {
    definitions
        .iter()
        .map(|def| {
            let value = supplied
                .get(&def.name)
                .cloned()
                .or_else(|| def.default_value.as_ref().map(gql_value_to_json))
                .unwrap_or(Value::Null);
            (def.name.clone(), value)
        })
        .collect()
}

struct Planner<'q, 'a> {
    registry: &'q TypeRegistry,
    fragments: HashMap<&'q str, &'q FragmentDefinition<'a, String>>,
    variables: HashMap<String, Value>,
}

impl<'q, 'a> Planner<'q, 'a> {
    /// Plan a selection set on `entity`, merging fields that share a response key
    ///
    /// `spreads` is the chain of fragments currently being expanded.
    fn plan_selections(
        &self,
        entity: &EntityType,
        items: &'q [Selection<'a, String>],
        spreads: &mut Vec<&'q str>,
    ) -> Result<Vec<FieldSelection>, GatewayError> {
        let mut planned = Vec::new();
        self.collect(entity, items, &mut planned, spreads)?;
        Ok(planned)
    }

    fn collect(
        &self,
        entity: &EntityType,
        items: &'q [Selection<'a, String>],
        planned: &mut Vec<FieldSelection>,
        spreads: &mut Vec<&'q str>,
    ) -> Result<(), GatewayError> {
        for item in items {
            match item {
                Selection::Field(field) => {
                    if self.included(&field.directives)? {
                        let selection = self.plan_field(entity, field, spreads)?;
                        merge_into(planned, selection)?;
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !self.included(&spread.directives)? {
                        continue;
                    }
                    let name = spread.fragment_name.as_str();
                    let fragment = self
                        .fragments
                        .get(name)
                        .copied()
                        .ok_or_else(|| QueryError::UnknownFragment {
                            name: name.to_string(),
                        })?;
                    if spreads.contains(&name) {
                        return Err(QueryError::FragmentCycle {
                            name: name.to_string(),
                        }
                        .into());
                    }
                    if self.applies(&fragment.type_condition, entity)? {
                        spreads.push(name);
                        self.collect(entity, &fragment.selection_set.items, planned, spreads)?;
                        spreads.pop();
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.included(&inline.directives)? {
                        continue;
                    }
                    let applies = match &inline.type_condition {
                        Some(condition) => self.applies(condition, entity)?,
                        None => true,
                    };
                    if applies {
                        self.collect(entity, &inline.selection_set.items, planned, spreads)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn plan_field(
        &self,
        entity: &EntityType,
        field: &'q Field<'a, String>,
        spreads: &mut Vec<&'q str>,
    ) -> Result<FieldSelection, GatewayError> {
        let name = field.name.as_str();

        if name == TYPENAME_FIELD {
            if !field.selection_set.items.is_empty() {
                return Err(QueryError::UnexpectedSelection {
                    type_name: "String".to_string(),
                    field: name.to_string(),
                }
                .into());
            }
            return Ok(FieldSelection {
                name: name.to_string(),
                alias: field.alias.clone(),
                ..Default::default()
            });
        }

        let spec = entity.field(name).ok_or_else(|| QueryError::UnknownField {
            type_name: entity.name().to_string(),
            field: name.to_string(),
        })?;

        let mut arguments = Arguments::new();
        for (arg_name, value) in &field.arguments {
            if !spec.args().iter().any(|a| &a.name == arg_name) {
                return Err(QueryError::UnknownArgument {
                    field: name.to_string(),
                    argument: arg_name.clone(),
                }
                .into());
            }
            arguments.insert(arg_name.clone(), self.input_value(value)?);
        }
        if let Some(missing) = spec
            .args()
            .iter()
            .find(|a| a.required && !arguments.contains_key(&a.name))
        {
            return Err(QueryError::MissingArgument {
                field: name.to_string(),
                argument: missing.name.clone(),
            }
            .into());
        }

        let selections = match spec.target() {
            None => {
                if !field.selection_set.items.is_empty() {
                    return Err(QueryError::UnexpectedSelection {
                        type_name: spec.type_ref(),
                        field: name.to_string(),
                    }
                    .into());
                }
                Vec::new()
            }
            Some(target) => {
                if field.selection_set.items.is_empty() {
                    return Err(QueryError::MissingSelection {
                        type_name: spec.type_ref(),
                        field: name.to_string(),
                    }
                    .into());
                }
                let target = self.registry.lookup(target)?;
                self.plan_selections(target, &field.selection_set.items, spreads)?
            }
        };

        Ok(FieldSelection {
            name: name.to_string(),
            alias: field.alias.clone(),
            arguments,
            selections,
        })
    }

    /// Whether a fragment's type condition matches `entity`
    ///
    /// There are no interfaces or unions, so a condition applies only to
    /// the type it names.
    fn applies(&self, condition: &TypeCondition<'a, String>, entity: &EntityType) -> Result<bool, GatewayError> {
        let TypeCondition::On(type_name) = condition;
        if !self.registry.contains(type_name) {
            return Err(QueryError::UnknownTypeCondition {
                name: type_name.clone(),
            }
            .into());
        }
        Ok(type_name == entity.name())
    }

    /// Evaluate `@skip(if:)` and `@include(if:)`
    ///
    /// Any other directive, or an `if` that is missing or not a boolean,
    /// rejects the document.
    fn included(&self, directives: &[Directive<'a, String>]) -> Result<bool, QueryError> {
        for directive in directives {
            let name = directive.name.as_str();
            if name != "skip" && name != "include" {
                return Err(QueryError::UnknownDirective {
                    name: name.to_string(),
                });
            }

            let invalid = |message: &str| QueryError::InvalidDirectiveArgument {
                directive: name.to_string(),
                message: message.to_string(),
            };
            if let Some((other, _)) = directive.arguments.iter().find(|(arg, _)| arg != "if") {
                return Err(invalid(&format!("unknown argument '{}'", other)));
            }
            let condition = match directive.arguments.iter().find(|(arg, _)| arg == "if") {
                Some((_, value)) => self.input_value(value)?,
                None => return Err(invalid("argument 'if' is required")),
            };
            let Some(condition) = condition.as_bool() else {
                return Err(invalid(&format!("argument 'if' must be a Boolean, got {}", condition)));
            };

            if (name == "skip") == condition {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Convert an argument literal, substituting variables
    fn input_value(&self, value: &GqlValue<'a, String>) -> Result<Value, QueryError> {
        match value {
            GqlValue::Variable(name) => {
                self.variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| QueryError::UndefinedVariable { name: name.clone() })
            }
            GqlValue::List(items) => items
                .iter()
                .map(|item| self.input_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            GqlValue::Object(fields) => {
                let mut object = Map::new();
                for (key, item) in fields {
                    object.insert(key.clone(), self.input_value(item)?);
                }
                Ok(Value::Object(object))
            }
            other => Ok(gql_value_to_json(other)),
        }
    }
}

/// Add `selection`, merging it with an earlier field of the same response key
fn merge_into(planned: &mut Vec<FieldSelection>, selection: FieldSelection) -> Result<(), QueryError> {
    let key = selection.response_key().to_string();
    let Some(existing) = planned.iter_mut().find(|s| s.response_key() == key) else {
        planned.push(selection);
        return Ok(());
    };

    if existing.name != selection.name || existing.arguments != selection.arguments {
        return Err(QueryError::ConflictingFields { response_key: key });
    }
    for child in selection.selections {
        merge_into(&mut existing.selections, child)?;
    }
    Ok(())
}
