//! Type registry with deferred field binding
//!
//! Types are registered by name together with a *thunk* producing their
//! field map. The thunk runs on first field access, by which time every
//! other type is registered, so `User` may reference `Company` and
//! `Company` may reference `User` regardless of registration order.
//! References between types are plain names resolved through
//! [`TypeRegistry::lookup`], never embedded values.
//!
//! The registry is populated once at startup and is read-only afterwards.

use super::error::SchemaError;
use super::field::FieldSpec;
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Field map of a type, in declaration order
pub type FieldMap = IndexMap<String, FieldSpec>;

type FieldThunk = Box<dyn Fn() -> FieldMap + Send + Sync>;

/// A named entity shape
pub struct EntityType {
    name: String,
    thunk: FieldThunk,
    fields: OnceLock<FieldMap>,
}

impl EntityType {
    fn new(name: String, thunk: FieldThunk) -> Self {
        Self {
            name,
            thunk,
            fields: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field map, bound on first access
    pub fn fields(&self) -> &FieldMap {
        self.fields.get_or_init(|| (self.thunk)())
    }

    /// Look up one field
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().get(name)
    }

    /// Whether the field map has been computed yet
    pub fn is_bound(&self) -> bool {
        self.fields.get().is_some()
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("fields", &self.fields.get())
            .finish()
    }
}

/// Registry of all entity types, including the root query type
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, Arc<EntityType>>,
    root: Option<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type whose fields are produced lazily by `fields`
    ///
    /// Fails with [`SchemaError::DuplicateType`] if the name is taken.
    pub fn register<F>(&mut self, name: impl Into<String>, fields: F) -> Result<&mut Self, SchemaError>
    where
        F: Fn() -> FieldMap + Send + Sync + 'static,
    {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateType { name });
        }

        let entity = EntityType::new(name.clone(), Box::new(fields));
        self.types.insert(name, Arc::new(entity));
        Ok(self)
    }

    /// Designate the root query type (must already be registered)
    pub fn set_root(&mut self, name: &str) -> Result<&mut Self, SchemaError> {
        self.lookup(name)?;
        self.root = Some(name.to_string());
        Ok(self)
    }

    /// Look up a type by name
    pub fn lookup(&self, name: &str) -> Result<&Arc<EntityType>, SchemaError> {
        self.types.get(name).ok_or_else(|| SchemaError::UnknownType {
            name: name.to_string(),
        })
    }

    /// The root query type
    pub fn root(&self) -> Result<&Arc<EntityType>, SchemaError> {
        let name = self.root.as_deref().ok_or(SchemaError::MissingRoot)?;
        self.lookup(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, in registration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Bind every field map and check that all references resolve
    ///
    /// Call once at startup: a dangling reference is a fatal
    /// [`SchemaError::UnknownType`].
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.root()?;

        for entity in self.types.values() {
            for (field_name, spec) in entity.fields() {
                if let Some(target) = spec.target()
                    && !self.contains(target)
                {
                    tracing::error!(
                        type_name = %entity.name(),
                        field = %field_name,
                        target = %target,
                        "Field references an unregistered type"
                    );
                    return Err(SchemaError::UnknownType {
                        name: target.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
