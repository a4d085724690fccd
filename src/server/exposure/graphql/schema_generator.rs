//! GraphQL SDL generator
//!
//! Renders the type registry as schema definition language, types in
//! registration order and fields in declaration order.

use crate::core::{EntityType, SchemaError, TypeRegistry};
use std::fmt::Write;

/// Schema generator that creates GraphQL SDL from a [`TypeRegistry`]
pub struct SchemaGenerator<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Generate the complete SDL schema
    pub fn generate_sdl(&self) -> Result<String, SchemaError> {
        let root = self.registry.root()?;
        let mut sdl = String::new();

        for name in self.registry.type_names() {
            let entity = self.registry.lookup(name)?;
            sdl.push_str(&Self::generate_type(entity));
            sdl.push_str("\n\n");
        }

        sdl.push_str("schema {\n");
        let _ = writeln!(sdl, "  query: {}", root.name());
        sdl.push_str("}\n");

        Ok(sdl)
    }

    /// Generate one `type` block
    fn generate_type(entity: &EntityType) -> String {
        let mut type_def = format!("type {} {{\n", entity.name());

        for (name, spec) in entity.fields() {
            let args = spec
                .args()
                .iter()
                .map(|arg| format!("{}: {}", arg.name, arg.type_ref()))
                .collect::<Vec<_>>();

            if args.is_empty() {
                let _ = writeln!(type_def, "  {}: {}", name, spec.type_ref());
            } else {
                let _ = writeln!(
                    type_def,
                    "  {}({}): {}",
                    name,
                    args.join(", "),
                    spec.type_ref()
                );
            }
        }

        type_def.push('}');
        type_def
    }
}
