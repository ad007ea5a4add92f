//! Name-to-blueprint table with class-identity resolution.

use std::any::TypeId;
use std::collections::HashMap;

use crate::error::ModuleError;
use crate::module::Module;
use crate::registry::blueprint::{Blueprint, ClassTarget};

/// The set of module classes an orchestrator knows how to construct.
///
/// Names map to exactly one blueprint each. A type may sit behind several
/// names; the first name a type registers under is canonical and is what
/// class-identity lookups resolve through.
#[derive(Debug, Default, Clone)]
pub struct ClassRegistry {
    blueprints: HashMap<String, Blueprint>,
    canonical: HashMap<TypeId, String>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `M` under its short type name.
    pub fn register<M: Module + Default>(&mut self) -> Result<(), ModuleError> {
        self.register_blueprint(Blueprint::of::<M>())
    }

    /// Register `M` under an explicit alias.
    pub fn register_as<M: Module + Default>(
        &mut self,
        alias: impl Into<String>,
    ) -> Result<(), ModuleError> {
        self.register_blueprint(Blueprint::aliased::<M>(alias))
    }

    /// Register a prepared blueprint.
    pub fn register_blueprint(&mut self, blueprint: Blueprint) -> Result<(), ModuleError> {
        let name = blueprint.name().to_string();
        if name.trim().is_empty() {
            return Err(ModuleError::UnnamedClass);
        }
        if self.blueprints.contains_key(&name) {
            return Err(ModuleError::DuplicateClass { name });
        }
        self.canonical
            .entry(blueprint.type_id())
            .or_insert_with(|| name.clone());
        self.blueprints.insert(name, blueprint);
        Ok(())
    }

    /// Resolve a target to its blueprint.
    ///
    /// Class targets resolve through the type's canonical name. When the type
    /// itself was never registered, resolution falls back to the type's short
    /// name, so a substitute registered under the real class's name stands in
    /// for it.
    pub fn resolve(&self, target: &ClassTarget) -> Result<&Blueprint, ModuleError> {
        match target {
            ClassTarget::Name(name) => {
                if name.trim().is_empty() {
                    return Err(ModuleError::BlankName);
                }
                self.blueprints
                    .get(name)
                    .ok_or_else(|| ModuleError::UnknownName { name: name.clone() })
            }
            ClassTarget::Class { type_id, type_name } => {
                if let Some(name) = self.canonical.get(type_id) {
                    if let Some(blueprint) = self.blueprints.get(name) {
                        return Ok(blueprint);
                    }
                }
                self.blueprints
                    .get(*type_name)
                    .ok_or_else(|| ModuleError::UnknownClass {
                        type_name: (*type_name).to_string(),
                    })
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blueprints.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blueprints.keys().map(String::as_str)
    }
}
