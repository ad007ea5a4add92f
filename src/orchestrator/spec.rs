//! Requirement specs and the bootstrap result shapes that mirror them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::module::{Module, ModuleHandle, ModuleHandleExt};
use crate::registry::ClassTarget;

/// What one bootstrap call should resolve.
///
/// Named specs resolve their slots in insertion order and return handles
/// under the slot names; ordered specs resolve in list order and return a
/// list. Specs are plain data and deserialize from config-shaped input: a
/// map of names to class names, or a sequence of class names.
#[derive(Debug, Clone, PartialEq)]
pub enum RequirementSpec {
    Named(Vec<(String, ClassTarget)>),
    Ordered(Vec<ClassTarget>),
}

impl RequirementSpec {
    pub fn named<N, T>(entries: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: Into<ClassTarget>,
    {
        RequirementSpec::Named(
            entries
                .into_iter()
                .map(|(name, target)| (name.into(), target.into()))
                .collect(),
        )
    }

    pub fn ordered<T: Into<ClassTarget>>(targets: impl IntoIterator<Item = T>) -> Self {
        RequirementSpec::Ordered(targets.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            RequirementSpec::Named(entries) => entries.len(),
            RequirementSpec::Ordered(targets) => targets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for RequirementSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequirementSpec::Named(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (name, target) in entries {
                    map.serialize_entry(name, target)?;
                }
                map.end()
            }
            RequirementSpec::Ordered(targets) => {
                let mut seq = serializer.serialize_seq(Some(targets.len()))?;
                for target in targets {
                    seq.serialize_element(target)?;
                }
                seq.end()
            }
        }
    }
}

struct SpecVisitor;

impl<'de> Visitor<'de> for SpecVisitor {
    type Value = RequirementSpec;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of slot names to class names, or a sequence of class names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        // Encounter order is the resolution order.
        while let Some(entry) = map.next_entry::<String, ClassTarget>()? {
            entries.push(entry);
        }
        Ok(RequirementSpec::Named(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut targets = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(target) = seq.next_element::<ClassTarget>()? {
            targets.push(target);
        }
        Ok(RequirementSpec::Ordered(targets))
    }
}

impl<'de> Deserialize<'de> for RequirementSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SpecVisitor)
    }
}

/// Live handles produced by one bootstrap call, shaped like its spec.
#[derive(Clone)]
pub enum Bootstrapped {
    Named(HashMap<String, ModuleHandle>),
    Ordered(Vec<ModuleHandle>),
}

impl Bootstrapped {
    /// Handle under a named slot.
    pub fn get(&self, name: &str) -> Option<&ModuleHandle> {
        match self {
            Bootstrapped::Named(map) => map.get(name),
            Bootstrapped::Ordered(_) => None,
        }
    }

    /// Concrete instance under a named slot.
    pub fn get_as<M: Module>(&self, name: &str) -> Option<Arc<M>> {
        self.get(name)?.downcast::<M>()
    }

    /// Handle at an ordered position.
    pub fn at(&self, index: usize) -> Option<&ModuleHandle> {
        match self {
            Bootstrapped::Named(_) => None,
            Bootstrapped::Ordered(handles) => handles.get(index),
        }
    }

    /// Concrete instance at an ordered position.
    pub fn at_as<M: Module>(&self, index: usize) -> Option<Arc<M>> {
        self.at(index)?.downcast::<M>()
    }

    pub fn len(&self) -> usize {
        match self {
            Bootstrapped::Named(map) => map.len(),
            Bootstrapped::Ordered(handles) => handles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every handle in the result, in no guaranteed order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &ModuleHandle> + '_> {
        match self {
            Bootstrapped::Named(map) => Box::new(map.values()),
            Bootstrapped::Ordered(handles) => Box::new(handles.iter()),
        }
    }
}

impl fmt::Debug for Bootstrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bootstrapped::Named(map) => {
                let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
                names.sort_unstable();
                f.debug_tuple("Named").field(&names).finish()
            }
            Bootstrapped::Ordered(handles) => {
                f.debug_tuple("Ordered").field(&handles.len()).finish()
            }
        }
    }
}
