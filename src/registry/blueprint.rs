//! Named, type-erased module factories and resolution targets.

use std::any::{self, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::module::{Module, ModuleHandle};

/// Last path segment of a type name, with generic arguments dropped.
///
/// Generic modules therefore share a short name across instantiations and
/// need explicit aliases to coexist in one registry.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = match full.find('<') {
        Some(i) => &full[..i],
        None => full,
    };
    match base.rfind("::") {
        Some(i) => &base[i + 2..],
        None => base,
    }
}

/// A registered module class: a name, the concrete type's identity, and a
/// factory producing fresh bare instances.
#[derive(Clone)]
pub struct Blueprint {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    construct: Arc<dyn Fn() -> ModuleHandle + Send + Sync>,
}

impl Blueprint {
    /// Blueprint for `M` under its short type name.
    pub fn of<M: Module + Default>() -> Self {
        Self::aliased::<M>(short_type_name(any::type_name::<M>()))
    }

    /// Blueprint for `M` under an explicit name.
    ///
    /// This is the substitution hook: registering a stand-in under the real
    /// class's name makes resolutions of that name, and of the absent real
    /// class, produce the stand-in.
    pub fn aliased<M: Module + Default>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::of::<M>(),
            type_name: short_type_name(any::type_name::<M>()),
            construct: Arc::new(|| Arc::new(M::default()) as ModuleHandle),
        }
    }

    /// The name this blueprint registers under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short name of the concrete type this blueprint constructs.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Construct a fresh instance. No injection happens here; the result has
    /// empty dependency slots.
    pub fn construct(&self) -> ModuleHandle {
        (self.construct)()
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// What to resolve: a registered name, or a concrete class by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassTarget {
    /// A name some blueprint was registered under.
    Name(String),
    /// A concrete module type.
    Class {
        type_id: TypeId,
        type_name: &'static str,
    },
}

impl ClassTarget {
    /// Target the concrete type `M`.
    pub fn of<M: Module>() -> Self {
        ClassTarget::Class {
            type_id: TypeId::of::<M>(),
            type_name: short_type_name(any::type_name::<M>()),
        }
    }

    /// Target a registered name.
    pub fn name(name: impl Into<String>) -> Self {
        ClassTarget::Name(name.into())
    }
}

impl From<&str> for ClassTarget {
    fn from(name: &str) -> Self {
        ClassTarget::Name(name.to_string())
    }
}

impl From<String> for ClassTarget {
    fn from(name: String) -> Self {
        ClassTarget::Name(name)
    }
}

impl fmt::Display for ClassTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassTarget::Name(name) => f.write_str(name),
            ClassTarget::Class { type_name, .. } => f.write_str(type_name),
        }
    }
}

impl Serialize for ClassTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ClassTarget::Name(name) => serializer.serialize_str(name),
            ClassTarget::Class { type_name, .. } => serializer.serialize_str(type_name),
        }
    }
}

impl<'de> Deserialize<'de> for ClassTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ClassTarget::Name(String::deserialize(deserializer)?))
    }
}
