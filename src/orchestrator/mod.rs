//! The orchestrator: class registry, instance pool, and lifecycle driver
//! behind one reentrancy guard.
//!
//! All operations take `&self`; internal state sits behind mutexes that are
//! only held in short, never-across-await sections, so an
//! `Arc<Orchestrator>` can be shared across tasks directly. The guard is
//! what serializes lifecycle operations: overlapping or re-entrant
//! bootstrap/setup/teardown calls fail fast instead of deadlocking.

pub mod bootstrap;
pub(crate) mod pool;
mod scheduler;
pub mod spec;

pub use bootstrap::Injector;
pub use spec::{Bootstrapped, RequirementSpec};

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

use crate::error::ModuleError;
use crate::guard::OperationGuard;
use crate::module::{Module, ModuleHandle};
use crate::registry::{Blueprint, ClassRegistry, ClassTarget};
use crate::utils::lock::with_lock;

use pool::PoolState;

/// An in-process composition engine.
///
/// Owns a class registry, the pool of live instances, and the staged
/// lifecycle scheduler. Each orchestrator is fully independent; nothing is
/// shared process-wide.
pub struct Orchestrator {
    name: String,
    registry: Mutex<ClassRegistry>,
    state: Mutex<PoolState>,
    guard: OperationGuard,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::named("Orchestrator")
    }

    /// An orchestrator with a name, which shows up in reentrancy diagnostics
    /// when an application runs several of them.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            guard: OperationGuard::new(name.clone()),
            name,
            registry: Mutex::new(ClassRegistry::new()),
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `M` under its short type name.
    pub fn register<M: Module + Default>(&self) -> Result<(), ModuleError> {
        self.register_blueprint(Blueprint::of::<M>())
    }

    /// Register `M` under an explicit alias.
    pub fn register_as<M: Module + Default>(
        &self,
        alias: impl Into<String>,
    ) -> Result<(), ModuleError> {
        self.register_blueprint(Blueprint::aliased::<M>(alias))
    }

    /// Register a prepared blueprint.
    pub fn register_blueprint(&self, blueprint: Blueprint) -> Result<(), ModuleError> {
        debug!("Registering module class {}", blueprint.name());
        with_lock(&self.registry, |registry| {
            registry.register_blueprint(blueprint)
        })
    }

    /// Resolve a name or class to its registered blueprint.
    pub fn resolve_class(
        &self,
        target: impl Into<ClassTarget>,
    ) -> Result<Blueprint, ModuleError> {
        let target = target.into();
        with_lock(&self.registry, |registry| registry.resolve(&target).cloned())
    }

    /// Construct a bare instance of a registered class.
    ///
    /// No injection runs, nothing is pooled or queued; the instance's
    /// dependency slots stay empty. Useful for unit-testing a module class
    /// in isolation.
    pub fn construct_module(
        &self,
        target: impl Into<ClassTarget>,
    ) -> Result<ModuleHandle, ModuleError> {
        let blueprint = self.resolve_class(target)?;
        debug!("Attempting construction of class {}", blueprint.name());
        Ok(blueprint.construct())
    }

    /// A snapshot of every live instance and its recorded edges, in
    /// construction order.
    pub fn modules(&self) -> Vec<ModuleInfo> {
        with_lock(&self.state, |state| {
            state
                .cells
                .iter()
                .map(|cell| ModuleInfo {
                    name: cell.name.clone(),
                    exclusive: cell.handle.is_exclusive(),
                    set_up: cell.handle.was_set_up(),
                    required: cell
                        .required
                        .iter()
                        .map(|&dep| state.cells[dep].name.clone())
                        .collect(),
                    optional: cell
                        .optional
                        .iter()
                        .map(|&dep| state.cells[dep].name.clone())
                        .collect(),
                })
                .collect()
        })
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("name", &self.name)
            .finish()
    }
}

/// Description of one live instance, for diagnostics and external renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub exclusive: bool,
    pub set_up: bool,
    /// Names of required dependencies, in request order.
    pub required: Vec<String>,
    /// Names of optional dependencies, in request order.
    pub optional: Vec<String>,
}
