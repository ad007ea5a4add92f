//! The module trait and handle types.
//!
//! Modules are plain structs that embed a [`ModuleCore`] and implement
//! [`Module`]. The orchestrator only ever sees them as `Arc<dyn Module>`
//! handles; [`ModuleHandleExt`] recovers concrete types where a caller needs
//! them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ModuleError;
use crate::module::core::ModuleCore;
use crate::orchestrator::Injector;

/// Shared handle to a live module instance.
pub type ModuleHandle = Arc<dyn Module>;

/// Arc upcast support, required by [`Module`] so handles can be downcast.
///
/// Implemented automatically for every eligible type; module authors never
/// write this themselves.
pub trait AsAnyArc {
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Send + Sync + 'static> AsAnyArc for T {
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Contract every composable module implements.
///
/// Only [`core`](Module::core) is required. The lifecycle defaults are
/// complete and contract-correct: default `setup` marks the instance set up,
/// default `teardown` clears it, and the default declaration requests
/// nothing. Implementations that override `setup` or `teardown` must keep the
/// corresponding [`ModuleCore`] call, because the scheduler verifies the flag
/// after every invocation.
#[async_trait]
pub trait Module: AsAnyArc + Send + Sync + 'static {
    /// The capability state embedded in this instance.
    fn core(&self) -> &ModuleCore;

    /// Declare dependencies by requesting them through the injector.
    ///
    /// Invoked exactly once per instance, during bootstrap. The injector is
    /// closed permanently when this returns; holding a clone for later does
    /// not reopen it.
    fn declare_dependencies(&self, injector: &Injector) -> Result<(), ModuleError> {
        let _ = injector;
        Ok(())
    }

    /// Set up this module. Called after all required dependencies are set up.
    /// Optional dependencies are not guaranteed to be set up yet.
    async fn setup(&self) -> Result<(), ModuleError> {
        self.core().mark_set_up();
        Ok(())
    }

    /// Runs after the whole setup pass converged, once per instance, in
    /// accumulation order. Every dependency, optional ones included, is set
    /// up by the time this runs.
    async fn post_setup(&self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Tear down this module. Dependents are torn down first.
    async fn teardown(&self) -> Result<(), ModuleError> {
        self.core().clear_set_up();
        Ok(())
    }

    /// Whether every request site gets its own instance of this module.
    fn is_exclusive(&self) -> bool {
        self.core().is_exclusive()
    }

    /// Whether setup has completed on this instance.
    fn was_set_up(&self) -> bool {
        self.core().was_set_up()
    }
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("exclusive", &self.is_exclusive())
            .field("set_up", &self.was_set_up())
            .finish()
    }
}

/// Downcast helpers for [`ModuleHandle`].
pub trait ModuleHandleExt {
    /// Recover the concrete module type behind this handle.
    fn downcast<M: Module>(&self) -> Option<Arc<M>>;

    /// Whether this handle holds an instance of `M`.
    fn is<M: Module>(&self) -> bool;
}

impl ModuleHandleExt for ModuleHandle {
    fn downcast<M: Module>(&self) -> Option<Arc<M>> {
        Arc::clone(self).as_any_arc().downcast::<M>().ok()
    }

    fn is<M: Module>(&self) -> bool {
        self.downcast::<M>().is_some()
    }
}
