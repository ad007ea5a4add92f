//! Write-once slots for injected dependencies.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::warn;

/// A write-once slot a module fills during its dependency declaration and
/// reads for the rest of its life.
///
/// Works for concrete types (`Dep<Database>`) and for type-erased handles
/// (`Dep<dyn Module>`), so modules that tolerate class substitution can store
/// whatever the registry resolved.
pub struct Dep<M: ?Sized>(OnceLock<Arc<M>>);

impl<M: ?Sized> Dep<M> {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Store the injected handle. The first fill wins; filling twice is a
    /// declaration bug and keeps the original instance.
    pub fn fill(&self, handle: Arc<M>) {
        if self.0.set(handle).is_err() {
            warn!("dependency slot filled twice, keeping the first instance");
        }
    }

    /// The injected handle, if the declaration filled this slot. Optional
    /// dependencies that were never requested read as `None`.
    pub fn try_get(&self) -> Option<&Arc<M>> {
        self.0.get()
    }

    /// The injected handle.
    ///
    /// # Panics
    ///
    /// Panics when the slot was never filled, meaning the owning module's
    /// dependency declaration skipped the request or the instance was
    /// constructed bare, outside a bootstrap.
    pub fn get(&self) -> &Arc<M> {
        self.try_get()
            .expect("dependency slot was never filled during injection")
    }

    pub fn is_filled(&self) -> bool {
        self.0.get().is_some()
    }
}

impl<M: ?Sized> Default for Dep<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized> fmt::Debug for Dep<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("filled", &self.is_filled())
            .finish()
    }
}
