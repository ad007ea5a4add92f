//! Arena storage for live instances and their recorded dependency edges.

use std::any::TypeId;
use std::collections::HashMap;

use crate::module::ModuleHandle;

/// One arena slot: a live instance plus the dependency edges recorded during
/// its injection.
///
/// Edges are arena indices into the owning [`PoolState`]. They are written
/// once, when the instance's declaration runs, and never change afterward.
pub(crate) struct ModuleCell {
    pub handle: ModuleHandle,
    pub name: String,
    pub required: Vec<usize>,
    pub optional: Vec<usize>,
}

/// Composition state owned by an orchestrator, behind its state mutex.
#[derive(Default)]
pub(crate) struct PoolState {
    /// Every live instance, in construction order.
    pub cells: Vec<ModuleCell>,
    /// The shared instance of each non-exclusive class, by class identity.
    pub pool: HashMap<TypeId, usize>,
    /// Accumulation order across every bootstrap since the last teardown.
    pub queue: Vec<usize>,
    /// The order in which instances completed setup. Teardown walks this
    /// backward.
    pub setup_order: Vec<usize>,
}

impl PoolState {
    /// Drop every instance record. Runs after a fully successful teardown so
    /// the next bootstrap starts from an empty pool.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.pool.clear();
        self.queue.clear();
        self.setup_order.clear();
    }
}
