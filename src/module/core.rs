//! Per-instance capability state embedded by every module implementation.

use std::sync::atomic::{AtomicBool, Ordering};

/// The flat state record backing the [`Module`](crate::Module) contract.
///
/// Implementations hold one `ModuleCore` as a plain field and return it from
/// `Module::core`. The exclusivity flag is fixed at construction; the set-up
/// flag moves through the lifecycle and is what the scheduler's contract
/// checks observe.
#[derive(Debug, Default)]
pub struct ModuleCore {
    exclusive: bool,
    set_up: AtomicBool,
}

impl ModuleCore {
    /// State for a shared module: one pooled instance serves every dependent.
    pub fn new() -> Self {
        Self {
            exclusive: false,
            set_up: AtomicBool::new(false),
        }
    }

    /// State for an exclusive module: every request site constructs afresh
    /// and the instance never enters the shared pool.
    pub fn exclusive() -> Self {
        Self {
            exclusive: true,
            set_up: AtomicBool::new(false),
        }
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn was_set_up(&self) -> bool {
        self.set_up.load(Ordering::Acquire)
    }

    /// Record that setup completed. Custom `setup` implementations must call
    /// this before returning; the scheduler verifies it did happen.
    pub fn mark_set_up(&self) {
        self.set_up.store(true, Ordering::Release);
    }

    /// Record that teardown completed. Custom `teardown` implementations must
    /// call this before returning; the scheduler verifies it did happen.
    pub fn clear_set_up(&self) {
        self.set_up.store(false, Ordering::Release);
    }
}
