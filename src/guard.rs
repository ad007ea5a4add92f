//! Reentrancy guard for orchestrator lifecycle operations.
//!
//! Bootstrap, setup, and teardown mutate shared composition state and must
//! never overlap or re-enter. The guard is a named busy flag: entering while
//! an operation is in flight fails immediately with
//! [`ModuleError::Reentrancy`] rather than blocking or queueing, so recursive
//! lifecycle calls show up as an error at the point of recursion.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::ModuleError;

/// Named single-operation guard owned by an orchestrator.
#[derive(Debug)]
pub struct OperationGuard {
    resource: String,
    engaged: AtomicBool,
}

impl OperationGuard {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            engaged: AtomicBool::new(false),
        }
    }

    /// Engage the guard for a single operation.
    ///
    /// The returned permit releases the guard on drop, covering normal
    /// returns, `?` propagation, and futures dropped mid-operation.
    pub fn try_engage(&self) -> Result<OperationPermit<'_>, ModuleError> {
        if self
            .engaged
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ModuleError::Reentrancy {
                resource: self.resource.clone(),
            });
        }
        debug!(resource = %self.resource, "operation guard engaged");
        Ok(OperationPermit { guard: self })
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

/// RAII handle for an engaged [`OperationGuard`].
#[derive(Debug)]
pub struct OperationPermit<'a> {
    guard: &'a OperationGuard,
}

impl Drop for OperationPermit<'_> {
    fn drop(&mut self) {
        self.guard.engaged.store(false, Ordering::Release);
        debug!(resource = %self.guard.resource, "operation guard released");
    }
}
