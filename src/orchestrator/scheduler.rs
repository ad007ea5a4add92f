//! Fixed-point setup scheduling and reverse-order teardown.
//!
//! Setup walks the accumulated queue in rounds. Within a round, instances
//! run in reverse accumulation order (dependencies tend to be discovered
//! after their dependents, so the reverse pass usually converges in one
//! round). An instance is ready once every required dependency reports
//! set-up; optional edges never gate readiness. A round that sets up nothing
//! while work remains means a required cycle, reported as one aggregate
//! error.
//!
//! Teardown unwinds the realized setup order exactly backward, after first
//! disposing of instances that never completed setup.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ConvergenceError, ModuleError, StuckModule};
use crate::module::ModuleHandle;
use crate::utils::lock::with_lock;

use super::Orchestrator;

/// A queued instance awaiting setup, snapshotted out of the state mutex so
/// no lock is held across module awaits.
struct PendingSetup {
    index: usize,
    name: String,
    handle: ModuleHandle,
    /// Required dependencies as (name, handle); readiness reads the live
    /// set-up flags through the handles.
    required: Vec<(String, ModuleHandle)>,
}

impl PendingSetup {
    fn unmet(&self) -> Vec<String> {
        self.required
            .iter()
            .filter(|(_, dep)| !dep.was_set_up())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Orchestrator {
    /// Set up every bootstrapped instance that is not set up yet.
    ///
    /// Lifecycle methods run strictly sequentially. Instances that completed
    /// setup in an earlier call are skipped; instances newly set up by this
    /// call get their `post_setup` afterwards, in accumulation order. When
    /// no progress can be made the call fails with
    /// [`ModuleError::Convergence`] naming every stuck instance.
    pub async fn setup(&self) -> Result<(), ModuleError> {
        let _permit = self.guard.try_engage()?;
        debug!("Setting up bootstrapped modules");

        let mut pending: Vec<PendingSetup> = with_lock(&self.state, |state| {
            state
                .queue
                .iter()
                .rev()
                .filter(|&&index| !state.cells[index].handle.was_set_up())
                .map(|&index| {
                    let cell = &state.cells[index];
                    PendingSetup {
                        index,
                        name: cell.name.clone(),
                        handle: cell.handle.clone(),
                        required: cell
                            .required
                            .iter()
                            .map(|&dep| {
                                let dep_cell = &state.cells[dep];
                                (dep_cell.name.clone(), dep_cell.handle.clone())
                            })
                            .collect(),
                    }
                })
                .collect()
        });

        let mut newly: Vec<PendingSetup> = Vec::new();

        while !pending.is_empty() {
            let mut leftovers = Vec::with_capacity(pending.len());
            let mut progressed = false;

            for item in pending {
                if !item.unmet().is_empty() {
                    leftovers.push(item);
                    continue;
                }

                debug!("Setup of module {}", item.name);
                item.handle.setup().await?;
                if !item.handle.was_set_up() {
                    return Err(ModuleError::SetupContract { name: item.name });
                }
                // Record immediately so a later failure still leaves an
                // unwindable realized order behind.
                with_lock(&self.state, |state| state.setup_order.push(item.index));
                newly.push(item);
                progressed = true;
            }

            if !progressed && !leftovers.is_empty() {
                let stuck = leftovers
                    .iter()
                    .map(|item| StuckModule {
                        name: item.name.clone(),
                        missing: item.unmet(),
                    })
                    .collect();
                return Err(ConvergenceError { stuck }.into());
            }
            pending = leftovers;
        }

        // Post-setup for this call's batch only, in accumulation order.
        // Arena indices follow construction order, so sorting by index
        // restores it.
        newly.sort_by_key(|item| item.index);
        for item in &newly {
            debug!("Post-setup of module {}", item.name);
            item.handle.post_setup().await?;
        }

        debug!("Setup complete");
        Ok(())
    }

    /// Tear down every live instance, most dependent first.
    ///
    /// Instances that never completed setup are disposed of first, newest
    /// first; then the realized setup order is unwound exactly backward. A
    /// fully successful teardown clears the pool and queue, so the next
    /// bootstrap constructs from scratch. On failure the state is left in
    /// place for inspection or retry.
    pub async fn teardown(&self) -> Result<(), ModuleError> {
        let _permit = self.guard.try_engage()?;
        debug!("Tearing down modules");

        let order: Vec<(String, ModuleHandle)> = with_lock(&self.state, |state| {
            let realized: HashSet<usize> = state.setup_order.iter().copied().collect();
            state
                .queue
                .iter()
                .rev()
                .filter(|index| !realized.contains(*index))
                .chain(state.setup_order.iter().rev())
                .map(|&index| {
                    let cell = &state.cells[index];
                    (cell.name.clone(), cell.handle.clone())
                })
                .collect()
        });

        for (name, handle) in order {
            debug!("Teardown of module {}", name);
            handle.teardown().await?;
            if handle.was_set_up() {
                return Err(ModuleError::TeardownContract { name });
            }
        }

        with_lock(&self.state, |state| state.clear());
        debug!("Teardown complete, pool and queue cleared");
        Ok(())
    }
}
