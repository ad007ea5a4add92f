//! The bootstrap worklist and the injector capability.
//!
//! Bootstrap runs breadth-first: root targets are resolved in spec order,
//! then each newly constructed instance has its dependency declaration run,
//! which may construct further instances and extend the worklist. Every
//! effect is buffered in a session over snapshots of the registry and pool,
//! and committed to orchestrator state only when the whole call succeeds, so
//! a failing bootstrap leaves no partial instances behind.

use std::any::{self, TypeId};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::error::ModuleError;
use crate::module::{Module, ModuleHandle, ModuleHandleExt};
use crate::registry::blueprint::short_type_name;
use crate::registry::{ClassRegistry, ClassTarget};
use crate::utils::lock::with_lock;

use super::pool::ModuleCell;
use super::spec::{Bootstrapped, RequirementSpec};
use super::Orchestrator;

/// How a request is recorded on the requesting module's cell.
#[derive(Clone, Copy, PartialEq, Eq)]
enum EdgeKind {
    Required,
    Optional,
}

/// The dependency request capability handed to a module's declaration.
///
/// Live for exactly one declaration pass. Clones share the same one-shot
/// window: once the declaration returns, every clone is closed for good, and
/// calls from any thread or task fail with
/// [`ModuleError::InjectionClosed`].
#[derive(Clone)]
pub struct Injector {
    session: Weak<Mutex<SessionInner>>,
    cell: usize,
    module_name: String,
    open: Arc<AtomicBool>,
}

impl Injector {
    /// Request a required dependency by concrete type.
    pub fn request<M: Module>(&self) -> Result<Arc<M>, ModuleError> {
        self.request_typed::<M>(EdgeKind::Required)
    }

    /// Request an optional dependency by concrete type.
    ///
    /// Resolution and construction behave exactly like
    /// [`request`](Self::request); only the recorded edge differs. An
    /// optional dependency never gates the requester's setup readiness,
    /// which is what breaks dependency cycles.
    pub fn request_optional<M: Module>(&self) -> Result<Arc<M>, ModuleError> {
        self.request_typed::<M>(EdgeKind::Optional)
    }

    /// Request a required dependency by name or class, keeping the handle
    /// type-erased. This is the substitution-tolerant path.
    pub fn request_dyn(
        &self,
        target: impl Into<ClassTarget>,
    ) -> Result<ModuleHandle, ModuleError> {
        Ok(self.acquire(target.into(), EdgeKind::Required)?.handle)
    }

    /// Request an optional dependency by name or class.
    pub fn request_optional_dyn(
        &self,
        target: impl Into<ClassTarget>,
    ) -> Result<ModuleHandle, ModuleError> {
        Ok(self.acquire(target.into(), EdgeKind::Optional)?.handle)
    }

    fn request_typed<M: Module>(&self, kind: EdgeKind) -> Result<Arc<M>, ModuleError> {
        let resolved = self.acquire(ClassTarget::of::<M>(), kind)?;
        let Resolved {
            name,
            type_name,
            handle,
            ..
        } = resolved;
        handle
            .downcast::<M>()
            .ok_or_else(|| ModuleError::ClassMismatch {
                name,
                requested: short_type_name(any::type_name::<M>()),
                resolved: type_name,
            })
    }

    fn acquire(&self, target: ClassTarget, kind: EdgeKind) -> Result<Resolved, ModuleError> {
        if !self.open.load(Ordering::Acquire) {
            return Err(self.closed());
        }
        let session = self.session.upgrade().ok_or_else(|| self.closed())?;

        with_lock(&session, |inner| {
            // Re-check under the lock; the declaration may have ended between
            // the fast check above and here.
            if !self.open.load(Ordering::Acquire) {
                return Err(self.closed());
            }

            let resolved = inner.resolve_target(&target)?;
            let slot = self.cell - inner.prior_count;
            match kind {
                EdgeKind::Required => inner.new_cells[slot].required.push(resolved.index),
                EdgeKind::Optional => inner.new_cells[slot].optional.push(resolved.index),
            }
            Ok(resolved)
        })
    }

    fn closed(&self) -> ModuleError {
        ModuleError::InjectionClosed {
            name: self.module_name.clone(),
        }
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("module", &self.module_name)
            .field("open", &self.open.load(Ordering::Acquire))
            .finish()
    }
}

/// Outcome of resolving one target inside a session.
struct Resolved {
    index: usize,
    name: String,
    type_name: &'static str,
    handle: ModuleHandle,
}

/// A cell constructed during the current session, not yet committed.
struct NewCell {
    handle: ModuleHandle,
    name: String,
    required: Vec<usize>,
    optional: Vec<usize>,
}

/// Buffered effects of one in-flight bootstrap call.
struct SessionInner {
    registry: ClassRegistry,
    prior: Vec<ModuleHandle>,
    prior_count: usize,
    pool: HashMap<TypeId, usize>,
    new_cells: Vec<NewCell>,
    injections: VecDeque<usize>,
}

impl SessionInner {
    fn handle_at(&self, index: usize) -> ModuleHandle {
        if index < self.prior_count {
            self.prior[index].clone()
        } else {
            self.new_cells[index - self.prior_count].handle.clone()
        }
    }

    /// Resolve one target: reuse the pooled instance of the class, or
    /// construct a fresh one, pool it unless exclusive, and schedule its
    /// injection.
    fn resolve_target(&mut self, target: &ClassTarget) -> Result<Resolved, ModuleError> {
        let blueprint = self.registry.resolve(target)?.clone();
        debug!("Requested an instance of {}", blueprint.name());

        if let Some(&index) = self.pool.get(&blueprint.type_id()) {
            debug!("Requested instance is already built and non-exclusive");
            return Ok(Resolved {
                index,
                name: blueprint.name().to_string(),
                type_name: blueprint.type_name(),
                handle: self.handle_at(index),
            });
        }

        debug!("Attempting construction of class {}", blueprint.name());
        let handle = blueprint.construct();
        let index = self.prior_count + self.new_cells.len();

        if handle.is_exclusive() {
            debug!(
                "Created instance of {} is exclusive and will not be reused",
                blueprint.name()
            );
        } else {
            self.pool.insert(blueprint.type_id(), index);
        }

        self.new_cells.push(NewCell {
            handle: handle.clone(),
            name: blueprint.name().to_string(),
            required: Vec::new(),
            optional: Vec::new(),
        });
        self.injections.push_back(index);

        Ok(Resolved {
            index,
            name: blueprint.name().to_string(),
            type_name: blueprint.type_name(),
            handle,
        })
    }
}

fn resolve_root(
    session: &Mutex<SessionInner>,
    label: &str,
    target: &ClassTarget,
) -> Result<usize, ModuleError> {
    debug!("Resolving bootstrap subject {}", label);
    let resolved = with_lock(session, |inner| inner.resolve_target(target))?;
    Ok(resolved.index)
}

impl Orchestrator {
    /// Resolve a requirement spec into live instances without setting them
    /// up.
    ///
    /// Repeated calls accumulate onto the same pool and queue, reusing
    /// non-exclusive instances constructed by earlier calls. On failure no
    /// state changes at all.
    pub fn bootstrap(&self, spec: RequirementSpec) -> Result<Bootstrapped, ModuleError> {
        let _permit = self.guard.try_engage()?;
        debug!("Bootstrapping system");

        let registry = with_lock(&self.registry, |registry| registry.clone());
        let (prior, pool) = with_lock(&self.state, |state| {
            (
                state
                    .cells
                    .iter()
                    .map(|cell| cell.handle.clone())
                    .collect::<Vec<_>>(),
                state.pool.clone(),
            )
        });
        let prior_count = prior.len();

        let session = Arc::new(Mutex::new(SessionInner {
            registry,
            prior,
            prior_count,
            pool,
            new_cells: Vec::new(),
            injections: VecDeque::new(),
        }));

        // Phase 1: resolve the root requirements in spec order.
        let mut roots = Vec::with_capacity(spec.len());
        match &spec {
            RequirementSpec::Named(entries) => {
                for (name, target) in entries {
                    roots.push(resolve_root(&session, name, target)?);
                }
            }
            RequirementSpec::Ordered(targets) => {
                for (position, target) in targets.iter().enumerate() {
                    roots.push(resolve_root(&session, &position.to_string(), target)?);
                }
            }
        }

        // Phase 2: run dependency declarations breadth-first. Declarations
        // execute outside the session lock; their injector re-enters it per
        // request.
        loop {
            let Some(index) = with_lock(&session, |inner| inner.injections.pop_front()) else {
                break;
            };
            let (handle, name) = with_lock(&session, |inner| {
                let cell = &inner.new_cells[index - inner.prior_count];
                (cell.handle.clone(), cell.name.clone())
            });

            debug!("Injecting dependencies of {}", name);
            let injector = Injector {
                session: Arc::downgrade(&session),
                cell: index,
                module_name: name,
                open: Arc::new(AtomicBool::new(true)),
            };
            let outcome = handle.declare_dependencies(&injector);
            // Close before surfacing any declaration error so stashed clones
            // are dead either way.
            injector.open.store(false, Ordering::Release);
            outcome?;
        }
        debug!("Done bootstrapping, ready to set up");

        let (prior, new_cells, pool) = with_lock(&session, |inner| {
            (
                std::mem::take(&mut inner.prior),
                std::mem::take(&mut inner.new_cells),
                std::mem::take(&mut inner.pool),
            )
        });
        drop(session);

        let result = {
            let handle_for = |index: usize| -> ModuleHandle {
                if index < prior_count {
                    prior[index].clone()
                } else {
                    new_cells[index - prior_count].handle.clone()
                }
            };
            match &spec {
                RequirementSpec::Named(entries) => {
                    let mut map = HashMap::with_capacity(entries.len());
                    for ((name, _), index) in entries.iter().zip(&roots) {
                        map.insert(name.clone(), handle_for(*index));
                    }
                    Bootstrapped::Named(map)
                }
                RequirementSpec::Ordered(_) => Bootstrapped::Ordered(
                    roots.iter().map(|&index| handle_for(index)).collect(),
                ),
            }
        };

        with_lock(&self.state, |state| {
            let start = state.cells.len();
            for (offset, cell) in new_cells.into_iter().enumerate() {
                state.queue.push(start + offset);
                state.cells.push(ModuleCell {
                    handle: cell.handle,
                    name: cell.name,
                    required: cell.required,
                    optional: cell.optional,
                });
            }
            state.pool = pool;
        });

        Ok(result)
    }
}
