//! modwire - In-process module composition
//!
//! This crate wires an application together out of module classes at
//! runtime: a registry of constructible classes, a bootstrapper that lets
//! every instance declare its own dependencies while being built, a staged
//! async lifecycle (setup, post-setup, teardown) scheduled off the observed
//! dependency graph, and a reentrancy guard that turns overlapping
//! lifecycle calls into immediate errors instead of deadlocks.
//!
//! ## How composition runs
//!
//! 1. **Register** module classes ([`Blueprint`]s) with an [`Orchestrator`].
//! 2. **Bootstrap** a [`RequirementSpec`]: roots are resolved, each new
//!    instance's [`Module::declare_dependencies`] runs once with an
//!    [`Injector`], and the dependency graph is recorded as it is
//!    discovered. Non-exclusive instances are shared through a pool;
//!    exclusive ones are constructed per request.
//! 3. **Setup** runs every instance's `setup` after its required
//!    dependencies, detecting required cycles; `post_setup` follows once
//!    everything converged.
//! 4. **Teardown** unwinds in exactly the reverse of the realized setup
//!    order.
//!
//! ## Design principles
//!
//! 1. **Composition over inheritance**: modules embed a [`ModuleCore`] and
//!    implement the [`Module`] trait; there is no base-class hierarchy.
//! 2. **No global state**: every orchestrator carries its own registry and
//!    pool.
//! 3. **Runtime-agnostic core**: resolution is synchronous; lifecycle
//!    futures run on whatever executor the embedder drives them with.
//!
//! ## Example
//! ```rust
//! use modwire::{Module, ModuleCore, Dep, Injector, ModuleError, Orchestrator, RequirementSpec};
//!
//! #[derive(Default)]
//! struct Database {
//!     core: ModuleCore,
//! }
//!
//! impl Module for Database {
//!     fn core(&self) -> &ModuleCore {
//!         &self.core
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Api {
//!     core: ModuleCore,
//!     db: Dep<Database>,
//! }
//!
//! impl Module for Api {
//!     fn core(&self) -> &ModuleCore {
//!         &self.core
//!     }
//!
//!     fn declare_dependencies(&self, injector: &Injector) -> Result<(), ModuleError> {
//!         self.db.fill(injector.request::<Database>()?);
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() -> Result<(), ModuleError> {
//! let system = Orchestrator::new();
//! system.register::<Database>()?;
//! system.register::<Api>()?;
//!
//! let state = system.bootstrap(RequirementSpec::named([("api", "Api")]))?;
//! system.setup().await?;
//!
//! let api = state.get_as::<Api>("api").expect("api was bootstrapped");
//! assert!(api.db.get().was_set_up());
//!
//! system.teardown().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod guard;
pub mod module;
pub mod orchestrator;
pub mod quickstrap;
pub mod registry;
pub mod utils;

pub use error::{ConvergenceError, ModuleError, StuckModule};
pub use guard::{OperationGuard, OperationPermit};
pub use module::{AsAnyArc, Dep, Module, ModuleCore, ModuleHandle, ModuleHandleExt};
pub use orchestrator::{Bootstrapped, Injector, ModuleInfo, Orchestrator, RequirementSpec};
pub use quickstrap::quickstrap;
pub use registry::{Blueprint, ClassRegistry, ClassTarget};
