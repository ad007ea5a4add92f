//! Module contract
//!
//! The object-safe [`Module`] trait every composable component implements,
//! the [`ModuleCore`] capability state each implementation embeds, and the
//! [`Dep`] write-once slots modules store their injected dependencies in.

pub mod core;
pub mod dep;
pub mod traits;

pub use self::core::ModuleCore;
pub use self::dep::Dep;
pub use self::traits::{AsAnyArc, Module, ModuleHandle, ModuleHandleExt};
