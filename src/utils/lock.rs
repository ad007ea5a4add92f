//! Lock utilities
//!
//! Provides a helper for the short-section mutex pattern with automatic
//! release and poison recovery.

use std::sync::{Mutex, PoisonError};

/// Execute a closure with a Mutex lock, automatically releasing it.
///
/// Recovers from poisoning: a panic inside an earlier critical section (for
/// example from a misbehaving module implementation) must not wedge the
/// orchestrator, which still needs to run teardown over whatever state is
/// left.
///
/// # Example
/// ```rust
/// use std::sync::Mutex;
/// use modwire::utils::with_lock;
///
/// let counter = Mutex::new(0);
/// let value = with_lock(&counter, |n| {
///     *n += 1;
///     *n
/// });
/// assert_eq!(value, 1);
/// ```
pub fn with_lock<T, F, R>(mutex: &Mutex<T>, f: F) -> R
where
    F: FnOnce(&mut T) -> R,
{
    let mut guard = mutex.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}
