//! Lock helpers
//!
//! Primitive state lives behind `Arc<Mutex<..>>` so handles can be cloned into
//! callbacks. A poisoned lock only means a user callback panicked while some
//! other frame held the guard; the state itself is still consistent, so the
//! guard is recovered instead of propagating the panic.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub trait LockExt<T> {
    /// Lock, recovering the guard if the mutex was poisoned
    fn locked(&self) -> MutexGuard<'_, T>;
}

impl<T> LockExt<T> for Mutex<T> {
    fn locked(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
