//! Controlled / uncontrolled value ownership
//!
//! A primitive's value is either owned by the caller (controlled: the caller
//! passes `Some(value)` and updates it in response to `on_change`) or owned
//! internally (uncontrolled: seeded once from a default). `ControllableState`
//! hides the difference from the primitive.
//!
//! Controlledness is `value.is_some()`. `Some(false)`, `Some(0)` and
//! `Some(String::new())` are controlled values.
//!
//! # Example
//!
//! ```
//! use masterclass_core::controllable::ControllableState;
//!
//! // Uncontrolled: the state owns the value
//! let open = ControllableState::new(None, false);
//! open.set(true);
//! assert!(open.get());
//!
//! // Controlled: the caller owns it, `set` only reports the request
//! let open = ControllableState::new(Some(false), false);
//! open.set(true);
//! assert!(!open.get());
//! open.sync(Some(true)); // caller re-renders with the new value
//! assert!(open.get());
//! ```

use std::sync::{Arc, Mutex};

use crate::sync::LockExt;

/// Change callback for a controllable value
pub type OnChange<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Inner<T> {
    controlled: Option<T>,
    internal: T,
    on_change: Option<OnChange<T>>,
}

/// Shared handle to a value that may be controlled or uncontrolled
pub struct ControllableState<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for ControllableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> ControllableState<T> {
    /// `value` is the controlled prop, `default_value` seeds internal state
    pub fn new(value: Option<T>, default_value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                controlled: value,
                internal: default_value,
                on_change: None,
            })),
        }
    }

    pub fn uncontrolled(default_value: T) -> Self {
        Self::new(None, default_value)
    }

    /// Attach the change callback
    pub fn on_change<F>(self, f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.set_on_change(Some(Arc::new(f)));
        self
    }

    pub fn set_on_change(&self, on_change: Option<OnChange<T>>) {
        self.inner.locked().on_change = on_change;
    }

    pub fn is_controlled(&self) -> bool {
        self.inner.locked().controlled.is_some()
    }

    /// The resolved value: the controlled prop if present, else internal state
    pub fn get(&self) -> T {
        let inner = self.inner.locked();
        inner
            .controlled
            .clone()
            .unwrap_or_else(|| inner.internal.clone())
    }

    /// Request a new value
    ///
    /// Uncontrolled: internal state updates. Both modes: `on_change` fires
    /// exactly once with `next`, after the lock is released.
    pub fn set(&self, next: T) {
        let on_change = {
            let mut inner = self.inner.locked();
            if inner.controlled.is_none() {
                inner.internal = next.clone();
            }
            inner.on_change.clone()
        };
        if let Some(cb) = on_change {
            cb(next);
        }
    }

    /// Functional form of [`set`](Self::set)
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.get());
        self.set(next);
    }

    /// Apply a new controlled prop, as a parent re-render would
    ///
    /// `None` hands ownership back to internal state, which keeps whatever it
    /// held before control began.
    pub fn sync(&self, value: Option<T>) {
        self.inner.locked().controlled = value;
    }
}

impl<T: Clone + Send + std::fmt::Debug + 'static> std::fmt::Debug for ControllableState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.locked();
        f.debug_struct("ControllableState")
            .field("controlled", &inner.controlled)
            .field("internal", &inner.internal)
            .finish()
    }
}
