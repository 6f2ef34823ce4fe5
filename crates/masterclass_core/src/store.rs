//! External store - subscribable state that lives outside any component tree
//!
//! A store owns one value. Readers take an atomic snapshot (`Arc<T>`), writers
//! replace the value wholesale, and every write fans out to subscribers.
//! Stores are plain objects: create one per application and hand clones to
//! whoever needs it.
//!
//! # Example
//!
//! ```
//! use masterclass_core::store::ExternalStore;
//!
//! let store = ExternalStore::new(Vec::<String>::new());
//! let sub = store.subscribe(|items| println!("{} items", items.len()));
//!
//! store.dispatch(|items| items.push("hello".into()));
//! assert_eq!(store.snapshot().len(), 1);
//!
//! drop(sub); // unsubscribes
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::sync::LockExt;

/// Callback invoked with the new snapshot after every write
pub type Listener<T> = Arc<dyn Fn(&Arc<T>) + Send + Sync>;

/// Handle that removes a listener when dropped
///
/// Call [`Subscription::detach`] to keep the listener alive for the rest of
/// the store's life.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription with nothing to undo
    pub fn empty() -> Self {
        Self { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }

    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

struct StoreInner<T> {
    state: Mutex<Arc<T>>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_listener: AtomicU64,
}

/// A shared, subscribable value
pub struct ExternalStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for ExternalStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ExternalStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalStore")
            .field("value", &**self.inner.state.locked())
            .field("listeners", &self.inner.listeners.locked().len())
            .finish()
    }
}

impl<T: Default + Send + Sync + 'static> Default for ExternalStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Send + Sync + 'static> ExternalStore<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(Arc::new(initial)),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
            }),
        }
    }

    /// Current value. Consistent for as long as the caller holds it.
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.inner.state.locked())
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        let snapshot = Arc::new(value);
        *self.inner.state.locked() = Arc::clone(&snapshot);
        self.notify(&snapshot);
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.locked().len()
    }

    /// Subscribe to writes. The listener is not called for the current value.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .locked()
            .push((id, Arc::new(listener)));

        let weak: Weak<StoreInner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.locked().retain(|(lid, _)| *lid != id);
            }
        })
    }

    fn notify(&self, snapshot: &Arc<T>) {
        // Listeners may write back into the store, so call them unlocked
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .locked()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ExternalStore<T> {
    /// Mutate a copy of the current value, publish it, and notify subscribers
    pub fn dispatch<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.dispatch_with(|value| {
            f(value);
            true
        });
    }

    /// Like [`dispatch`](Self::dispatch), but the closure decides whether the
    /// write happened. Returning false publishes nothing and notifies no one.
    pub fn dispatch_with<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let snapshot = {
            let mut state = self.inner.state.locked();
            let mut next = T::clone(&state);
            if !f(&mut next) {
                return false;
            }
            let snapshot = Arc::new(next);
            *state = Arc::clone(&snapshot);
            snapshot
        };
        self.notify(&snapshot);
        true
    }
}
