//! Focus registry
//!
//! Keyboard navigation in compound primitives needs an ordered list of the
//! items it can move between. Items register as they mount and unregister
//! when they go away; registration order is render order.

use std::fmt;

/// Anything that can receive keyboard focus
pub trait FocusHandle: Send + Sync {
    fn focus(&self);
}

/// Ordered collection of focusable handles
pub trait FocusableRegistry {
    type Handle: FocusHandle;

    /// Add a handle, returning its index. Registering twice keeps the first slot.
    fn register(&mut self, handle: Self::Handle) -> usize;

    /// Remove a handle. Returns false if it was never registered.
    fn unregister(&mut self, handle: &Self::Handle) -> bool;

    /// Focus the handle at `index`. No-op (returns false) when out of range.
    fn focus_at(&self, index: usize) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `Vec`-backed [`FocusableRegistry`]
#[derive(Clone)]
pub struct FocusRegistry<H> {
    handles: Vec<H>,
}

impl<H> Default for FocusRegistry<H> {
    fn default() -> Self {
        Self {
            handles: Vec::new(),
        }
    }
}

impl<H: fmt::Debug> fmt::Debug for FocusRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.handles).finish()
    }
}

impl<H: FocusHandle + PartialEq> FocusRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_of(&self, handle: &H) -> Option<usize> {
        self.handles.iter().position(|h| h == handle)
    }

    pub fn get(&self, index: usize) -> Option<&H> {
        self.handles.get(index)
    }

    pub fn first(&self) -> Option<&H> {
        self.handles.first()
    }

    pub fn last(&self) -> Option<&H> {
        self.handles.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.handles.iter()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

impl<H: FocusHandle + PartialEq> FocusableRegistry for FocusRegistry<H> {
    type Handle = H;

    fn register(&mut self, handle: H) -> usize {
        match self.index_of(&handle) {
            Some(index) => index,
            None => {
                self.handles.push(handle);
                self.handles.len() - 1
            }
        }
    }

    fn unregister(&mut self, handle: &H) -> bool {
        match self.index_of(handle) {
            Some(index) => {
                self.handles.remove(index);
                true
            }
            None => false,
        }
    }

    fn focus_at(&self, index: usize) -> bool {
        match self.handles.get(index) {
            Some(handle) => {
                handle.focus();
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_register_is_idempotent() {
        let doc = Document::new();
        let a = doc.create_element();
        let b = doc.create_element();

        let mut registry = FocusRegistry::new();
        assert_eq!(registry.register(a.clone()), 0);
        assert_eq!(registry.register(b.clone()), 1);
        assert_eq!(registry.register(a.clone()), 0);
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(&a));
        assert!(!registry.unregister(&a));
        assert_eq!(registry.index_of(&b), Some(0));
    }

    #[test]
    fn test_focus_at() {
        let doc = Document::new();
        let mut registry = FocusRegistry::new();
        let a = doc.create_element();
        registry.register(a.clone());

        assert!(registry.focus_at(0));
        assert!(a.is_focused());

        // Out of range is a silent no-op
        assert!(!registry.focus_at(3));
        assert!(a.is_focused());

        let empty: FocusRegistry<crate::document::Element> = FocusRegistry::new();
        assert!(!empty.focus_at(0));
    }
}
