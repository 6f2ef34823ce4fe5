//! Host document
//!
//! The [`Document`] is the headless stand-in for the page a primitive lives
//! in. It owns exactly the pieces of global UI state the primitives rely on:
//!
//! - **Focus**: which element is active, plus focus/blur listeners per element
//! - **Ids**: unique, stable ids for ARIA references (`aria-controls`, ...)
//!
//! Elements are opaque [`NodeId`]s wrapped in an [`Element`] handle that
//! implements [`FocusHandle`](crate::focus::FocusHandle).

use std::sync::{Arc, Mutex, Weak};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::focus::FocusHandle;
use crate::store::Subscription;
use crate::sync::LockExt;

/// Opaque element identity within a [`Document`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// What happened to an element's focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusChange {
    Focused,
    Blurred,
}

/// Called when the element it was registered on gains or loses focus
pub type FocusListener = Arc<dyn Fn(FocusChange) + Send + Sync>;

type ListenerList = SmallVec<[(u64, FocusListener); 2]>;

#[derive(Default)]
struct DocumentInner {
    next_node: u64,
    next_listener: u64,
    next_id: u64,
    active: Option<NodeId>,
    listeners: FxHashMap<NodeId, ListenerList>,
    history: Vec<NodeId>,
}

impl DocumentInner {
    fn listeners_for(&self, node: NodeId) -> Vec<FocusListener> {
        self.listeners
            .get(&node)
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }
}

/// Shared handle to the host document
#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<Mutex<DocumentInner>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.locked();
        f.debug_struct("Document")
            .field("nodes", &inner.next_node)
            .field("active", &inner.active)
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new element in this document
    pub fn create_element(&self) -> Element {
        let id = {
            let mut inner = self.inner.locked();
            inner.next_node += 1;
            NodeId(inner.next_node)
        };
        Element {
            id,
            doc: self.clone(),
        }
    }

    /// Generate a document-unique id with the given prefix, e.g. `menu-3`
    pub fn use_id(&self, prefix: &str) -> String {
        let mut inner = self.inner.locked();
        inner.next_id += 1;
        format!("{}-{}", prefix, inner.next_id)
    }

    /// The element that currently has focus
    pub fn active_element(&self) -> Option<NodeId> {
        self.inner.locked().active
    }

    pub fn has_focus(&self, node: NodeId) -> bool {
        self.active_element() == Some(node)
    }

    /// Every element that received focus, oldest first
    pub fn focus_history(&self) -> Vec<NodeId> {
        self.inner.locked().history.clone()
    }

    /// Move focus to `node`, firing blur on the old element then focus on the new
    ///
    /// Focusing the already-active element is a no-op.
    pub fn focus(&self, node: NodeId) {
        let (blurred, focused) = {
            let mut inner = self.inner.locked();
            if inner.active == Some(node) {
                return;
            }
            let previous = inner.active.replace(node);
            inner.history.push(node);
            let blurred = previous
                .map(|prev| inner.listeners_for(prev))
                .unwrap_or_default();
            (blurred, inner.listeners_for(node))
        };
        trace!(node = node.0, "focus");

        // Listeners re-enter primitives, which may focus again
        for listener in blurred {
            listener(FocusChange::Blurred);
        }
        for listener in focused {
            listener(FocusChange::Focused);
        }
    }

    /// Clear focus, firing blur on the active element
    pub fn blur(&self) {
        let blurred = {
            let mut inner = self.inner.locked();
            match inner.active.take() {
                Some(prev) => inner.listeners_for(prev),
                None => return,
            }
        };
        for listener in blurred {
            listener(FocusChange::Blurred);
        }
    }

    /// Listen for focus changes on a single element
    pub fn on_focus_change<F>(&self, node: NodeId, listener: F) -> Subscription
    where
        F: Fn(FocusChange) + Send + Sync + 'static,
    {
        let id = {
            let mut inner = self.inner.locked();
            inner.next_listener += 1;
            let id = inner.next_listener;
            inner
                .listeners
                .entry(node)
                .or_default()
                .push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<DocumentInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.locked();
                if let Some(list) = inner.listeners.get_mut(&node) {
                    list.retain(|(lid, _)| *lid != id);
                    if list.is_empty() {
                        inner.listeners.remove(&node);
                    }
                }
            }
        })
    }

    /// Number of elements with at least one focus listener
    pub fn listened_elements(&self) -> usize {
        self.inner.locked().listeners.len()
    }
}

/// Handle to a focusable element
#[derive(Clone)]
pub struct Element {
    id: NodeId,
    doc: Document,
}

impl Element {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn is_focused(&self) -> bool {
        self.doc.has_focus(self.id)
    }

    /// Blur this element if it is the active one
    pub fn blur(&self) {
        if self.is_focused() {
            self.doc.blur();
        }
    }

    pub fn on_focus_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(FocusChange) + Send + Sync + 'static,
    {
        self.doc.on_focus_change(self.id, listener)
    }
}

impl FocusHandle for Element {
    fn focus(&self) {
        self.doc.focus(self.id);
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.doc.inner, &other.doc.inner)
    }
}

impl Eq for Element {}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Element").field(&self.id.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_focus_moves_and_fires_listeners() {
        let doc = Document::new();
        let a = doc.create_element();
        let b = doc.create_element();

        let blurs = Arc::new(AtomicUsize::new(0));
        let focuses = Arc::new(AtomicUsize::new(0));
        let _sa = a.on_focus_change({
            let blurs = blurs.clone();
            move |change| {
                if change == FocusChange::Blurred {
                    blurs.fetch_add(1, Ordering::SeqCst);
                }
            }
        });
        let _sb = b.on_focus_change({
            let focuses = focuses.clone();
            move |change| {
                if change == FocusChange::Focused {
                    focuses.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        a.focus();
        b.focus();
        // Re-focusing the active element does nothing
        b.focus();

        assert!(b.is_focused());
        assert_eq!(blurs.load(Ordering::SeqCst), 1);
        assert_eq!(focuses.load(Ordering::SeqCst), 1);
        assert_eq!(doc.focus_history(), vec![a.id(), b.id()]);
    }

    #[test]
    fn test_subscription_drop_removes_listener() {
        let doc = Document::new();
        let a = doc.create_element();
        let sub = a.on_focus_change(|_| {});
        assert_eq!(doc.listened_elements(), 1);
        drop(sub);
        assert_eq!(doc.listened_elements(), 0);
    }

    #[test]
    fn test_listener_may_refocus() {
        let doc = Document::new();
        let a = doc.create_element();
        let b = doc.create_element();
        let _redirect = a.on_focus_change({
            let b = b.clone();
            move |change| {
                if change == FocusChange::Focused {
                    b.focus();
                }
            }
        });

        a.focus();
        assert!(b.is_focused());
    }

    #[test]
    fn test_use_id_is_unique() {
        let doc = Document::new();
        assert_ne!(doc.use_id("menu"), doc.use_id("menu"));
        assert!(doc.use_id("tab").starts_with("tab-"));
    }
}
