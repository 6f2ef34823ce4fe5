//! Focus scopes and sentinel-based focus trapping
//!
//! A [`FocusScope`] is the ordered set of focusable descendants of an
//! overlay's content element. A [`FocusTrap`] brackets that set with two
//! sentinel elements; focusing a sentinel bounces focus to the opposite end
//! of the scope, so Tab and Shift+Tab cycle inside the overlay instead of
//! escaping to the page.
//!
//! ```text
//!   [start sentinel] [item 0] [item 1] ... [item n-1] [end sentinel]
//!         |                                                 |
//!         +--> focuses item n-1          focuses item 0 <---+
//! ```

use std::sync::{Arc, Mutex};

use masterclass_core::{Attributes, Document, Element, FocusChange, FocusHandle, LockExt, NodeId, Subscription};

/// A focusable descendant and the attributes that decide its tabbability
#[derive(Clone, Debug, PartialEq)]
pub struct Focusable {
    pub element: Element,
    pub disabled: bool,
    /// Marked as the preferred initial focus target
    pub autofocus: bool,
    pub tab_index: i32,
}

impl Focusable {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            disabled: false,
            autofocus: false,
            tab_index: 0,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn autofocus(mut self, autofocus: bool) -> Self {
        self.autofocus = autofocus;
        self
    }

    pub fn tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = tab_index;
        self
    }

    /// Reachable with Tab: enabled and not `tabindex=-1`
    pub fn is_tabbable(&self) -> bool {
        !self.disabled && self.tab_index >= 0
    }
}

#[derive(Debug)]
struct ScopeInner {
    container: Element,
    items: Vec<Focusable>,
}

/// Shared, ordered set of focusable descendants of a container
#[derive(Clone, Debug)]
pub struct FocusScope {
    inner: Arc<Mutex<ScopeInner>>,
}

impl FocusScope {
    /// `container` is the content element itself, the fallback target
    pub fn new(container: Element) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScopeInner {
                container,
                items: Vec::new(),
            })),
        }
    }

    pub fn container(&self) -> Element {
        self.inner.locked().container.clone()
    }

    /// Add a descendant in render order. Re-adding replaces its attributes.
    pub fn register(&self, focusable: Focusable) {
        let mut inner = self.inner.locked();
        match inner
            .items
            .iter_mut()
            .find(|f| f.element == focusable.element)
        {
            Some(existing) => *existing = focusable,
            None => inner.items.push(focusable),
        }
    }

    pub fn unregister(&self, node: NodeId) -> bool {
        let mut inner = self.inner.locked();
        let before = inner.items.len();
        inner.items.retain(|f| f.element.id() != node);
        inner.items.len() != before
    }

    pub fn set_disabled(&self, node: NodeId, disabled: bool) {
        if let Some(item) = self
            .inner
            .locked()
            .items
            .iter_mut()
            .find(|f| f.element.id() == node)
        {
            item.disabled = disabled;
        }
    }

    /// Tabbable descendants in order
    pub fn tabbable(&self) -> Vec<Element> {
        self.inner
            .locked()
            .items
            .iter()
            .filter(|f| f.is_tabbable())
            .map(|f| f.element.clone())
            .collect()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        let inner = self.inner.locked();
        inner.container.id() == node || inner.items.iter().any(|f| f.element.id() == node)
    }

    /// All element ids in the scope, container first
    pub fn nodes(&self) -> Vec<NodeId> {
        let inner = self.inner.locked();
        std::iter::once(inner.container.id())
            .chain(inner.items.iter().map(|f| f.element.id()))
            .collect()
    }

    /// Where focus goes on open: the autofocus target, else the first
    /// tabbable descendant, else the container
    pub fn initial_target(&self) -> Element {
        let inner = self.inner.locked();
        inner
            .items
            .iter()
            .find(|f| f.autofocus && f.is_tabbable())
            .or_else(|| inner.items.iter().find(|f| f.is_tabbable()))
            .map(|f| f.element.clone())
            .unwrap_or_else(|| inner.container.clone())
    }

    pub fn first_tabbable(&self) -> Option<Element> {
        self.tabbable().into_iter().next()
    }

    pub fn last_tabbable(&self) -> Option<Element> {
        self.tabbable().into_iter().last()
    }
}

/// Which sentinel received focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sentinel {
    Start,
    End,
}

/// Active focus trap around a [`FocusScope`]
///
/// Installing the trap registers focus listeners on both sentinels;
/// dropping it removes them.
pub struct FocusTrap {
    scope: FocusScope,
    start: Element,
    end: Element,
    _listeners: [Subscription; 2],
}

impl FocusTrap {
    pub fn install(doc: &Document, scope: FocusScope) -> Self {
        let start = doc.create_element();
        let end = doc.create_element();

        let listen = |sentinel: Sentinel, element: &Element| {
            let scope = scope.clone();
            element.on_focus_change(move |change| {
                if change == FocusChange::Focused {
                    sentinel_target(&scope, sentinel).focus();
                }
            })
        };
        let listeners = [listen(Sentinel::Start, &start), listen(Sentinel::End, &end)];

        Self {
            scope,
            start,
            end,
            _listeners: listeners,
        }
    }

    pub fn scope(&self) -> &FocusScope {
        &self.scope
    }

    pub fn sentinel(&self, which: Sentinel) -> &Element {
        match which {
            Sentinel::Start => &self.start,
            Sentinel::End => &self.end,
        }
    }

    /// Attributes for a sentinel element
    pub fn sentinel_attrs(&self) -> Attributes {
        Attributes::new()
            .set("tabindex", 0)
            .bool("aria-hidden", true)
            .flag("data-focus-sentinel", true)
    }

    /// Move focus the way the browser would on Tab (or Shift+Tab)
    ///
    /// Focus moves to the next element in `[start, tabbable.., end]`. When
    /// that is a sentinel, its listener bounces focus to the other end.
    /// Returns the element that holds focus afterwards.
    pub fn tab(&self, backwards: bool) -> Option<NodeId> {
        let doc = self.start.document().clone();
        let mut order = Vec::new();
        order.push(self.start.clone());
        order.extend(self.scope.tabbable());
        order.push(self.end.clone());

        let position = doc
            .active_element()
            .and_then(|active| order.iter().position(|e| e.id() == active));

        let next = match (position, backwards) {
            (Some(i), false) => order.get(i + 1).cloned(),
            (Some(i), true) if i > 0 => order.get(i - 1).cloned(),
            (Some(_), true) => Some(self.start.clone()),
            // Focus on the container (or outside): enter from the edge
            (None, false) => order.get(1).cloned(),
            (None, true) => order.get(order.len() - 2).cloned(),
        };

        if let Some(next) = next {
            next.focus();
        }
        doc.active_element()
    }
}

fn sentinel_target(scope: &FocusScope, sentinel: Sentinel) -> Element {
    let target = match sentinel {
        Sentinel::Start => scope.last_tabbable(),
        Sentinel::End => scope.first_tabbable(),
    };
    target.unwrap_or_else(|| scope.container())
}

impl std::fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTrap")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}
