//! Toolbar
//!
//! The bare roving-tabindex navigator: one tab stop, arrow keys move it,
//! and there is no notion of selection. The tab stop follows focus however
//! it arrives (keyboard, pointer or programmatic).

use std::sync::{Arc, Mutex, Weak};

use masterclass_core::{
    Attributes, Document, Element, EventResult, FocusChange, FocusHandle, KeyEvent, LockExt,
    RovingFocus, RovingOptions, Subscription,
};

#[derive(Debug)]
struct ToolbarInner {
    roving: RovingFocus<Element>,
    listeners: Vec<Subscription>,
}

#[derive(Clone, Debug)]
pub struct Toolbar {
    doc: Document,
    inner: Arc<Mutex<ToolbarInner>>,
}

impl Toolbar {
    pub fn new(doc: &Document, options: RovingOptions) -> Self {
        Self {
            doc: doc.clone(),
            inner: Arc::new(Mutex::new(ToolbarInner {
                roving: RovingFocus::new(options),
                listeners: Vec::new(),
            })),
        }
    }

    pub fn options(&self) -> RovingOptions {
        self.inner.locked().roving.options()
    }

    /// Register the next item in render order
    pub fn item(&self) -> ToolbarItem {
        let element = self.doc.create_element();
        let weak: Weak<Mutex<ToolbarInner>> = Arc::downgrade(&self.inner);
        let target = element.clone();
        let listener = element.on_focus_change(move |change| {
            if change != FocusChange::Focused {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.locked().roving.set_active_handle(&target);
            }
        });

        let mut inner = self.inner.locked();
        inner.roving.register(element.clone());
        inner.listeners.push(listener);
        ToolbarItem {
            root: self.clone(),
            element,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.locked().roving.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_index(&self) -> usize {
        self.inner.locked().roving.active_index()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("toolbar")
            .set("aria-orientation", self.options().orientation.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct ToolbarItem {
    root: Toolbar,
    element: Element,
}

impl ToolbarItem {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        let target = {
            let mut inner = self.root.inner.locked();
            if let Some(index) = inner.roving.index_of(&self.element) {
                inner.roving.set_active(index);
            }
            inner.roving.navigate(event)
        };
        match target {
            Some((_, element)) => {
                element.focus();
                EventResult::Handled
            }
            None => EventResult::Ignored,
        }
    }

    pub fn attrs(&self) -> Attributes {
        let inner = self.root.inner.locked();
        let tab_index = inner
            .roving
            .index_of(&self.element)
            .map_or(-1, |index| inner.roving.tab_index(index));
        Attributes::new().set("tabindex", tab_index)
    }
}
