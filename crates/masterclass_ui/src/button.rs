//! Button
//!
//! Button semantics for any host element: a tab stop, `role="button"`, and
//! activation on click, Enter or Space. A disabled button keeps its tab stop
//! (`aria-disabled`, not `disabled`) so it stays discoverable, but ignores
//! activation.
//!
//! # Example
//!
//! ```
//! use masterclass_core::{Document, Key, KeyEvent};
//! use masterclass_ui::button::Button;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! let doc = Document::new();
//! let clicks = Arc::new(AtomicU32::new(0));
//! let counter = clicks.clone();
//! let button = Button::new(&doc).on_click(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! button.key_down(&KeyEvent::new(Key::Enter));
//! assert_eq!(clicks.load(Ordering::SeqCst), 1);
//! ```

use std::sync::Arc;

use masterclass_core::{Attributes, Document, Element, EventResult, KeyEvent};

use crate::Callback;

#[derive(Clone)]
pub struct Button {
    element: Element,
    disabled: bool,
    on_click: Option<Callback>,
}

impl Button {
    pub fn new(doc: &Document) -> Self {
        Self {
            element: doc.create_element(),
            disabled: false,
            on_click: None,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on_click<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(f));
        self
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn click(&self) -> EventResult {
        if self.disabled {
            return EventResult::Ignored;
        }
        if let Some(cb) = &self.on_click {
            cb();
        }
        EventResult::Handled
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            self.click()
        } else {
            EventResult::Ignored
        }
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("button")
            .set("tabindex", 0)
            .set_opt("aria-disabled", self.disabled.then_some("true"))
            .flag("data-disabled", self.disabled)
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("element", &self.element)
            .field("disabled", &self.disabled)
            .finish()
    }
}
