//! Dialog
//!
//! A modal window mounted in the overlay layer. While open:
//!
//! - focus starts on the autofocus descendant, else the first tabbable
//!   descendant, else the content itself
//! - Tab and Shift+Tab cycle inside the content through sentinel elements
//! - Escape, a backdrop click or a close button closes it
//!
//! Closing returns focus to the trigger. The parts defined here are shared
//! with [`AlertDialog`](crate::alert_dialog::AlertDialog), which differs only
//! in what is allowed to close it.
//!
//! # Example
//!
//! ```
//! use masterclass_core::{Document, Key, KeyEvent};
//! use masterclass_overlay::overlay_manager;
//! use masterclass_ui::dialog::{Dialog, DialogProps};
//!
//! let doc = Document::new();
//! let overlays = overlay_manager();
//! let dialog = Dialog::new(&doc, &overlays, DialogProps::default());
//! let trigger = dialog.trigger();
//! let content = dialog.content();
//! let close = dialog.close_button();
//!
//! trigger.click();
//! assert!(close.element().is_focused());
//!
//! content.key_down(&KeyEvent::new(Key::Escape));
//! assert!(!dialog.is_open());
//! assert!(trigger.element().is_focused());
//! ```

use std::sync::Arc;

use masterclass_core::{
    Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, Key, KeyEvent,
};
use masterclass_overlay::{DismissReason, Focusable, OverlayConfig, OverlayManager, OverlayState, Sentinel};

use crate::overlay_root::OverlayRoot;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DialogProps {
    /// Controlled open state
    pub open: Option<bool>,
    pub default_open: bool,
}

#[derive(Debug)]
struct DialogIds {
    content: String,
    title: String,
    description: String,
}

/// State shared by every dialog part
#[derive(Clone, Debug)]
pub(crate) struct DialogCore {
    pub(crate) root: OverlayRoot,
    ids: Arc<DialogIds>,
    role: &'static str,
}

impl DialogCore {
    pub(crate) fn new(
        doc: &Document,
        overlays: &OverlayManager,
        props: DialogProps,
        config: OverlayConfig,
        role: &'static str,
    ) -> Self {
        let ids = Arc::new(DialogIds {
            content: doc.use_id(role),
            title: doc.use_id("dialog-title"),
            description: doc.use_id("dialog-description"),
        });
        let open = ControllableState::new(props.open, props.default_open);
        Self {
            root: OverlayRoot::new(doc, overlays, open, |_| config),
            ids,
            role,
        }
    }

    pub(crate) fn set_on_open_change<F>(&self, f: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.root.open_state().set_on_change(Some(Arc::new(f)));
    }

    fn data_state(&self) -> &'static str {
        self.root.state().as_str()
    }

    pub(crate) fn trigger(&self) -> DialogTrigger {
        DialogTrigger { core: self.clone() }
    }

    pub(crate) fn content(&self) -> DialogContent {
        DialogContent { core: self.clone() }
    }

    pub(crate) fn backdrop(&self) -> DialogBackdrop {
        DialogBackdrop { core: self.clone() }
    }

    pub(crate) fn title(&self) -> DialogTitle {
        DialogTitle { core: self.clone() }
    }

    pub(crate) fn description(&self) -> DialogDescription {
        DialogDescription { core: self.clone() }
    }

    /// A button inside the content that closes the dialog
    pub(crate) fn close_button(&self) -> Element {
        self.root.focusable()
    }
}

#[derive(Clone, Debug)]
pub struct Dialog {
    core: DialogCore,
}

impl CompoundRoot for Dialog {
    const NAME: &'static str = "Dialog.Root";
}

impl Dialog {
    pub fn new(doc: &Document, overlays: &OverlayManager, props: DialogProps) -> Self {
        Self {
            core: DialogCore::new(doc, overlays, props, OverlayConfig::dialog(), "dialog"),
        }
    }

    pub fn on_open_change<F>(self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.core.set_on_open_change(f);
        self
    }

    pub fn is_open(&self) -> bool {
        self.core.root.is_open()
    }

    pub fn state(&self) -> OverlayState {
        self.core.root.state()
    }

    pub fn open(&self) {
        self.core.root.set_open(true);
    }

    pub fn close(&self) {
        self.core.root.set_open(false);
    }

    /// Apply a new controlled `open` prop
    pub fn sync_open(&self, open: Option<bool>) {
        self.core.root.sync_open(open);
    }

    pub fn trigger(&self) -> DialogTrigger {
        self.core.trigger()
    }

    pub fn content(&self) -> DialogContent {
        self.core.content()
    }

    pub fn backdrop(&self) -> DialogBackdrop {
        self.core.backdrop()
    }

    pub fn title(&self) -> DialogTitle {
        self.core.title()
    }

    pub fn description(&self) -> DialogDescription {
        self.core.description()
    }

    /// Register a close button as the next focusable descendant
    pub fn close_button(&self) -> DialogClose {
        DialogClose {
            core: self.core.clone(),
            element: self.core.close_button(),
        }
    }
}

/// Opens the dialog
#[derive(Clone, Debug)]
pub struct DialogTrigger {
    core: DialogCore,
}

impl DialogTrigger {
    pub fn element(&self) -> &Element {
        self.core.root.trigger()
    }

    pub fn click(&self) -> EventResult {
        self.core.root.set_open(true);
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
        let open = self.core.root.is_mounted();
        Attributes::new()
            .set("aria-haspopup", "dialog")
            .bool("aria-expanded", open)
            .set_opt("aria-controls", open.then(|| self.core.ids.content.clone()))
            .set("data-state", self.core.data_state())
    }
}

/// The dialog window
#[derive(Clone, Debug)]
pub struct DialogContent {
    core: DialogCore,
}

impl DialogContent {
    pub fn element(&self) -> Element {
        self.core.root.content()
    }

    pub fn is_rendered(&self) -> bool {
        self.core.root.is_mounted()
    }

    /// Id of the portal container while mounted
    pub fn portal_id(&self) -> Option<String> {
        self.core.root.portal_id()
    }

    /// Create a focusable descendant, in render order
    pub fn focusable(&self) -> Element {
        self.core.root.focusable()
    }

    /// Register a descendant with explicit focus attributes
    pub fn register(&self, focusable: Focusable) {
        self.core.root.register(focusable);
    }

    /// Sentinel element while the focus trap is installed
    pub fn sentinel(&self, which: Sentinel) -> Option<Element> {
        self.core.root.sentinel(which)
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        match event.key {
            Key::Escape => self.core.root.escape_key(),
            Key::Tab => self.core.root.tab_key(event.modifiers.shift),
            _ => EventResult::Ignored,
        }
    }

    pub fn attrs(&self) -> Attributes {
        let ids = &self.core.ids;
        Attributes::with_role(self.core.role)
            .set("id", &ids.content)
            .set("aria-modal", "true")
            .set("aria-labelledby", &ids.title)
            .set("aria-describedby", &ids.description)
            .set("tabindex", -1)
            .set("data-state", self.core.data_state())
    }
}

/// The dimmed layer behind the content
#[derive(Clone, Debug)]
pub struct DialogBackdrop {
    core: DialogCore,
}

impl DialogBackdrop {
    pub fn is_rendered(&self) -> bool {
        self.core.root.is_mounted()
    }

    pub fn click(&self) -> EventResult {
        if !self.core.root.is_mounted() {
            return EventResult::Ignored;
        }
        EventResult::handled_if(self.core.root.dismiss(DismissReason::BackdropClick))
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::new()
            .set("aria-hidden", "true")
            .set("data-state", self.core.data_state())
    }
}

#[derive(Clone, Debug)]
pub struct DialogTitle {
    core: DialogCore,
}

impl DialogTitle {
    pub fn attrs(&self) -> Attributes {
        Attributes::new().set("id", &self.core.ids.title)
    }
}

#[derive(Clone, Debug)]
pub struct DialogDescription {
    core: DialogCore,
}

impl DialogDescription {
    pub fn attrs(&self) -> Attributes {
        Attributes::new().set("id", &self.core.ids.description)
    }
}

/// Closes the dialog
#[derive(Clone, Debug)]
pub struct DialogClose {
    core: DialogCore,
    element: Element,
}

impl DialogClose {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn click(&self) -> EventResult {
        self.core.root.set_open(false);
        EventResult::Handled
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            self.click()
        } else {
            EventResult::Ignored
        }
    }
}
