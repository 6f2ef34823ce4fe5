//! Popover
//!
//! A non-modal panel anchored to its trigger. Opening moves focus into the
//! panel but Tab is not trapped. Escape, a pointer-down outside both the
//! panel and the trigger, or the close button dismiss it and focus returns
//! to the trigger.

use std::sync::Arc;

use masterclass_core::{Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, Key, KeyEvent};
use masterclass_overlay::{Focusable, OverlayConfig, OverlayManager};

use crate::overlay_root::OverlayRoot;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopoverProps {
    pub open: Option<bool>,
    pub default_open: bool,
}

#[derive(Clone, Debug)]
pub struct Popover {
    root: OverlayRoot,
    content_id: Arc<str>,
}

impl CompoundRoot for Popover {
    const NAME: &'static str = "Popover.Root";
}

impl Popover {
    pub fn new(doc: &Document, overlays: &OverlayManager, props: PopoverProps) -> Self {
        let open = ControllableState::new(props.open, props.default_open);
        Self {
            root: OverlayRoot::new(doc, overlays, open, OverlayConfig::popover),
            content_id: doc.use_id("popover").into(),
        }
    }

    pub fn on_open_change<F>(self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.root.open_state().set_on_change(Some(Arc::new(f)));
        self
    }

    pub fn is_open(&self) -> bool {
        self.root.is_open()
    }

    pub fn sync_open(&self, open: Option<bool>) {
        self.root.sync_open(open);
    }

    pub fn trigger(&self) -> PopoverTrigger {
        PopoverTrigger { root: self.clone() }
    }

    pub fn content(&self) -> PopoverContent {
        PopoverContent { root: self.clone() }
    }

    pub fn close_button(&self) -> PopoverClose {
        PopoverClose {
            root: self.clone(),
            element: self.root.focusable(),
        }
    }

    fn data_state(&self) -> &'static str {
        self.root.state().as_str()
    }
}

#[derive(Clone, Debug)]
pub struct PopoverTrigger {
    root: Popover,
}

impl PopoverTrigger {
    pub fn element(&self) -> &Element {
        self.root.root.trigger()
    }

    /// Toggles
    pub fn click(&self) -> EventResult {
        self.root.root.toggle();
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
        let open = self.root.root.is_mounted();
        Attributes::new()
            .set("aria-haspopup", "dialog")
            .bool("aria-expanded", open)
            .set_opt("aria-controls", open.then(|| self.root.content_id.to_string()))
            .set("data-state", self.root.data_state())
    }
}

#[derive(Clone, Debug)]
pub struct PopoverContent {
    root: Popover,
}

impl PopoverContent {
    pub fn element(&self) -> Element {
        self.root.root.content()
    }

    pub fn is_rendered(&self) -> bool {
        self.root.root.is_mounted()
    }

    pub fn focusable(&self) -> Element {
        self.root.root.focusable()
    }

    pub fn register(&self, focusable: Focusable) {
        self.root.root.register(focusable);
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        match event.key {
            Key::Escape => self.root.root.escape_key(),
            _ => EventResult::Ignored,
        }
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("dialog")
            .set("id", &*self.root.content_id)
            .set("tabindex", -1)
            .set("data-state", self.root.data_state())
    }
}

#[derive(Clone, Debug)]
pub struct PopoverClose {
    root: Popover,
    element: Element,
}

impl PopoverClose {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn click(&self) -> EventResult {
        self.root.root.set_open(false);
        EventResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_overlay::{overlay_manager, OverlayManagerExt};

    fn setup() -> (Document, OverlayManager, Popover) {
        let doc = Document::new();
        let overlays = overlay_manager();
        let popover = Popover::new(&doc, &overlays, PopoverProps::default());
        (doc, overlays, popover)
    }

    #[test]
    fn test_trigger_toggles() {
        let (_, _, popover) = setup();
        let trigger = popover.trigger();
        trigger.click();
        assert!(popover.content().is_rendered());
        assert_eq!(trigger.attrs().get("aria-expanded"), Some("true"));
        trigger.click();
        assert!(!popover.content().is_rendered());
    }

    #[test]
    fn test_focus_moves_in_and_back() {
        let (doc, _, popover) = setup();
        let content = popover.content();
        let field = content.focusable();
        let trigger = popover.trigger();

        trigger.click();
        assert_eq!(doc.active_element(), Some(field.id()));

        content.key_down(&KeyEvent::new(Key::Escape));
        assert!(!popover.is_open());
        assert_eq!(doc.active_element(), Some(trigger.element().id()));
    }

    #[test]
    fn test_no_focusables_focuses_panel() {
        let (doc, _, popover) = setup();
        popover.trigger().click();
        assert_eq!(doc.active_element(), Some(popover.content().element().id()));
    }

    #[test]
    fn test_outside_pointer_closes() {
        let (doc, overlays, popover) = setup();
        let content = popover.content();
        let inside = content.focusable();
        popover.trigger().click();

        // Inside the panel and on the trigger are not outside
        assert!(!overlays.handle_pointer_down(Some(inside.id())));
        assert!(!overlays.handle_pointer_down(Some(popover.trigger().element().id())));
        assert!(popover.is_open());

        let elsewhere = doc.create_element();
        assert!(overlays.handle_pointer_down(Some(elsewhere.id())));
        assert!(!popover.is_open());
    }

    #[test]
    fn test_close_button() {
        let (_, overlays, popover) = setup();
        let close = popover.close_button();
        popover.trigger().click();
        assert!(close.element().is_focused());
        close.click();
        assert_eq!(overlays.open_count(), 0);
    }
}
