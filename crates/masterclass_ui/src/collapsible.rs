//! Collapsible
//!
//! A trigger that shows and hides one panel.

use masterclass_core::{Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, KeyEvent};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapsibleProps {
    pub open: Option<bool>,
    pub default_open: bool,
    pub disabled: bool,
}

#[derive(Clone, Debug)]
pub struct Collapsible {
    open: ControllableState<bool>,
    disabled: bool,
    trigger: Element,
    panel_id: String,
}

impl CompoundRoot for Collapsible {
    const NAME: &'static str = "Collapsible.Root";
}

impl Collapsible {
    pub fn new(doc: &Document, props: CollapsibleProps) -> Self {
        Self {
            open: ControllableState::new(props.open, props.default_open),
            disabled: props.disabled,
            trigger: doc.create_element(),
            panel_id: doc.use_id("collapsible-panel"),
        }
    }

    pub fn on_open_change<F>(self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self {
            open: self.open.on_change(f),
            ..self
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn sync_open(&self, open: Option<bool>) {
        self.open.sync(open);
    }

    pub fn toggle(&self) {
        if !self.disabled {
            self.open.update(|open| !open);
        }
    }

    pub fn trigger(&self) -> CollapsibleTrigger {
        CollapsibleTrigger { root: self.clone() }
    }

    pub fn panel(&self) -> CollapsiblePanel {
        CollapsiblePanel { root: self.clone() }
    }

    fn data_state(&self) -> &'static str {
        if self.is_open() {
            "open"
        } else {
            "closed"
        }
    }
}

#[derive(Clone, Debug)]
pub struct CollapsibleTrigger {
    root: Collapsible,
}

impl CollapsibleTrigger {
    pub fn element(&self) -> &Element {
        &self.root.trigger
    }

    pub fn click(&self) -> EventResult {
        self.root.toggle();
        EventResult::handled_if(!self.root.disabled)
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            self.click()
        } else {
            EventResult::Ignored
        }
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::new()
            .bool("aria-expanded", self.root.is_open())
            .set("aria-controls", &self.root.panel_id)
            .set("data-state", self.root.data_state())
            .flag("data-disabled", self.root.disabled)
    }
}

#[derive(Clone, Debug)]
pub struct CollapsiblePanel {
    root: Collapsible,
}

impl CollapsiblePanel {
    pub fn is_rendered(&self) -> bool {
        self.root.is_open()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::new()
            .set("id", &self.root.panel_id)
            .set("data-state", self.root.data_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_core::Key;

    #[test]
    fn test_trigger_toggles_panel() {
        let doc = Document::new();
        let collapsible = Collapsible::new(&doc, CollapsibleProps::default());
        let trigger = collapsible.trigger();
        let panel = collapsible.panel();

        assert!(!panel.is_rendered());
        assert_eq!(trigger.attrs().get("aria-expanded"), Some("false"));

        trigger.key_down(&KeyEvent::new(Key::Enter));
        assert!(panel.is_rendered());
        assert_eq!(trigger.attrs().get("aria-controls"), panel.attrs().get("id"));
        assert_eq!(panel.attrs().get("data-state"), Some("open"));
    }

    #[test]
    fn test_disabled_stays_closed() {
        let doc = Document::new();
        let collapsible = Collapsible::new(
            &doc,
            CollapsibleProps {
                disabled: true,
                ..Default::default()
            },
        );
        assert_eq!(collapsible.trigger().click(), EventResult::Ignored);
        assert!(!collapsible.is_open());
    }
}
