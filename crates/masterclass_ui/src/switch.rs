//! Switch
//!
//! A controllable on/off toggle rendered as `role="switch"`. Click, Enter
//! and Space flip it; a disabled switch ignores all three.
//!
//! # Example
//!
//! ```
//! use masterclass_core::Document;
//! use masterclass_ui::switch::{Switch, SwitchProps};
//!
//! let doc = Document::new();
//! let switch = Switch::new(&doc, SwitchProps::default());
//!
//! switch.click();
//! assert!(switch.is_checked());
//! assert_eq!(switch.attrs().get("aria-checked"), Some("true"));
//! ```

use masterclass_core::{Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, KeyEvent};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchProps {
    /// Controlled state
    pub checked: Option<bool>,
    pub default_checked: bool,
    pub disabled: bool,
}

/// Root and control element of a switch
#[derive(Clone, Debug)]
pub struct Switch {
    element: Element,
    checked: ControllableState<bool>,
    disabled: bool,
}

impl CompoundRoot for Switch {
    const NAME: &'static str = "Switch.Root";
}

impl Switch {
    pub fn new(doc: &Document, props: SwitchProps) -> Self {
        Self {
            element: doc.create_element(),
            checked: ControllableState::new(props.checked, props.default_checked),
            disabled: props.disabled,
        }
    }

    pub fn on_checked_change<F>(self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self {
            checked: self.checked.on_change(f),
            ..self
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn sync_checked(&self, checked: Option<bool>) {
        self.checked.sync(checked);
    }

    pub fn toggle(&self) {
        if !self.disabled {
            self.checked.update(|checked| !checked);
        }
    }

    pub fn click(&self) -> EventResult {
        self.toggle();
        EventResult::handled_if(!self.disabled)
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            self.click()
        } else {
            EventResult::Ignored
        }
    }

    fn data_state(&self) -> &'static str {
        if self.is_checked() {
            "checked"
        } else {
            "unchecked"
        }
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("switch")
            .set("tabindex", if self.disabled { -1 } else { 0 })
            .bool("aria-checked", self.is_checked())
            .set_opt("aria-disabled", self.disabled.then_some("true"))
            .set("data-state", self.data_state())
            .flag("data-disabled", self.disabled)
    }

    /// The sliding thumb mirrors the root's state
    pub fn thumb_attrs(&self) -> Attributes {
        Attributes::new()
            .set("data-state", self.data_state())
            .flag("data-disabled", self.disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_core::Key;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_keyboard_toggle() {
        let doc = Document::new();
        let switch = Switch::new(&doc, SwitchProps::default());

        switch.key_down(&KeyEvent::new(Key::Space));
        assert!(switch.is_checked());
        switch.key_down(&KeyEvent::new(Key::Enter));
        assert!(!switch.is_checked());
        assert_eq!(switch.key_down(&KeyEvent::new(Key::Tab)), EventResult::Ignored);
    }

    #[test]
    fn test_disabled_never_toggles() {
        let doc = Document::new();
        let switch = Switch::new(
            &doc,
            SwitchProps {
                default_checked: true,
                disabled: true,
                ..Default::default()
            },
        );

        switch.click();
        switch.key_down(&KeyEvent::new(Key::Space));
        assert!(switch.is_checked());
        assert_eq!(switch.attrs().tab_index(), Some(-1));
        assert!(switch.thumb_attrs().has("data-disabled"));
    }

    #[test]
    fn test_controlled_false_is_respected() {
        let doc = Document::new();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        let switch = Switch::new(
            &doc,
            SwitchProps {
                checked: Some(false),
                ..Default::default()
            },
        )
        .on_checked_change(move |v| sink.lock().unwrap().push(v));

        switch.click();
        assert!(!switch.is_checked());
        assert_eq!(*changes.lock().unwrap(), vec![true]);
        assert_eq!(switch.attrs().get("data-state"), Some("unchecked"));
    }
}
