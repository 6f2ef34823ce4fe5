//! Checkbox
//!
//! A tri-state checkbox. Toggling an indeterminate box always lands on
//! checked; it never returns to indeterminate through user input.

use masterclass_core::{Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, KeyEvent};

/// Checked state of a checkbox
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CheckedState {
    Checked,
    #[default]
    Unchecked,
    /// Partially checked, e.g. a parent of mixed children
    Indeterminate,
}

impl CheckedState {
    /// State after one user toggle
    pub fn toggled(self) -> Self {
        match self {
            CheckedState::Checked => CheckedState::Unchecked,
            CheckedState::Unchecked | CheckedState::Indeterminate => CheckedState::Checked,
        }
    }

    /// Value for `aria-checked`
    pub fn aria_checked(self) -> &'static str {
        match self {
            CheckedState::Checked => "true",
            CheckedState::Unchecked => "false",
            CheckedState::Indeterminate => "mixed",
        }
    }

    /// Value for `data-state`
    pub fn as_str(self) -> &'static str {
        match self {
            CheckedState::Checked => "checked",
            CheckedState::Unchecked => "unchecked",
            CheckedState::Indeterminate => "indeterminate",
        }
    }
}

impl From<bool> for CheckedState {
    fn from(checked: bool) -> Self {
        if checked {
            CheckedState::Checked
        } else {
            CheckedState::Unchecked
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckboxProps {
    pub checked: Option<CheckedState>,
    pub default_checked: CheckedState,
    pub disabled: bool,
}

#[derive(Clone, Debug)]
pub struct Checkbox {
    element: Element,
    checked: ControllableState<CheckedState>,
    disabled: bool,
}

impl CompoundRoot for Checkbox {
    const NAME: &'static str = "Checkbox.Root";
}

impl Checkbox {
    pub fn new(doc: &Document, props: CheckboxProps) -> Self {
        Self {
            element: doc.create_element(),
            checked: ControllableState::new(props.checked, props.default_checked),
            disabled: props.disabled,
        }
    }

    pub fn on_checked_change<F>(self, f: F) -> Self
    where
        F: Fn(CheckedState) + Send + Sync + 'static,
    {
        Self {
            checked: self.checked.on_change(f),
            ..self
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn state(&self) -> CheckedState {
        self.checked.get()
    }

    pub fn sync_checked(&self, checked: Option<CheckedState>) {
        self.checked.sync(checked);
    }

    pub fn click(&self) -> EventResult {
        if self.disabled {
            return EventResult::Ignored;
        }
        self.checked.update(|state| state.toggled());
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
        let state = self.state();
        Attributes::with_role("checkbox")
            .set("tabindex", if self.disabled { -1 } else { 0 })
            .set("aria-checked", state.aria_checked())
            .set_opt("aria-disabled", self.disabled.then_some("true"))
            .set("data-state", state.as_str())
            .flag("data-disabled", self.disabled)
    }

    /// The check mark renders for checked and indeterminate states
    pub fn indicator_visible(&self) -> bool {
        self.state() != CheckedState::Unchecked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_core::Key;
    use proptest::prelude::*;

    fn any_state() -> impl Strategy<Value = CheckedState> {
        prop_oneof![
            Just(CheckedState::Checked),
            Just(CheckedState::Unchecked),
            Just(CheckedState::Indeterminate),
        ]
    }

    #[test]
    fn test_indeterminate_click_checks() {
        let doc = Document::new();
        let checkbox = Checkbox::new(
            &doc,
            CheckboxProps {
                default_checked: CheckedState::Indeterminate,
                ..Default::default()
            },
        );
        assert_eq!(checkbox.attrs().get("aria-checked"), Some("mixed"));

        checkbox.key_down(&KeyEvent::new(Key::Space));
        assert_eq!(checkbox.state(), CheckedState::Checked);
        assert_eq!(checkbox.attrs().get("aria-checked"), Some("true"));

        checkbox.click();
        assert_eq!(checkbox.state(), CheckedState::Unchecked);
        assert!(!checkbox.indicator_visible());
    }

    #[test]
    fn test_disabled() {
        let doc = Document::new();
        let checkbox = Checkbox::new(
            &doc,
            CheckboxProps {
                disabled: true,
                ..Default::default()
            },
        );
        assert_eq!(checkbox.click(), EventResult::Ignored);
        assert_eq!(checkbox.state(), CheckedState::Unchecked);
    }

    proptest! {
        #[test]
        fn test_toggle_never_yields_indeterminate(start in any_state(), clicks in 1usize..8) {
            let mut state = start;
            for _ in 0..clicks {
                state = state.toggled();
                prop_assert_ne!(state, CheckedState::Indeterminate);
            }
        }

        #[test]
        fn test_aria_mapping(state in any_state()) {
            let expected = match state {
                CheckedState::Checked => "true",
                CheckedState::Unchecked => "false",
                CheckedState::Indeterminate => "mixed",
            };
            prop_assert_eq!(state.aria_checked(), expected);
        }
    }
}
