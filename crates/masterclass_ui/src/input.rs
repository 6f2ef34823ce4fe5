//! Text input
//!
//! A controllable text value plus the state flags a styled input needs:
//! `data-focused` follows document focus, `data-invalid` mirrors the
//! `invalid` prop, and a disabled input ignores edits.

use masterclass_core::{Attributes, ControllableState, Document, Element, EventResult};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputProps {
    /// Controlled value
    pub value: Option<String>,
    pub default_value: String,
    pub disabled: bool,
    pub invalid: bool,
    pub placeholder: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Input {
    element: Element,
    value: ControllableState<String>,
    disabled: bool,
    invalid: bool,
    placeholder: Option<String>,
}

impl Input {
    pub fn new(doc: &Document, props: InputProps) -> Self {
        Self {
            element: doc.create_element(),
            value: ControllableState::new(props.value, props.default_value),
            disabled: props.disabled,
            invalid: props.invalid,
            placeholder: props.placeholder,
        }
    }

    pub fn on_value_change<F>(self, f: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            value: self.value.on_change(f),
            ..self
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn value(&self) -> String {
        self.value.get()
    }

    /// Apply a new controlled value
    pub fn sync_value(&self, value: Option<String>) {
        self.value.sync(value);
    }

    pub fn set_invalid(&mut self, invalid: bool) {
        self.invalid = invalid;
    }

    /// The user edited the text
    pub fn change(&self, text: impl Into<String>) -> EventResult {
        if self.disabled {
            return EventResult::Ignored;
        }
        self.value.set(text.into());
        EventResult::Handled
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::new()
            .set("value", self.value.get())
            .set_opt("placeholder", self.placeholder.as_deref())
            .set_opt("aria-invalid", self.invalid.then_some("true"))
            .flag("disabled", self.disabled)
            .flag("data-disabled", self.disabled)
            .flag("data-focused", self.element.is_focused())
            .flag("data-invalid", self.invalid)
    }
}
