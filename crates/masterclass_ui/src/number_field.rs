//! Number field
//!
//! A spinbutton with increment and decrement controls. Every accepted
//! value is snapped onto the step grid and clamped into range.
//!
//! | Key              | Effect                      |
//! |------------------|-----------------------------|
//! | ArrowUp / Down   | one step                    |
//! | PageUp / Down    | ten steps                   |
//! | Home / End       | min / max, when finite      |
//!
//! Both bounds default to infinity. Without a finite `min` the grid is
//! anchored at zero.

use masterclass_core::{
    Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, Key, KeyEvent,
    NumericRange, PrimitiveError,
};
use tracing::trace;

/// PageUp/PageDown move this many steps
const PAGE_STEPS: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberFieldProps {
    pub value: Option<f64>,
    pub default_value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub disabled: bool,
}

impl Default for NumberFieldProps {
    fn default() -> Self {
        Self {
            value: None,
            default_value: 0.0,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            step: 1.0,
            disabled: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NumberField {
    value: ControllableState<f64>,
    range: NumericRange,
    disabled: bool,
    input: Element,
}

impl CompoundRoot for NumberField {
    const NAME: &'static str = "NumberField.Root";
}

impl NumberField {
    pub fn new(doc: &Document, props: NumberFieldProps) -> Result<Self, PrimitiveError> {
        Ok(Self {
            value: ControllableState::new(props.value, props.default_value),
            range: NumericRange::new(props.min, props.max, props.step)?,
            disabled: props.disabled,
            input: doc.create_element(),
        })
    }

    pub fn on_value_change<F>(self, f: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        Self {
            value: self.value.on_change(f),
            ..self
        }
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn range(&self) -> NumericRange {
        self.range
    }

    pub fn sync_value(&self, value: Option<f64>) {
        self.value.sync(value);
    }

    /// Request `raw`; the stored value is its snapped form
    pub fn set_value(&self, raw: f64) {
        if self.disabled {
            return;
        }
        let next = self.range.snap(raw);
        trace!(raw, next, "number field value");
        self.value.set(next);
    }

    /// Jump to a bound without snapping, so an off-grid `max` is reachable
    fn set_bound(&self, bound: f64) {
        if self.disabled {
            return;
        }
        trace!(bound, "number field bound");
        self.value.set(bound);
    }

    pub fn step_by(&self, count: i32) {
        self.set_value(self.range.step_by(self.value(), count));
    }

    pub fn input(&self) -> NumberFieldInput {
        NumberFieldInput { root: self.clone() }
    }

    pub fn increment(&self) -> NumberFieldStepper {
        NumberFieldStepper {
            root: self.clone(),
            direction: 1,
        }
    }

    pub fn decrement(&self) -> NumberFieldStepper {
        NumberFieldStepper {
            root: self.clone(),
            direction: -1,
        }
    }
}

/// The text box (`role="spinbutton"`)
#[derive(Clone, Debug)]
pub struct NumberFieldInput {
    root: NumberField,
}

impl NumberFieldInput {
    pub fn element(&self) -> &Element {
        &self.root.input
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        let root = &self.root;
        if root.disabled {
            return EventResult::Ignored;
        }
        match event.key {
            Key::ArrowUp => root.step_by(1),
            Key::ArrowDown => root.step_by(-1),
            Key::PageUp => root.step_by(PAGE_STEPS),
            Key::PageDown => root.step_by(-PAGE_STEPS),
            Key::Home if root.range.min().is_finite() => root.set_bound(root.range.min()),
            Key::End if root.range.max().is_finite() => root.set_bound(root.range.max()),
            _ => return EventResult::Ignored,
        }
        EventResult::Handled
    }

    /// The user typed; unparsable text leaves the value alone
    pub fn change(&self, text: &str) -> EventResult {
        match text.trim().parse::<f64>() {
            Ok(parsed) if !parsed.is_nan() => {
                self.root.set_value(parsed);
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub fn attrs(&self) -> Attributes {
        let root = &self.root;
        let finite = |bound: f64| bound.is_finite().then_some(bound);
        Attributes::with_role("spinbutton")
            .set("value", root.value())
            .set("aria-valuenow", root.value())
            .set_opt("aria-valuemin", finite(root.range.min()))
            .set_opt("aria-valuemax", finite(root.range.max()))
            .set_opt("aria-disabled", root.disabled.then_some("true"))
            .set("inputmode", "decimal")
    }
}

/// Increment (+1) or decrement (-1) button
#[derive(Clone, Debug)]
pub struct NumberFieldStepper {
    root: NumberField,
    direction: i32,
}

impl NumberFieldStepper {
    /// Disabled at the bound it moves toward
    pub fn is_disabled(&self) -> bool {
        let value = self.root.value();
        self.root.disabled
            || if self.direction > 0 {
                self.root.range.at_max(value)
            } else {
                self.root.range.at_min(value)
            }
    }

    pub fn click(&self) -> EventResult {
        if self.is_disabled() {
            return EventResult::Ignored;
        }
        self.root.step_by(self.direction);
        EventResult::Handled
    }

    pub fn attrs(&self) -> Attributes {
        let label = if self.direction > 0 {
            "Increment"
        } else {
            "Decrement"
        };
        Attributes::new()
            .set("aria-label", label)
            .set("tabindex", -1)
            .flag("disabled", self.is_disabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_field(min: f64, max: f64, step: f64, value: f64) -> NumberField {
        let doc = Document::new();
        NumberField::new(
            &doc,
            NumberFieldProps {
                default_value: value,
                min,
                max,
                step,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_arrow_and_page_keys() {
        let field = make_field(0.0, 100.0, 1.0, 50.0);
        let input = field.input();

        input.key_down(&KeyEvent::new(Key::ArrowUp));
        assert_eq!(field.value(), 51.0);
        input.key_down(&KeyEvent::new(Key::PageDown));
        assert_eq!(field.value(), 41.0);
        input.key_down(&KeyEvent::new(Key::End));
        assert_eq!(field.value(), 100.0);
        input.key_down(&KeyEvent::new(Key::Home));
        assert_eq!(field.value(), 0.0);
    }

    #[test]
    fn test_unbounded_home_end_ignored() {
        let field = make_field(f64::NEG_INFINITY, f64::INFINITY, 1.0, 7.0);
        let input = field.input();
        assert_eq!(input.key_down(&KeyEvent::new(Key::Home)), EventResult::Ignored);
        assert_eq!(input.key_down(&KeyEvent::new(Key::End)), EventResult::Ignored);
        assert_eq!(field.value(), 7.0);

        let attrs = input.attrs();
        assert!(!attrs.has("aria-valuemin"));
        assert!(!attrs.has("aria-valuemax"));
    }

    #[test]
    fn test_steppers_disable_at_bounds() {
        let field = make_field(0.0, 10.0, 1.0, 10.0);
        let inc = field.increment();
        let dec = field.decrement();

        assert!(inc.is_disabled());
        assert_eq!(inc.click(), EventResult::Ignored);
        assert_eq!(field.value(), 10.0);
        assert!(!dec.is_disabled());

        dec.click();
        assert_eq!(field.value(), 9.0);
        assert!(!inc.is_disabled());
    }

    #[test]
    fn test_off_grid_max_reachable() {
        // Grid points are 0, 3, 6, 9; max sits between them
        let field = make_field(0.0, 10.0, 3.0, 9.0);
        let inc = field.increment();
        assert!(!inc.is_disabled());
        inc.click();
        assert_eq!(field.value(), 10.0);
        assert!(inc.is_disabled());

        field.set_value(0.0);
        field.input().key_down(&KeyEvent::new(Key::End));
        assert_eq!(field.value(), 10.0);
        field.set_value(100.0);
        assert_eq!(field.value(), 10.0);
    }

    #[test]
    fn test_decimal_steps_stay_exact() {
        let field = make_field(0.0, 1.0, 0.1, 0.2);
        field.increment().click();
        assert_eq!(field.value(), 0.3);
    }

    #[test]
    fn test_typed_input() {
        let field = make_field(0.0, 100.0, 5.0, 0.0);
        let input = field.input();

        input.change("42");
        assert_eq!(field.value(), 40.0);
        assert_eq!(input.change("abc"), EventResult::Ignored);
        assert_eq!(field.value(), 40.0);
        input.change("1000");
        assert_eq!(field.value(), 100.0);
    }

    proptest! {
        #[test]
        fn test_increment_at_max_is_stable(max in 1i32..500) {
            let field = make_field(0.0, f64::from(max), 1.0, f64::from(max));
            field.input().key_down(&KeyEvent::new(Key::ArrowUp));
            prop_assert_eq!(field.value(), f64::from(max));
        }

        #[test]
        fn test_values_stay_on_grid(raw in -1000.0f64..1000.0) {
            let field = make_field(-50.0, 50.0, 5.0, 0.0);
            field.set_value(raw);
            let v = field.value();
            prop_assert!((-50.0..=50.0).contains(&v));
            prop_assert_eq!((v + 50.0) % 5.0, 0.0);
        }
    }
}
