//! Slider
//!
//! A single-thumb range input. The value is clamped and snapped like
//! [`NumberField`](crate::number_field::NumberField); on top of the keyboard
//! the track accepts pointer input:
//!
//! - pointer-down on the track captures the pointer, jumps the value to the
//!   pointer position and focuses the thumb
//! - pointer-move recomputes the value while the capture is held
//! - pointer-up releases the capture
//!
//! Vertical sliders invert the axis so that up means a higher value.

use std::sync::{Arc, Mutex};

use masterclass_core::{
    event_types, Attributes, CompoundRoot, ControllableState, Document, Element, EventResult,
    FocusHandle, Key, KeyEvent, LockExt, Machine, NumericRange, Orientation, Point, PointerId,
    PrimitiveError, Rect, StateTransitions,
};
use tracing::trace;

const PAGE_STEPS: i32 = 10;

/// Slider thumb interaction states
///
/// Handles DRAG and DRAG_END so the thumb stays in `Dragging` even when
/// the pointer leaves it mid-drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SliderThumbState {
    #[default]
    Idle,
    Hovered,
    Pressed,
    Dragging,
}

impl SliderThumbState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, SliderThumbState::Dragging)
    }
}

impl StateTransitions for SliderThumbState {
    fn on_event(&self, event: u32) -> Option<Self> {
        use event_types::*;
        use SliderThumbState::*;

        match (self, event) {
            (Idle, POINTER_ENTER) => Some(Hovered),
            // A press on the track lands on the thumb too
            (Idle | Hovered, POINTER_DOWN) => Some(Pressed),
            (Hovered, POINTER_LEAVE) => Some(Idle),

            (Pressed, POINTER_UP) => Some(Hovered),
            (Pressed, POINTER_LEAVE) => Some(Idle),
            (Pressed, DRAG) => Some(Dragging),

            // Dragging ignores enter/leave until the capture is released
            (Dragging, DRAG_END | POINTER_UP) => Some(Idle),

            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderProps {
    pub value: Option<f64>,
    pub default_value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub orientation: Orientation,
    pub disabled: bool,
}

impl Default for SliderProps {
    fn default() -> Self {
        Self {
            value: None,
            default_value: 0.0,
            min: 0.0,
            max: 100.0,
            step: 1.0,
            orientation: Orientation::Horizontal,
            disabled: false,
        }
    }
}

#[derive(Debug)]
struct SliderInner {
    track: Rect,
    capture: Option<PointerId>,
    thumb: Machine<SliderThumbState>,
}

#[derive(Clone, Debug)]
pub struct Slider {
    value: ControllableState<f64>,
    range: NumericRange,
    orientation: Orientation,
    disabled: bool,
    thumb: Element,
    inner: Arc<Mutex<SliderInner>>,
}

impl CompoundRoot for Slider {
    const NAME: &'static str = "Slider.Root";
}

impl Slider {
    pub fn new(doc: &Document, props: SliderProps) -> Result<Self, PrimitiveError> {
        let range = NumericRange::new(props.min, props.max, props.step)?;
        Ok(Self {
            value: ControllableState::new(props.value, props.default_value),
            range,
            orientation: props.orientation,
            disabled: props.disabled,
            thumb: doc.create_element(),
            inner: Arc::new(Mutex::new(SliderInner {
                track: Rect::default(),
                capture: None,
                thumb: Machine::new(SliderThumbState::Idle),
            })),
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

    pub fn sync_value(&self, value: Option<f64>) {
        self.value.sync(value);
    }

    /// Position of the value along the track, `0.0..=100.0`
    pub fn percentage(&self) -> f64 {
        self.range.percent(self.value())
    }

    pub fn thumb_state(&self) -> SliderThumbState {
        self.inner.locked().thumb.state()
    }

    pub fn set_value(&self, raw: f64) {
        if self.disabled {
            return;
        }
        let next = self.range.snap(raw);
        trace!(raw, next, "slider value");
        self.value.set(next);
    }

    /// Jump to a bound without snapping, so an off-grid `max` is reachable
    fn set_bound(&self, bound: f64) {
        if self.disabled {
            return;
        }
        trace!(bound, "slider bound");
        self.value.set(bound);
    }

    fn step_by(&self, count: i32) {
        self.set_value(self.range.step_by(self.value(), count));
    }

    /// Value under a pointer position, given the track's rect
    fn value_at(&self, track: Rect, point: Point) -> f64 {
        let ratio = match self.orientation {
            Orientation::Vertical => {
                if track.height <= 0.0 {
                    0.0
                } else {
                    (track.bottom() - point.y) / track.height
                }
            }
            Orientation::Horizontal | Orientation::Both => {
                if track.width <= 0.0 {
                    0.0
                } else {
                    (point.x - track.left) / track.width
                }
            }
        };
        self.range.value_at_ratio(f64::from(ratio.clamp(0.0, 1.0)))
    }

    fn send(&self, event: u32) {
        self.inner.locked().thumb.send(event);
    }

    pub fn track(&self) -> SliderTrack {
        SliderTrack { root: self.clone() }
    }

    pub fn indicator(&self) -> SliderIndicator {
        SliderIndicator { root: self.clone() }
    }

    pub fn thumb(&self) -> SliderThumb {
        SliderThumb { root: self.clone() }
    }
}

#[derive(Clone, Debug)]
pub struct SliderTrack {
    root: Slider,
}

impl SliderTrack {
    /// Record the track's layout rect, used to map pointer positions
    pub fn set_rect(&self, rect: Rect) {
        self.root.inner.locked().track = rect;
    }

    pub fn pointer_down(&self, pointer: PointerId, point: Point) -> EventResult {
        let root = &self.root;
        if root.disabled {
            return EventResult::Ignored;
        }
        let track = {
            let mut inner = root.inner.locked();
            inner.capture = Some(pointer);
            inner.thumb.send(event_types::POINTER_DOWN);
            inner.track
        };
        root.set_value(root.value_at(track, point));
        root.thumb.focus();
        EventResult::Handled
    }

    pub fn pointer_move(&self, pointer: PointerId, point: Point) -> EventResult {
        let root = &self.root;
        let track = {
            let mut inner = root.inner.locked();
            if inner.capture != Some(pointer) {
                return EventResult::Ignored;
            }
            inner.thumb.send(event_types::DRAG);
            inner.track
        };
        root.set_value(root.value_at(track, point));
        EventResult::Handled
    }

    pub fn pointer_up(&self, pointer: PointerId) -> EventResult {
        let mut inner = self.root.inner.locked();
        if inner.capture != Some(pointer) {
            return EventResult::Ignored;
        }
        inner.capture = None;
        if inner.thumb.state().is_dragging() {
            inner.thumb.send(event_types::DRAG_END);
        } else {
            inner.thumb.send(event_types::POINTER_UP);
        }
        EventResult::Handled
    }

    pub fn has_capture(&self) -> bool {
        self.root.inner.locked().capture.is_some()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::new()
            .set("data-orientation", self.root.orientation.as_str())
            .flag("data-disabled", self.root.disabled)
    }
}

/// The filled part of the track
#[derive(Clone, Debug)]
pub struct SliderIndicator {
    root: Slider,
}

impl SliderIndicator {
    pub fn attrs(&self) -> Attributes {
        let pct = self.root.percentage();
        let style = match self.root.orientation {
            Orientation::Vertical => format!("height: {pct}%"),
            _ => format!("width: {pct}%"),
        };
        Attributes::new()
            .set("style", style)
            .set("data-orientation", self.root.orientation.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct SliderThumb {
    root: Slider,
}

impl SliderThumb {
    pub fn element(&self) -> &Element {
        &self.root.thumb
    }

    pub fn pointer_enter(&self) {
        self.root.send(event_types::POINTER_ENTER);
    }

    pub fn pointer_leave(&self) {
        self.root.send(event_types::POINTER_LEAVE);
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        let root = &self.root;
        if root.disabled {
            return EventResult::Ignored;
        }
        match event.key {
            Key::ArrowRight | Key::ArrowUp => root.step_by(1),
            Key::ArrowLeft | Key::ArrowDown => root.step_by(-1),
            Key::PageUp => root.step_by(PAGE_STEPS),
            Key::PageDown => root.step_by(-PAGE_STEPS),
            Key::Home => root.set_bound(root.range.min()),
            Key::End => root.set_bound(root.range.max()),
            _ => return EventResult::Ignored,
        }
        EventResult::Handled
    }

    pub fn attrs(&self) -> Attributes {
        let root = &self.root;
        let pct = root.percentage();
        let style = match root.orientation {
            Orientation::Vertical => format!("bottom: {pct}%"),
            _ => format!("left: {pct}%"),
        };
        Attributes::with_role("slider")
            .set("tabindex", if root.disabled { -1 } else { 0 })
            .set("aria-valuenow", root.value())
            .set("aria-valuemin", root.range.min())
            .set("aria-valuemax", root.range.max())
            .set("aria-orientation", root.orientation.as_str())
            .set_opt("aria-disabled", root.disabled.then_some("true"))
            .set("style", style)
            .flag("data-dragging", root.thumb_state().is_dragging())
            .flag("data-disabled", root.disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slider(props: SliderProps) -> (Document, Slider) {
        let doc = Document::new();
        let slider = Slider::new(&doc, props).unwrap();
        slider.track().set_rect(Rect::new(0.0, 0.0, 200.0, 200.0));
        (doc, slider)
    }

    #[test]
    fn test_thumb_state_transitions() {
        use event_types::*;

        let mut state = SliderThumbState::Idle;
        state = state.on_event(POINTER_ENTER).unwrap();
        assert_eq!(state, SliderThumbState::Hovered);
        state = state.on_event(POINTER_DOWN).unwrap();
        assert_eq!(state, SliderThumbState::Pressed);
        state = state.on_event(DRAG).unwrap();
        assert_eq!(state, SliderThumbState::Dragging);
        assert_eq!(state.on_event(POINTER_LEAVE), None);
        assert_eq!(state.on_event(DRAG_END), Some(SliderThumbState::Idle));
    }

    #[test]
    fn test_keyboard() {
        let (_, slider) = slider(SliderProps {
            default_value: 50.0,
            ..Default::default()
        });
        let thumb = slider.thumb();

        thumb.key_down(&KeyEvent::new(Key::ArrowRight));
        assert_eq!(slider.value(), 51.0);
        thumb.key_down(&KeyEvent::new(Key::ArrowDown));
        assert_eq!(slider.value(), 50.0);
        thumb.key_down(&KeyEvent::new(Key::PageUp));
        assert_eq!(slider.value(), 60.0);
        thumb.key_down(&KeyEvent::new(Key::End));
        assert_eq!(slider.value(), 100.0);
        thumb.key_down(&KeyEvent::new(Key::ArrowUp));
        assert_eq!(slider.value(), 100.0);
    }

    #[test]
    fn test_off_grid_max_reachable() {
        let (_, slider) = slider(SliderProps {
            default_value: 9.0,
            max: 10.0,
            step: 3.0,
            ..Default::default()
        });
        let thumb = slider.thumb();

        thumb.key_down(&KeyEvent::new(Key::ArrowRight));
        assert_eq!(slider.value(), 10.0);
        thumb.key_down(&KeyEvent::new(Key::ArrowLeft));
        assert_eq!(slider.value(), 6.0);
        thumb.key_down(&KeyEvent::new(Key::End));
        assert_eq!(slider.value(), 10.0);
    }

    #[test]
    fn test_drag_horizontal() {
        let (doc, slider) = slider(SliderProps::default());
        let track = slider.track();

        track.pointer_down(1, Point::new(50.0, 10.0));
        assert_eq!(slider.value(), 25.0);
        assert_eq!(doc.active_element(), Some(slider.thumb().element().id()));
        assert_eq!(slider.thumb_state(), SliderThumbState::Pressed);

        track.pointer_move(1, Point::new(150.0, 10.0));
        assert_eq!(slider.value(), 75.0);
        assert!(slider.thumb().attrs().has("data-dragging"));

        // Another pointer has no capture
        assert_eq!(track.pointer_move(2, Point::new(0.0, 0.0)), EventResult::Ignored);

        track.pointer_up(1);
        assert!(!track.has_capture());
        assert_eq!(slider.thumb_state(), SliderThumbState::Idle);
        assert_eq!(track.pointer_move(1, Point::new(0.0, 0.0)), EventResult::Ignored);
        assert_eq!(slider.value(), 75.0);
    }

    #[test]
    fn test_vertical_inverts_axis() {
        let (_, slider) = slider(SliderProps {
            orientation: Orientation::Vertical,
            ..Default::default()
        });
        slider.track().pointer_down(1, Point::new(0.0, 50.0));
        assert_eq!(slider.value(), 75.0);
        assert_eq!(slider.indicator().attrs().get("style"), Some("height: 75%"));
        assert_eq!(slider.thumb().attrs().get("aria-orientation"), Some("vertical"));
    }

    #[test]
    fn test_disabled() {
        let (_, slider) = slider(SliderProps {
            disabled: true,
            ..Default::default()
        });
        assert_eq!(
            slider.track().pointer_down(1, Point::new(100.0, 0.0)),
            EventResult::Ignored
        );
        assert_eq!(slider.thumb().attrs().tab_index(), Some(-1));
        assert_eq!(slider.value(), 0.0);
    }

    proptest! {
        #[test]
        fn test_pointer_values_clamped(x in -500.0f32..700.0) {
            let (_, slider) = slider(SliderProps { step: 5.0, ..Default::default() });
            slider.track().pointer_down(1, Point::new(x, 0.0));
            let v = slider.value();
            prop_assert!((0.0..=100.0).contains(&v));
            prop_assert_eq!(v % 5.0, 0.0);
        }
    }
}
