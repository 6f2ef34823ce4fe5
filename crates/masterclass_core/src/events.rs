//! Input events delivered to primitives
//!
//! Primitives never see raw platform events. The host translates keyboard
//! and pointer input into the small vocabulary defined here, and every
//! handler reports back whether it consumed the event.

/// Event type constants used by the state machines in this workspace
pub mod event_types {
    pub const POINTER_ENTER: u32 = 1;
    pub const POINTER_LEAVE: u32 = 2;
    pub const POINTER_DOWN: u32 = 3;
    pub const POINTER_UP: u32 = 4;
    pub const POINTER_MOVE: u32 = 5;
    pub const FOCUS: u32 = 10;
    pub const BLUR: u32 = 11;
    pub const KEY_DOWN: u32 = 20;
    /// Pointer moved while captured
    pub const DRAG: u32 = 30;
    /// Pointer capture released
    pub const DRAG_END: u32 = 31;
}

/// Logical keys the primitives react to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
    Tab,
    Backspace,
    /// Any printable character
    Char(char),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` string
    pub fn from_dom(key: &str) -> Option<Self> {
        let key = match key {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "Enter" => Key::Enter,
            " " => Key::Space,
            "Escape" => Key::Escape,
            "Tab" => Key::Tab,
            "Backspace" => Key::Backspace,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    /// Enter or Space, the two keys that activate a button
    pub fn is_activation(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// Modifier keys held during a key press
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A key press
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// Same key with Shift held
    pub fn shifted(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

/// Outcome of handling an input event
///
/// `Handled` maps to `preventDefault()` in a browser host: the primitive
/// consumed the event and the host must not run its default action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventResult {
    Handled,
    #[default]
    Ignored,
}

impl EventResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResult::Handled)
    }

    pub fn handled_if(cond: bool) -> Self {
        if cond {
            EventResult::Handled
        } else {
            EventResult::Ignored
        }
    }
}

/// Pointer position in viewport coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Layout rectangle reported by the host for an element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

/// Identifies a pointer for capture tracking
pub type PointerId = u32;
