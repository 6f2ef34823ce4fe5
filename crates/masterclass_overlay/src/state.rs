//! Overlay lifecycle state machine

use masterclass_core::StateTransitions;

/// Custom event types for the overlay state machine
pub mod overlay_events {
    /// Mount the overlay (Closed -> Open)
    pub const OPEN: u32 = 20001;
    /// Explicit close action (Open -> Closed)
    pub const CLOSE: u32 = 20002;
    /// Backdrop was clicked
    pub const BACKDROP_CLICK: u32 = 20004;
    /// Escape key pressed
    pub const ESCAPE: u32 = 20005;
    /// Pointer went down outside the overlay and its anchor
    pub const OUTSIDE_POINTER: u32 = 20006;
}

/// Categorizes overlay behavior and default configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Modal dialog - traps focus, has a dismissable backdrop
    #[default]
    Dialog,
    /// Modal dialog that only closes through its own controls
    AlertDialog,
    /// Non-modal panel anchored to a trigger
    Popover,
    /// Hover/focus hint, never takes focus
    Tooltip,
    /// Action menu anchored to a trigger
    Menu,
    /// Action menu positioned at the pointer
    ContextMenu,
    /// Option list of a select or combobox
    Listbox,
}

impl OverlayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::Dialog => "dialog",
            OverlayKind::AlertDialog => "alert-dialog",
            OverlayKind::Popover => "popover",
            OverlayKind::Tooltip => "tooltip",
            OverlayKind::Menu => "menu",
            OverlayKind::ContextMenu => "context-menu",
            OverlayKind::Listbox => "listbox",
        }
    }
}

/// State machine for overlay lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OverlayState {
    /// Overlay is not mounted
    #[default]
    Closed,
    /// Overlay is mounted in the portal layer and interactive
    Open,
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        matches!(self, OverlayState::Open)
    }

    /// Value for `data-state`
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayState::Closed => "closed",
            OverlayState::Open => "open",
        }
    }
}

impl StateTransitions for OverlayState {
    fn on_event(&self, event: u32) -> Option<Self> {
        use overlay_events::*;
        use OverlayState::*;

        match (self, event) {
            (Closed, OPEN) => Some(Open),
            (Open, CLOSE | ESCAPE | BACKDROP_CLICK | OUTSIDE_POINTER) => Some(Closed),
            _ => None,
        }
    }
}
