//! Overlay configuration presets

use masterclass_core::{NodeId, Point};

use crate::state::OverlayKind;

/// Where the overlay is placed
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum OverlayPosition {
    /// Centered in the viewport
    #[default]
    Centered,
    /// Next to an anchor element (usually the trigger)
    Anchored(NodeId),
    /// At fixed viewport coordinates, independent of any element
    AtPoint(Point),
}

/// Backdrop behind modal overlays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackdropConfig {
    /// Whether clicking the backdrop dismisses the overlay
    pub dismiss_on_click: bool,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            dismiss_on_click: true,
        }
    }
}

/// What the Escape key does while this overlay is on top
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EscapeBehavior {
    /// Close the overlay
    #[default]
    Dismiss,
    /// Swallow the key without closing
    Suppress,
    /// Not handled here; the key reaches the next overlay down
    Ignore,
}

/// Configuration for an overlay instance
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    pub kind: OverlayKind,
    pub position: OverlayPosition,
    /// `None` means no backdrop
    pub backdrop: Option<BackdropConfig>,
    pub escape: EscapeBehavior,
    /// Close when a pointer goes down outside the overlay and its anchor
    pub dismiss_on_outside_pointer: bool,
    /// Keep Tab/Shift+Tab inside the overlay
    pub focus_trap: bool,
    /// Move focus into the overlay when it opens
    pub take_focus: bool,
    /// Higher values stack above lower ones; ties go to the newest overlay
    pub z_priority: i32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::dialog()
    }
}

impl OverlayConfig {
    /// Modal dialog: backdrop click and Escape both close
    pub fn dialog() -> Self {
        Self {
            kind: OverlayKind::Dialog,
            position: OverlayPosition::Centered,
            backdrop: Some(BackdropConfig::default()),
            escape: EscapeBehavior::Dismiss,
            dismiss_on_outside_pointer: false,
            focus_trap: true,
            take_focus: true,
            z_priority: 100,
        }
    }

    /// Modal dialog that neither Escape nor the backdrop can close
    pub fn alert_dialog() -> Self {
        Self {
            kind: OverlayKind::AlertDialog,
            backdrop: Some(BackdropConfig {
                dismiss_on_click: false,
            }),
            escape: EscapeBehavior::Suppress,
            ..Self::dialog()
        }
    }

    pub fn popover(anchor: NodeId) -> Self {
        Self {
            kind: OverlayKind::Popover,
            position: OverlayPosition::Anchored(anchor),
            backdrop: None,
            escape: EscapeBehavior::Dismiss,
            dismiss_on_outside_pointer: true,
            focus_trap: false,
            take_focus: true,
            z_priority: 150,
        }
    }

    /// Tooltips never take focus and leave Escape to their trigger
    pub fn tooltip(anchor: NodeId) -> Self {
        Self {
            kind: OverlayKind::Tooltip,
            position: OverlayPosition::Anchored(anchor),
            backdrop: None,
            escape: EscapeBehavior::Ignore,
            dismiss_on_outside_pointer: false,
            focus_trap: false,
            take_focus: false,
            z_priority: 300,
        }
    }

    pub fn menu(anchor: NodeId) -> Self {
        Self {
            kind: OverlayKind::Menu,
            position: OverlayPosition::Anchored(anchor),
            backdrop: None,
            escape: EscapeBehavior::Dismiss,
            dismiss_on_outside_pointer: true,
            focus_trap: false,
            take_focus: true,
            z_priority: 200,
        }
    }

    pub fn context_menu(at: Point) -> Self {
        Self {
            kind: OverlayKind::ContextMenu,
            position: OverlayPosition::AtPoint(at),
            backdrop: None,
            escape: EscapeBehavior::Dismiss,
            dismiss_on_outside_pointer: true,
            focus_trap: false,
            take_focus: true,
            z_priority: 200,
        }
    }

    /// Select/combobox popup: focus stays on the trigger or input
    pub fn listbox(anchor: NodeId) -> Self {
        Self {
            kind: OverlayKind::Listbox,
            position: OverlayPosition::Anchored(anchor),
            backdrop: None,
            escape: EscapeBehavior::Dismiss,
            dismiss_on_outside_pointer: true,
            focus_trap: false,
            take_focus: false,
            z_priority: 200,
        }
    }

    pub fn is_modal(&self) -> bool {
        self.backdrop.is_some()
    }

    pub fn backdrop_dismisses(&self) -> bool {
        self.backdrop.is_some_and(|b| b.dismiss_on_click)
    }

    /// The anchor element, if positioned against one
    pub fn anchor(&self) -> Option<NodeId> {
        match self.position {
            OverlayPosition::Anchored(node) => Some(node),
            _ => None,
        }
    }
}
