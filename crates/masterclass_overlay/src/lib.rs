//! Masterclass Overlay
//!
//! The portal layer shared by every overlay primitive (dialogs, popovers,
//! tooltips, menus, listbox popups):
//!
//! - **OverlayManager**: document-level stack of mounted overlays
//! - **Dismissal routing**: Escape, backdrop click, outside pointer-down
//! - **FSM-driven State**: each overlay is Closed or Open
//! - **Focus trapping**: sentinel elements that wrap Tab inside a scope
//!
//! # Example
//!
//! ```
//! use masterclass_overlay::{overlay_manager, OverlayConfig, OverlayManagerExt, EscapeOutcome};
//!
//! let overlays = overlay_manager();
//! let handle = overlays.mount(OverlayConfig::alert_dialog(), None);
//!
//! // Alert dialogs swallow Escape
//! assert_eq!(overlays.handle_escape(), EscapeOutcome::Suppressed(handle));
//! assert!(overlays.is_open(handle));
//! ```

pub mod config;
pub mod focus_trap;
pub mod manager;
pub mod state;

pub use config::{BackdropConfig, EscapeBehavior, OverlayConfig, OverlayPosition};
pub use focus_trap::{FocusScope, FocusTrap, Focusable, Sentinel};
pub use manager::{
    overlay_manager, ActiveOverlay, DismissCallback, DismissReason, EscapeOutcome, OverlayHandle,
    OverlayManager, OverlayManagerExt, OverlayManagerInner,
};
pub use state::{overlay_events, OverlayKind, OverlayState};
