//! Overlay manager - the portal layer
//!
//! Overlays are logically children of the primitive that opened them but are
//! mounted here, in a single document-level layer, so they stack above the
//! page regardless of where their owner lives. The manager also owns the
//! document-level listeners every overlay would otherwise install on its own:
//!
//! - **Escape**: routed to the topmost overlay that handles it
//! - **Backdrop click**: routed to the topmost modal overlay
//! - **Outside pointer-down**: routed to the topmost overlay that dismisses on it
//!
//! Dismissal is a *request*: the manager calls the overlay's dismiss callback
//! and the owning primitive decides whether to close (a controlled dialog may
//! refuse). Closing means the owner calls [`OverlayManagerExt::unmount`].

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use masterclass_core::{LockExt, NodeId, StateTransitions};
use smallvec::SmallVec;
use tracing::debug;

use crate::config::{EscapeBehavior, OverlayConfig};
use crate::state::{overlay_events, OverlayState};

/// Why an overlay was asked to close
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DismissReason {
    Escape,
    BackdropClick,
    OutsidePointer,
}

/// Callback the owner registers to receive dismiss requests
pub type DismissCallback = Arc<dyn Fn(DismissReason) + Send + Sync>;

/// Handle to a mounted overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(u64);

impl OverlayHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Result of routing an Escape key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapeOutcome {
    /// The topmost overlay was asked to close
    Dismissed(OverlayHandle),
    /// The topmost overlay swallowed the key (alert dialogs)
    Suppressed(OverlayHandle),
    /// No overlay handles Escape
    Unhandled,
}

impl EscapeOutcome {
    /// Whether the host should prevent the key's default action
    pub fn is_handled(&self) -> bool {
        !matches!(self, EscapeOutcome::Unhandled)
    }
}

/// A mounted overlay
pub struct ActiveOverlay {
    pub handle: OverlayHandle,
    pub config: OverlayConfig,
    pub state: OverlayState,
    /// Id of the portal container, for `aria-controls` and the like
    pub portal_id: String,
    /// Elements that count as "inside" for outside-pointer detection
    nodes: SmallVec<[NodeId; 4]>,
    on_dismiss: Option<DismissCallback>,
}

impl ActiveOverlay {
    /// Is `node` part of this overlay or its anchor?
    pub fn contains(&self, node: NodeId) -> bool {
        self.config.anchor() == Some(node) || self.nodes.contains(&node)
    }

    fn transition(&mut self, event: u32) -> bool {
        match self.state.on_event(event) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ActiveOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveOverlay")
            .field("handle", &self.handle)
            .field("kind", &self.config.kind)
            .field("state", &self.state)
            .field("portal_id", &self.portal_id)
            .finish()
    }
}

/// Portal layer state
#[derive(Debug, Default)]
pub struct OverlayManagerInner {
    overlays: IndexMap<OverlayHandle, ActiveOverlay>,
    next_id: u64,
}

/// Shared overlay manager
pub type OverlayManager = Arc<Mutex<OverlayManagerInner>>;

/// Create a new overlay manager
pub fn overlay_manager() -> OverlayManager {
    Arc::new(Mutex::new(OverlayManagerInner::new()))
}

impl OverlayManagerInner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount an overlay into the portal layer in the Open state
    pub fn mount(
        &mut self,
        config: OverlayConfig,
        on_dismiss: Option<DismissCallback>,
    ) -> OverlayHandle {
        self.next_id += 1;
        let handle = OverlayHandle(self.next_id);
        let mut overlay = ActiveOverlay {
            handle,
            portal_id: format!("portal-{}-{}", config.kind.as_str(), handle.0),
            config,
            state: OverlayState::Closed,
            nodes: SmallVec::new(),
            on_dismiss,
        };
        overlay.transition(overlay_events::OPEN);
        debug!(handle = handle.0, kind = overlay.config.kind.as_str(), "overlay mounted");
        self.overlays.insert(handle, overlay);
        handle
    }

    /// Remove an overlay. Returns false if it was not mounted.
    pub fn unmount(&mut self, handle: OverlayHandle) -> bool {
        match self.overlays.shift_remove(&handle) {
            Some(mut overlay) => {
                overlay.transition(overlay_events::CLOSE);
                debug!(handle = handle.0, kind = overlay.config.kind.as_str(), "overlay unmounted");
                true
            }
            None => false,
        }
    }

    /// Register an element as part of the overlay
    pub fn add_node(&mut self, handle: OverlayHandle, node: NodeId) {
        if let Some(overlay) = self.overlays.get_mut(&handle) {
            if !overlay.nodes.contains(&node) {
                overlay.nodes.push(node);
            }
        }
    }

    pub fn get(&self, handle: OverlayHandle) -> Option<&ActiveOverlay> {
        self.overlays.get(&handle)
    }

    pub fn is_open(&self, handle: OverlayHandle) -> bool {
        self.overlays
            .get(&handle)
            .is_some_and(|o| o.state.is_open())
    }

    pub fn open_count(&self) -> usize {
        self.overlays.values().filter(|o| o.state.is_open()).count()
    }

    /// Open overlays from bottom to top
    pub fn stack(&self) -> Vec<OverlayHandle> {
        let mut open: Vec<&ActiveOverlay> =
            self.overlays.values().filter(|o| o.state.is_open()).collect();
        // Stable sort keeps mount order among equal priorities
        open.sort_by_key(|o| o.config.z_priority);
        open.into_iter().map(|o| o.handle).collect()
    }

    /// Topmost open overlay
    pub fn top(&self) -> Option<OverlayHandle> {
        self.topmost(|_| true)
    }

    /// Whether a modal overlay is blocking the page
    pub fn has_blocking_overlay(&self) -> bool {
        self.overlays
            .values()
            .any(|o| o.state.is_open() && o.config.is_modal())
    }

    fn topmost(&self, filter: impl Fn(&ActiveOverlay) -> bool) -> Option<OverlayHandle> {
        // max_by_key returns the last maximum, i.e. the newest overlay on ties
        self.overlays
            .values()
            .filter(|o| o.state.is_open() && filter(o))
            .max_by_key(|o| o.config.z_priority)
            .map(|o| o.handle)
    }

    fn dismiss_callback(&self, handle: OverlayHandle) -> Option<DismissCallback> {
        self.overlays.get(&handle).and_then(|o| o.on_dismiss.clone())
    }

    fn route_escape(&self) -> (EscapeOutcome, Option<DismissCallback>) {
        let Some(handle) = self.topmost(|o| o.config.escape != EscapeBehavior::Ignore) else {
            return (EscapeOutcome::Unhandled, None);
        };
        let Some(overlay) = self.overlays.get(&handle) else {
            return (EscapeOutcome::Unhandled, None);
        };
        match overlay.config.escape {
            EscapeBehavior::Dismiss => (EscapeOutcome::Dismissed(handle), overlay.on_dismiss.clone()),
            _ => (EscapeOutcome::Suppressed(handle), None),
        }
    }

    fn route_backdrop_click(&self) -> Option<(OverlayHandle, Option<DismissCallback>)> {
        let handle = self.topmost(|o| o.config.is_modal())?;
        let overlay = self.overlays.get(&handle)?;
        if overlay.config.backdrop_dismisses() {
            Some((handle, overlay.on_dismiss.clone()))
        } else {
            None
        }
    }

    fn route_pointer_down(&self, target: Option<NodeId>) -> Option<(OverlayHandle, Option<DismissCallback>)> {
        let handle = self.topmost(|o| o.config.dismiss_on_outside_pointer)?;
        let overlay = self.overlays.get(&handle)?;
        if target.is_some_and(|node| overlay.contains(node)) {
            return None;
        }
        Some((handle, overlay.on_dismiss.clone()))
    }
}

/// Extension trait for ergonomic overlay management
///
/// Every method releases the manager lock before invoking dismiss callbacks,
/// so owners can unmount from inside them.
pub trait OverlayManagerExt {
    fn mount(&self, config: OverlayConfig, on_dismiss: Option<DismissCallback>) -> OverlayHandle;
    fn unmount(&self, handle: OverlayHandle) -> bool;
    fn add_node(&self, handle: OverlayHandle, node: NodeId);
    fn is_open(&self, handle: OverlayHandle) -> bool;
    fn portal_id(&self, handle: OverlayHandle) -> Option<String>;
    fn top(&self) -> Option<OverlayHandle>;
    fn open_count(&self) -> usize;
    /// Document-level Escape
    fn handle_escape(&self) -> EscapeOutcome;
    /// Click on the shared backdrop. Returns true if an overlay was asked to close.
    fn handle_backdrop_click(&self) -> bool;
    /// Document-level pointer-down on `target` (None for empty space)
    fn handle_pointer_down(&self, target: Option<NodeId>) -> bool;
    /// Ask a specific overlay to close, as if through `reason`
    fn request_dismiss(&self, handle: OverlayHandle, reason: DismissReason) -> bool;
}

impl OverlayManagerExt for OverlayManager {
    fn mount(&self, config: OverlayConfig, on_dismiss: Option<DismissCallback>) -> OverlayHandle {
        self.locked().mount(config, on_dismiss)
    }

    fn unmount(&self, handle: OverlayHandle) -> bool {
        self.locked().unmount(handle)
    }

    fn add_node(&self, handle: OverlayHandle, node: NodeId) {
        self.locked().add_node(handle, node);
    }

    fn is_open(&self, handle: OverlayHandle) -> bool {
        self.locked().is_open(handle)
    }

    fn portal_id(&self, handle: OverlayHandle) -> Option<String> {
        self.locked().get(handle).map(|o| o.portal_id.clone())
    }

    fn top(&self) -> Option<OverlayHandle> {
        self.locked().top()
    }

    fn open_count(&self) -> usize {
        self.locked().open_count()
    }

    fn handle_escape(&self) -> EscapeOutcome {
        let (outcome, callback) = self.locked().route_escape();
        debug!(?outcome, "escape routed");
        if let Some(cb) = callback {
            cb(DismissReason::Escape);
        }
        outcome
    }

    fn handle_backdrop_click(&self) -> bool {
        let routed = self.locked().route_backdrop_click();
        match routed {
            Some((handle, callback)) => {
                debug!(handle = handle.0, "backdrop dismiss");
                if let Some(cb) = callback {
                    cb(DismissReason::BackdropClick);
                }
                true
            }
            None => false,
        }
    }

    fn handle_pointer_down(&self, target: Option<NodeId>) -> bool {
        let routed = self.locked().route_pointer_down(target);
        match routed {
            Some((handle, callback)) => {
                debug!(handle = handle.0, "outside pointer dismiss");
                if let Some(cb) = callback {
                    cb(DismissReason::OutsidePointer);
                }
                true
            }
            None => false,
        }
    }

    fn request_dismiss(&self, handle: OverlayHandle, reason: DismissReason) -> bool {
        let callback = self.locked().dismiss_callback(handle);
        match callback {
            Some(cb) => {
                cb(reason);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_core::{Document, Point};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Dismiss callback that unmounts its own overlay, like a real owner
    fn closing(mgr: &OverlayManager, slot: &Arc<Mutex<Option<OverlayHandle>>>, count: &Arc<AtomicUsize>) -> DismissCallback {
        let mgr = Arc::downgrade(mgr);
        let slot = slot.clone();
        let count = count.clone();
        Arc::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            if let (Some(mgr), Some(handle)) = (mgr.upgrade(), *slot.lock().unwrap()) {
                mgr.unmount(handle);
            }
        })
    }

    fn mount_closing(mgr: &OverlayManager, config: OverlayConfig) -> (OverlayHandle, Arc<AtomicUsize>) {
        let slot = Arc::new(Mutex::new(None));
        let count = Arc::new(AtomicUsize::new(0));
        let handle = mgr.mount(config, Some(closing(mgr, &slot, &count)));
        *slot.lock().unwrap() = Some(handle);
        (handle, count)
    }

    #[test]
    fn test_overlay_manager_basic() {
        let mgr = overlay_manager();
        let handle = mgr.mount(OverlayConfig::dialog(), None);

        assert!(mgr.is_open(handle));
        assert_eq!(mgr.open_count(), 1);
        assert!(mgr.portal_id(handle).unwrap().starts_with("portal-dialog-"));

        assert!(mgr.unmount(handle));
        assert!(!mgr.unmount(handle));
        assert_eq!(mgr.open_count(), 0);
    }

    #[test]
    fn test_overlay_escape() {
        let mgr = overlay_manager();
        let (handle, count) = mount_closing(&mgr, OverlayConfig::dialog());

        assert_eq!(mgr.handle_escape(), EscapeOutcome::Dismissed(handle));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!mgr.is_open(handle));
        assert_eq!(mgr.handle_escape(), EscapeOutcome::Unhandled);
    }

    #[test]
    fn test_alert_dialog_suppresses_escape_and_backdrop() {
        let mgr = overlay_manager();
        let (handle, count) = mount_closing(&mgr, OverlayConfig::alert_dialog());

        for _ in 0..3 {
            assert_eq!(mgr.handle_escape(), EscapeOutcome::Suppressed(handle));
            assert!(!mgr.handle_backdrop_click());
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(mgr.is_open(handle));
    }

    #[test]
    fn test_escape_goes_to_topmost() {
        let doc = Document::new();
        let trigger = doc.create_element();
        let mgr = overlay_manager();
        let (dialog, dialog_count) = mount_closing(&mgr, OverlayConfig::dialog());
        let (menu, menu_count) = mount_closing(&mgr, OverlayConfig::menu(trigger.id()));

        assert_eq!(mgr.top(), Some(menu));
        assert_eq!(mgr.handle_escape(), EscapeOutcome::Dismissed(menu));
        assert_eq!(mgr.handle_escape(), EscapeOutcome::Dismissed(dialog));
        assert_eq!(menu_count.load(Ordering::SeqCst), 1);
        assert_eq!(dialog_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tooltip_ignores_escape() {
        let doc = Document::new();
        let trigger = doc.create_element();
        let mgr = overlay_manager();
        let (dialog, _) = mount_closing(&mgr, OverlayConfig::dialog());
        mgr.mount(OverlayConfig::tooltip(trigger.id()), None);

        // Tooltip is on top but Escape skips it
        assert_eq!(mgr.handle_escape(), EscapeOutcome::Dismissed(dialog));
    }

    #[test]
    fn test_outside_pointer() {
        let doc = Document::new();
        let trigger = doc.create_element();
        let inside = doc.create_element();
        let outside = doc.create_element();
        let mgr = overlay_manager();
        let (popover, count) = mount_closing(&mgr, OverlayConfig::popover(trigger.id()));
        mgr.add_node(popover, inside.id());

        assert!(!mgr.handle_pointer_down(Some(inside.id())));
        assert!(!mgr.handle_pointer_down(Some(trigger.id())));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert!(mgr.handle_pointer_down(Some(outside.id())));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!mgr.is_open(popover));
    }

    #[test]
    fn test_dialog_ignores_outside_pointer() {
        let mgr = overlay_manager();
        let (dialog, count) = mount_closing(&mgr, OverlayConfig::dialog());
        assert!(!mgr.handle_pointer_down(None));
        assert!(mgr.handle_backdrop_click());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!mgr.is_open(dialog));
    }

    #[test]
    fn test_stack_order() {
        let mgr = overlay_manager();
        let menu = mgr.mount(OverlayConfig::context_menu(Point::new(4.0, 8.0)), None);
        let dialog = mgr.mount(OverlayConfig::dialog(), None);
        assert_eq!(mgr.locked().stack(), vec![dialog, menu]);
        assert!(mgr.locked().has_blocking_overlay());
    }
}
