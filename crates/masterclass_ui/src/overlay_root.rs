//! Open/close plumbing shared by the focus-taking overlays
//!
//! Dialog, AlertDialog and Popover run the same cycle. The resolved `open`
//! value is compared with what is mounted in the portal layer and the
//! difference is applied: mount, trap and focus in on the way up; unmount and
//! return focus to the trigger on the way down.
//!
//! Dismiss requests from the overlay manager arrive through a callback that
//! holds only a weak reference, so a mounted overlay never keeps its owner
//! alive.

use std::sync::{Arc, Mutex, Weak};

use masterclass_core::{ControllableState, Document, Element, EventResult, FocusHandle, LockExt, NodeId};
use masterclass_overlay::{
    DismissCallback, DismissReason, EscapeBehavior, FocusScope, FocusTrap, Focusable, OverlayConfig,
    OverlayHandle, OverlayManager, OverlayManagerExt, OverlayState, Sentinel,
};
use tracing::debug;

#[derive(Default)]
struct Mounted {
    handle: Option<OverlayHandle>,
    trap: Option<Arc<FocusTrap>>,
}

struct Shared {
    doc: Document,
    overlays: OverlayManager,
    config: OverlayConfig,
    open: ControllableState<bool>,
    trigger: Element,
    scope: FocusScope,
    mounted: Mutex<Mounted>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let handle = self.mounted.locked().handle.take();
        if let Some(handle) = handle {
            self.overlays.unmount(handle);
        }
    }
}

#[derive(Clone)]
pub(crate) struct OverlayRoot {
    shared: Arc<Shared>,
}

impl OverlayRoot {
    /// `config` receives the trigger id so anchored presets can target it
    pub(crate) fn new(
        doc: &Document,
        overlays: &OverlayManager,
        open: ControllableState<bool>,
        config: impl FnOnce(NodeId) -> OverlayConfig,
    ) -> Self {
        let trigger = doc.create_element();
        let content = doc.create_element();
        let root = Self {
            shared: Arc::new(Shared {
                doc: doc.clone(),
                overlays: overlays.clone(),
                config: config(trigger.id()),
                open,
                trigger,
                scope: FocusScope::new(content),
                mounted: Mutex::new(Mounted::default()),
            }),
        };
        root.reconcile();
        root
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    pub(crate) fn open_state(&self) -> &ControllableState<bool> {
        &self.shared.open
    }

    pub(crate) fn trigger(&self) -> &Element {
        &self.shared.trigger
    }

    pub(crate) fn content(&self) -> Element {
        self.shared.scope.container()
    }

    pub(crate) fn is_open(&self) -> bool {
        self.shared.open.get()
    }

    pub(crate) fn state(&self) -> OverlayState {
        if self.is_mounted() {
            OverlayState::Open
        } else {
            OverlayState::Closed
        }
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.shared.mounted.locked().handle.is_some()
    }

    pub(crate) fn handle(&self) -> Option<OverlayHandle> {
        self.shared.mounted.locked().handle
    }

    pub(crate) fn portal_id(&self) -> Option<String> {
        let handle = self.handle()?;
        self.shared.overlays.portal_id(handle)
    }

    pub(crate) fn set_open(&self, open: bool) {
        self.shared.open.set(open);
        self.reconcile();
    }

    pub(crate) fn sync_open(&self, open: Option<bool>) {
        self.shared.open.sync(open);
        self.reconcile();
    }

    pub(crate) fn toggle(&self) {
        self.set_open(!self.is_open());
    }

    /// Close if this overlay's configuration allows `reason` to close it
    pub(crate) fn dismiss(&self, reason: DismissReason) -> bool {
        let config = &self.shared.config;
        let allowed = match reason {
            DismissReason::Escape => config.escape == EscapeBehavior::Dismiss,
            DismissReason::BackdropClick => config.backdrop_dismisses(),
            DismissReason::OutsidePointer => config.dismiss_on_outside_pointer,
        };
        debug!(kind = config.kind.as_str(), ?reason, allowed, "dismiss requested");
        if allowed {
            self.set_open(false);
        }
        allowed
    }

    /// Escape pressed inside the content
    pub(crate) fn escape_key(&self) -> EventResult {
        if !self.is_mounted() {
            return EventResult::Ignored;
        }
        match self.shared.config.escape {
            EscapeBehavior::Dismiss => {
                self.dismiss(DismissReason::Escape);
                EventResult::Handled
            }
            EscapeBehavior::Suppress => EventResult::Handled,
            EscapeBehavior::Ignore => EventResult::Ignored,
        }
    }

    /// Tab pressed inside the content. Without a trap the host moves focus.
    pub(crate) fn tab_key(&self, backwards: bool) -> EventResult {
        let trap = self.shared.mounted.locked().trap.clone();
        match trap {
            Some(trap) => {
                trap.tab(backwards);
                EventResult::Handled
            }
            None => EventResult::Ignored,
        }
    }

    pub(crate) fn sentinel(&self, which: Sentinel) -> Option<Element> {
        let trap = self.shared.mounted.locked().trap.clone();
        trap.map(|trap| trap.sentinel(which).clone())
    }

    /// Add a focusable descendant of the content
    pub(crate) fn register(&self, focusable: Focusable) {
        let node = focusable.element.id();
        self.shared.scope.register(focusable);
        if let Some(handle) = self.handle() {
            self.shared.overlays.add_node(handle, node);
        }
    }

    /// Create and register a plain focusable descendant
    pub(crate) fn focusable(&self) -> Element {
        let element = self.shared.doc.create_element();
        self.register(Focusable::new(element.clone()));
        element
    }

    fn reconcile(&self) {
        let want = self.shared.open.get();
        let mounted = self.is_mounted();
        match (want, mounted) {
            (true, false) => self.mount(),
            (false, true) => self.unmount(),
            _ => {}
        }
    }

    fn mount(&self) {
        let shared = &self.shared;
        let weak = Arc::downgrade(shared);
        let on_dismiss: DismissCallback = Arc::new(move |reason| {
            if let Some(root) = OverlayRoot::from_weak(&weak) {
                root.dismiss(reason);
            }
        });

        let handle = shared.overlays.mount(shared.config.clone(), Some(on_dismiss));
        for node in shared.scope.nodes() {
            shared.overlays.add_node(handle, node);
        }
        let trap = shared
            .config
            .focus_trap
            .then(|| Arc::new(FocusTrap::install(&shared.doc, shared.scope.clone())));
        {
            let mut mounted = shared.mounted.locked();
            mounted.handle = Some(handle);
            mounted.trap = trap;
        }

        if shared.config.take_focus {
            shared.scope.initial_target().focus();
        }
    }

    fn unmount(&self) {
        let (handle, trap) = {
            let mut mounted = self.shared.mounted.locked();
            (mounted.handle.take(), mounted.trap.take())
        };
        if let Some(handle) = handle {
            self.shared.overlays.unmount(handle);
        }
        drop(trap);
        self.shared.trigger.focus();
    }
}

impl std::fmt::Debug for OverlayRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRoot")
            .field("kind", &self.shared.config.kind)
            .field("open", &self.is_open())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
