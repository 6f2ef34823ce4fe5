//! Tooltip
//!
//! Hover or focus on the trigger shows the tooltip after `open_delay_ms`;
//! leaving hides it after `close_delay_ms`. Every new enter/leave replaces
//! the pending timer, so a quick pass over the trigger never shows anything.
//! Blur and Escape bypass the close delay.
//!
//! The tooltip never takes focus and is not reachable by Tab.
//!
//! ```
//! use masterclass_core::Document;
//! use masterclass_overlay::overlay_manager;
//! use masterclass_scheduler::TimerScheduler;
//! use masterclass_ui::tooltip::{Tooltip, TooltipOptions};
//!
//! let doc = Document::new();
//! let scheduler = TimerScheduler::manual();
//! let tooltip = Tooltip::new(&doc, &overlay_manager(), scheduler.handle(), TooltipOptions::default());
//!
//! tooltip.trigger().pointer_enter();
//! scheduler.advance(399);
//! assert!(!tooltip.is_open());
//! scheduler.advance(1);
//! assert!(tooltip.is_open());
//! ```

use std::sync::{Arc, Mutex, Weak};

use masterclass_core::{
    Attributes, CompoundRoot, Document, Element, EventResult, FocusChange, Key, KeyEvent, LockExt,
    OnChange, Subscription,
};
use masterclass_overlay::{OverlayConfig, OverlayHandle, OverlayManager, OverlayManagerExt};
use masterclass_scheduler::{SchedulerHandle, TimerGuard};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Delay configuration, loadable from the `[tooltip]` config section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipOptions {
    pub open_delay_ms: u64,
    pub close_delay_ms: u64,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            open_delay_ms: 400,
            close_delay_ms: 100,
        }
    }
}

#[derive(Default)]
struct TooltipInner {
    pending: Option<TimerGuard>,
    handle: Option<OverlayHandle>,
}

struct Shared {
    overlays: OverlayManager,
    scheduler: SchedulerHandle,
    options: TooltipOptions,
    trigger: Element,
    content_id: String,
    on_open_change: Mutex<Option<OnChange<bool>>>,
    inner: Mutex<TooltipInner>,
    focus_listener: Mutex<Option<Subscription>>,
}

impl Shared {
    fn is_open(&self) -> bool {
        self.inner.locked().handle.is_some()
    }

    fn schedule(self: &Arc<Self>, open: bool) {
        let (delay, label) = if open {
            (self.options.open_delay_ms, "tooltip-open")
        } else {
            (self.options.close_delay_ms, "tooltip-close")
        };
        let weak: Weak<Shared> = Arc::downgrade(self);
        let guard = self.scheduler.timeout(delay, label, move || {
            if let Some(shared) = weak.upgrade() {
                let fired = shared.inner.locked().pending.take();
                drop(fired);
                shared.set_open(open);
            }
        });
        let previous = self.inner.locked().pending.replace(guard);
        drop(previous);
    }

    fn hide_now(&self) {
        let pending = self.inner.locked().pending.take();
        drop(pending);
        self.set_open(false);
    }

    fn set_open(&self, open: bool) {
        let changed = {
            let mut inner = self.inner.locked();
            match (open, inner.handle) {
                (true, None) => {
                    let config = OverlayConfig::tooltip(self.trigger.id());
                    inner.handle = Some(self.overlays.mount(config, None));
                    true
                }
                (false, Some(handle)) => {
                    inner.handle = None;
                    self.overlays.unmount(handle);
                    true
                }
                _ => false,
            }
        };
        if !changed {
            return;
        }
        debug!(open, id = %self.content_id, "tooltip");
        let callback = self.on_open_change.locked().clone();
        if let Some(callback) = callback {
            callback(open);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = std::mem::take(&mut *self.inner.locked());
        if let Some(handle) = inner.handle {
            self.overlays.unmount(handle);
        }
    }
}

#[derive(Clone)]
pub struct Tooltip {
    shared: Arc<Shared>,
}

impl CompoundRoot for Tooltip {
    const NAME: &'static str = "Tooltip.Root";
}

impl Tooltip {
    pub fn new(
        doc: &Document,
        overlays: &OverlayManager,
        scheduler: SchedulerHandle,
        options: TooltipOptions,
    ) -> Self {
        let trigger = doc.create_element();
        let shared = Arc::new(Shared {
            overlays: overlays.clone(),
            scheduler,
            options,
            trigger: trigger.clone(),
            content_id: doc.use_id("tooltip"),
            on_open_change: Mutex::new(None),
            inner: Mutex::new(TooltipInner::default()),
            focus_listener: Mutex::new(None),
        });

        let weak = Arc::downgrade(&shared);
        let listener = trigger.on_focus_change(move |change| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            match change {
                FocusChange::Focused => shared.schedule(true),
                FocusChange::Blurred => shared.hide_now(),
            }
        });
        *shared.focus_listener.locked() = Some(listener);

        Self { shared }
    }

    pub fn on_open_change<F>(self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        *self.shared.on_open_change.locked() = Some(Arc::new(f));
        self
    }

    pub fn options(&self) -> TooltipOptions {
        self.shared.options
    }

    pub fn is_open(&self) -> bool {
        self.shared.is_open()
    }

    /// Whether an open or close timer is waiting to fire
    pub fn has_pending_timer(&self) -> bool {
        self.shared
            .inner
            .locked()
            .pending
            .as_ref()
            .is_some_and(TimerGuard::is_pending)
    }

    pub fn trigger(&self) -> TooltipTrigger {
        TooltipTrigger { root: self.clone() }
    }

    pub fn content(&self) -> TooltipContent {
        TooltipContent { root: self.clone() }
    }
}

impl std::fmt::Debug for Tooltip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tooltip")
            .field("id", &self.shared.content_id)
            .field("open", &self.is_open())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct TooltipTrigger {
    root: Tooltip,
}

impl TooltipTrigger {
    pub fn element(&self) -> &Element {
        &self.root.shared.trigger
    }

    pub fn pointer_enter(&self) {
        self.root.shared.schedule(true);
    }

    pub fn pointer_leave(&self) {
        self.root.shared.schedule(false);
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key == Key::Escape && self.root.is_open() {
            self.root.shared.hide_now();
            EventResult::Handled
        } else {
            EventResult::Ignored
        }
    }

    pub fn attrs(&self) -> Attributes {
        let open = self.root.is_open();
        Attributes::new()
            .set_opt("aria-describedby", open.then(|| self.root.shared.content_id.clone()))
            .set("data-state", if open { "open" } else { "closed" })
    }
}

#[derive(Clone, Debug)]
pub struct TooltipContent {
    root: Tooltip,
}

impl TooltipContent {
    pub fn is_rendered(&self) -> bool {
        self.root.is_open()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("tooltip").set("id", &self.root.shared.content_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_core::FocusHandle;
    use masterclass_overlay::overlay_manager;
    use masterclass_scheduler::TimerScheduler;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn setup() -> (Document, OverlayManager, TimerScheduler, Tooltip) {
        let doc = Document::new();
        let overlays = overlay_manager();
        let scheduler = TimerScheduler::manual();
        let tooltip = Tooltip::new(&doc, &overlays, scheduler.handle(), TooltipOptions::default());
        (doc, overlays, scheduler, tooltip)
    }

    #[test]
    fn test_open_delay() {
        let (_, overlays, scheduler, tooltip) = setup();
        tooltip.trigger().pointer_enter();
        scheduler.advance(399);
        assert!(!tooltip.content().is_rendered());
        scheduler.advance(1);
        assert!(tooltip.content().is_rendered());
        assert_eq!(overlays.open_count(), 1);
    }

    #[test]
    fn test_quick_pass_never_shows() {
        let (_, _, scheduler, tooltip) = setup();
        let trigger = tooltip.trigger();
        for _ in 0..5 {
            trigger.pointer_enter();
            scheduler.advance(200);
            trigger.pointer_leave();
            scheduler.advance(50);
        }
        scheduler.advance(1000);
        assert!(!tooltip.is_open());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_close_delay_and_reenter() {
        let (_, _, scheduler, tooltip) = setup();
        let trigger = tooltip.trigger();
        trigger.pointer_enter();
        scheduler.advance(400);

        trigger.pointer_leave();
        scheduler.advance(99);
        assert!(tooltip.is_open());
        // Re-entering replaces the close timer
        trigger.pointer_enter();
        scheduler.advance(50);
        assert!(tooltip.is_open());

        trigger.pointer_leave();
        scheduler.advance(100);
        assert!(!tooltip.is_open());
    }

    #[test]
    fn test_blur_and_escape_hide_immediately() {
        let (doc, _, scheduler, tooltip) = setup();
        let trigger = tooltip.trigger();

        trigger.element().focus();
        scheduler.advance(400);
        assert!(tooltip.is_open());
        doc.blur();
        assert!(!tooltip.is_open());

        trigger.pointer_enter();
        scheduler.advance(400);
        assert_eq!(trigger.key_down(&KeyEvent::new(Key::Escape)), EventResult::Handled);
        assert!(!tooltip.is_open());
        assert_eq!(trigger.key_down(&KeyEvent::new(Key::Escape)), EventResult::Ignored);
    }

    #[test]
    fn test_described_by_only_while_open() {
        let (_, _, scheduler, tooltip) = setup();
        let trigger = tooltip.trigger();
        assert!(!trigger.attrs().has("aria-describedby"));

        trigger.pointer_enter();
        scheduler.advance(400);
        let content_id = tooltip.content().attrs().get("id").map(str::to_owned);
        assert_eq!(trigger.attrs().get("aria-describedby").map(str::to_owned), content_id);
        assert_eq!(tooltip.content().attrs().role(), Some("tooltip"));
    }

    #[test]
    fn test_unmount_cancels_timer() {
        let (doc, overlays, scheduler, tooltip) = setup();
        let changes = Arc::new(AtomicU32::new(0));
        let counter = changes.clone();
        let tooltip = tooltip.on_open_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tooltip.trigger().pointer_enter();
        assert!(tooltip.has_pending_timer());
        drop(tooltip);

        assert_eq!(scheduler.pending_count(), 0);
        scheduler.advance(1000);
        assert_eq!(changes.load(Ordering::SeqCst), 0);
        assert_eq!(overlays.open_count(), 0);
        assert_eq!(doc.listened_elements(), 0);
    }

    #[test]
    fn test_custom_delays() {
        let doc = Document::new();
        let scheduler = TimerScheduler::manual();
        let options = TooltipOptions {
            open_delay_ms: 0,
            close_delay_ms: 0,
        };
        let tooltip = Tooltip::new(&doc, &overlay_manager(), scheduler.handle(), options);
        tooltip.trigger().pointer_enter();
        scheduler.tick();
        assert!(tooltip.is_open());
    }
}
