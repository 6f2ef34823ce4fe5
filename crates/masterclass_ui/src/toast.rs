//! Toast notifications
//!
//! [`ToastStore`] is an application-level store of toast records, built on
//! [`ExternalStore`] so any number of viewports (or other observers) see the
//! same snapshot. It is created once per application and passed around; it
//! is not a global.
//!
//! [`ToastViewport`] renders a store. Each toast it shows gets its own
//! countdown on the [`TimerScheduler`](masterclass_scheduler::TimerScheduler).
//! Hover or focus pauses the countdown, banking the time already spent;
//! leaving resumes it with only what is left.
//!
//! ```
//! use masterclass_scheduler::TimerScheduler;
//! use masterclass_ui::toast::{ToastStore, ToastVariant, ToastViewport};
//!
//! let scheduler = TimerScheduler::manual();
//! let store = ToastStore::new();
//! let viewport = ToastViewport::new(&store, scheduler.handle());
//!
//! store.add("Saved", ToastVariant::Success, 3000);
//! scheduler.advance(2999);
//! assert_eq!(viewport.toasts().len(), 1);
//! scheduler.advance(1);
//! assert!(viewport.toasts().is_empty());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use masterclass_core::{Attributes, ExternalStore, LockExt, Subscription};
use masterclass_scheduler::{SchedulerHandle, TimerGuard};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Info,
    Success,
    Error,
    Warning,
}

impl ToastVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastVariant::Info => "info",
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
            ToastVariant::Warning => "warning",
        }
    }

    /// Errors interrupt assistive technology, everything else waits its turn
    pub fn role(&self) -> &'static str {
        match self {
            ToastVariant::Error => "alert",
            _ => "status",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: String,
    pub message: String,
    pub variant: ToastVariant,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToastAction {
    Add(Toast),
    Dismiss(String),
}

/// Defaults for [`ToastStore::toast`], loadable from the `[toast]` config section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastOptions {
    pub default_duration_ms: u64,
    pub default_variant: ToastVariant,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            default_duration_ms: 5000,
            default_variant: ToastVariant::Info,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ToastStore {
    store: ExternalStore<Vec<Toast>>,
    counter: Arc<AtomicU64>,
    options: ToastOptions,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    pub fn new() -> Self {
        Self::with_options(ToastOptions::default())
    }

    pub fn with_options(options: ToastOptions) -> Self {
        Self {
            store: ExternalStore::new(Vec::new()),
            counter: Arc::new(AtomicU64::new(0)),
            options,
        }
    }

    pub fn options(&self) -> ToastOptions {
        self.options
    }

    /// Append a toast and return its id (`toast-1`, `toast-2`, ...)
    pub fn add(&self, message: impl Into<String>, variant: ToastVariant, duration_ms: u64) -> String {
        let id = format!("toast-{}", self.counter.fetch_add(1, Ordering::Relaxed) + 1);
        self.dispatch(ToastAction::Add(Toast {
            id: id.clone(),
            message: message.into(),
            variant,
            duration_ms,
        }));
        id
    }

    /// Add with the default variant and duration
    pub fn toast(&self, message: impl Into<String>) -> String {
        self.add(message, self.options.default_variant, self.options.default_duration_ms)
    }

    /// Remove a toast. Unknown ids are ignored.
    pub fn dismiss(&self, id: &str) {
        self.dispatch(ToastAction::Dismiss(id.to_owned()));
    }

    pub fn dispatch(&self, action: ToastAction) {
        let changed = self.store.dispatch_with(|toasts| match &action {
            ToastAction::Add(toast) => {
                toasts.push(toast.clone());
                true
            }
            ToastAction::Dismiss(id) => {
                let before = toasts.len();
                toasts.retain(|t| &t.id != id);
                toasts.len() != before
            }
        });
        if changed {
            debug!(?action, "toast store updated");
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<Toast>> {
        self.store.snapshot()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<Vec<Toast>>) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.store.listener_count()
    }
}

#[derive(Debug)]
struct Countdown {
    remaining_ms: u64,
    started_at: u64,
    paused: bool,
    timer: Option<TimerGuard>,
}

struct ViewportShared {
    store: ToastStore,
    scheduler: SchedulerHandle,
    countdowns: Mutex<FxHashMap<String, Countdown>>,
    subscription: Mutex<Option<Subscription>>,
}

impl ViewportShared {
    fn start_timer(&self, id: &str, delay_ms: u64) -> TimerGuard {
        let store = self.store.clone();
        let id = id.to_owned();
        self.scheduler.timeout(delay_ms, "toast-dismiss", move || {
            debug!(%id, "toast expired");
            store.dismiss(&id);
        })
    }

    /// Start countdowns for new toasts and drop those of removed ones
    fn sync(&self, toasts: &[Toast]) {
        let now = self.scheduler.now_ms();
        let removed: Vec<Countdown> = {
            let mut countdowns = self.countdowns.locked();
            for toast in toasts {
                if !countdowns.contains_key(&toast.id) {
                    let timer = self.start_timer(&toast.id, toast.duration_ms);
                    countdowns.insert(
                        toast.id.clone(),
                        Countdown {
                            remaining_ms: toast.duration_ms,
                            started_at: now,
                            paused: false,
                            timer: Some(timer),
                        },
                    );
                }
            }
            let stale: Vec<String> = countdowns
                .keys()
                .filter(|id| !toasts.iter().any(|t| &t.id == *id))
                .cloned()
                .collect();
            stale.iter().filter_map(|id| countdowns.remove(id)).collect()
        };
        drop(removed);
    }

    fn pause(&self, id: &str) {
        let now = self.scheduler.now_ms();
        let timer = {
            let mut countdowns = self.countdowns.locked();
            let Some(countdown) = countdowns.get_mut(id) else {
                return;
            };
            if countdown.paused {
                return;
            }
            let elapsed = now.saturating_sub(countdown.started_at);
            countdown.remaining_ms = countdown.remaining_ms.saturating_sub(elapsed);
            countdown.paused = true;
            debug!(%id, remaining_ms = countdown.remaining_ms, "toast paused");
            countdown.timer.take()
        };
        drop(timer);
    }

    fn resume(&self, id: &str) {
        let now = self.scheduler.now_ms();
        let mut countdowns = self.countdowns.locked();
        let Some(countdown) = countdowns.get_mut(id) else {
            return;
        };
        if !countdown.paused {
            return;
        }
        countdown.paused = false;
        countdown.started_at = now;
        countdown.timer = Some(self.start_timer(id, countdown.remaining_ms));
        debug!(%id, remaining_ms = countdown.remaining_ms, "toast resumed");
    }
}

/// Renders a [`ToastStore`] and owns the per-toast countdowns
///
/// Dropping the viewport cancels every countdown and unsubscribes.
#[derive(Clone)]
pub struct ToastViewport {
    shared: Arc<ViewportShared>,
}

impl ToastViewport {
    pub fn new(store: &ToastStore, scheduler: SchedulerHandle) -> Self {
        let shared = Arc::new(ViewportShared {
            store: store.clone(),
            scheduler,
            countdowns: Mutex::new(FxHashMap::default()),
            subscription: Mutex::new(None),
        });

        let weak: Weak<ViewportShared> = Arc::downgrade(&shared);
        let subscription = store.subscribe(move |toasts| {
            if let Some(shared) = weak.upgrade() {
                shared.sync(toasts);
            }
        });
        *shared.subscription.locked() = Some(subscription);
        shared.sync(&store.snapshot());

        Self { shared }
    }

    pub fn store(&self) -> &ToastStore {
        &self.shared.store
    }

    /// One part per toast, oldest first
    pub fn toasts(&self) -> Vec<ToastItem> {
        self.shared
            .store
            .snapshot()
            .iter()
            .map(|toast| ToastItem {
                viewport: self.clone(),
                toast: toast.clone(),
            })
            .collect()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("region")
            .set("aria-live", "polite")
            .set("aria-label", "Notifications")
    }
}

impl std::fmt::Debug for ToastViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastViewport")
            .field("countdowns", &self.shared.countdowns.locked().len())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct ToastItem {
    viewport: ToastViewport,
    toast: Toast,
}

impl ToastItem {
    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    pub fn id(&self) -> &str {
        &self.toast.id
    }

    pub fn message(&self) -> &str {
        &self.toast.message
    }

    pub fn variant(&self) -> ToastVariant {
        self.toast.variant
    }

    pub fn pointer_enter(&self) {
        self.viewport.shared.pause(&self.toast.id);
    }

    pub fn pointer_leave(&self) {
        self.viewport.shared.resume(&self.toast.id);
    }

    pub fn focus(&self) {
        self.viewport.shared.pause(&self.toast.id);
    }

    pub fn blur(&self) {
        self.viewport.shared.resume(&self.toast.id);
    }

    pub fn is_paused(&self) -> bool {
        self.viewport
            .shared
            .countdowns
            .locked()
            .get(&self.toast.id)
            .is_some_and(|c| c.paused)
    }

    /// Time left on the countdown, as of the last pause or resume
    pub fn remaining_ms(&self) -> Option<u64> {
        self.viewport
            .shared
            .countdowns
            .locked()
            .get(&self.toast.id)
            .map(|c| c.remaining_ms)
    }

    /// The close button
    pub fn close(&self) {
        self.viewport.shared.store.dismiss(&self.toast.id);
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role(self.toast.variant.role())
            .set("data-variant", self.toast.variant.as_str())
            .flag("data-paused", self.is_paused())
    }

    pub fn close_attrs(&self) -> Attributes {
        Attributes::new().set("aria-label", "Dismiss notification")
    }
}
