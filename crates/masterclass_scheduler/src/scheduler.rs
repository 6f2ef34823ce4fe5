//! Timer scheduler
//!
//! Owns every pending delay timer of an application: tooltip open/close
//! delays, toast countdowns, debounced saves. Timers fire from [`tick`]
//! (driven by the host event loop) or, with a [`ManualClock`], from
//! [`advance`], which steps time through each due timer in order.
//!
//! Primitives hold a [`SchedulerHandle`] (weak) rather than the scheduler
//! itself, and wrap their timers in a [`TimerGuard`] so that unmounting
//! cancels whatever is still pending.
//!
//! [`tick`]: TimerScheduler::tick
//! [`advance`]: TimerScheduler::advance

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use slotmap::{new_key_type, SlotMap};
use tracing::{trace, warn};

use crate::clock::{Clock, ManualClock, SystemClock};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

type TimerCallback = Box<dyn FnOnce() + Send>;

struct Timer {
    due_ms: u64,
    /// Tie-breaker so timers due at the same instant fire in schedule order
    seq: u64,
    label: &'static str,
    callback: TimerCallback,
}

#[derive(Default)]
struct SchedulerInner {
    timers: SlotMap<TimerId, Timer>,
    next_seq: u64,
}

impl SchedulerInner {
    fn insert(&mut self, due_ms: u64, label: &'static str, callback: TimerCallback) -> TimerId {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.timers.insert(Timer {
            due_ms,
            seq,
            label,
            callback,
        })
    }

    fn earliest(&self) -> Option<(TimerId, u64)> {
        self.timers
            .iter()
            .min_by_key(|(_, t)| (t.due_ms, t.seq))
            .map(|(id, t)| (id, t.due_ms))
    }

    /// Remove the earliest timer due at or before `now`
    fn take_due(&mut self, now: u64) -> Option<Timer> {
        match self.earliest() {
            Some((id, due)) if due <= now => self.timers.remove(id),
            _ => None,
        }
    }
}

fn lock(inner: &Mutex<SchedulerInner>) -> MutexGuard<'_, SchedulerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fire(timer: Timer) {
    trace!(label = timer.label, due = timer.due_ms, "timer fired");
    (timer.callback)();
}

/// The application's timer queue
pub struct TimerScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    clock: Arc<dyn Clock>,
    manual: Option<ManualClock>,
}

impl TimerScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner::default())),
            clock,
            manual: None,
        }
    }

    /// Scheduler on wall-clock time
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }

    /// Scheduler on a [`ManualClock`] starting at 0, for deterministic tests
    pub fn manual() -> Self {
        let clock = ManualClock::new();
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner::default())),
            clock: Arc::new(clock.clone()),
            manual: Some(clock),
        }
    }

    /// Weak handle for primitives
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn schedule<F>(&self, delay_ms: u64, label: &'static str, f: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        let due = self.now_ms().saturating_add(delay_ms);
        let id = lock(&self.inner).insert(due, label, Box::new(f));
        trace!(label, due, "timer scheduled");
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        lock(&self.inner).timers.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        lock(&self.inner).timers.contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.inner).timers.len()
    }

    /// Due time of the next timer, if any
    pub fn next_due_ms(&self) -> Option<u64> {
        lock(&self.inner).earliest().map(|(_, due)| due)
    }

    /// Fire every timer due at the current time, earliest first
    ///
    /// Callbacks run with the queue unlocked, so they may schedule or cancel.
    /// A zero-delay timer scheduled by a callback fires in the same tick.
    pub fn tick(&self) -> usize {
        let now = self.now_ms();
        let mut fired = 0;
        loop {
            let Some(timer) = lock(&self.inner).take_due(now) else {
                break;
            };
            fire(timer);
            fired += 1;
        }
        fired
    }

    /// Move a manual clock forward by `ms`, firing timers at their due times
    ///
    /// Each timer observes the clock at exactly its due time, so timers
    /// scheduled by callbacks during the window fire too if they fall inside
    /// it. On a non-manual clock this only ticks.
    pub fn advance(&self, ms: u64) -> usize {
        let Some(clock) = &self.manual else {
            warn!("advance() called on a scheduler without a manual clock");
            return self.tick();
        };

        let target = clock.now_ms().saturating_add(ms);
        let mut fired = 0;
        loop {
            let timer = {
                let mut inner = lock(&self.inner);
                match inner.earliest() {
                    Some((id, due)) if due <= target => {
                        if due > clock.now_ms() {
                            clock.set(due);
                        }
                        inner.timers.remove(id)
                    }
                    _ => None,
                }
            };
            let Some(timer) = timer else {
                break;
            };
            fire(timer);
            fired += 1;
        }
        clock.set(target);
        fired
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for TimerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerScheduler")
            .field("now_ms", &self.now_ms())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Weak reference to a [`TimerScheduler`]
///
/// Scheduling through a handle whose scheduler is gone is a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
    clock: Arc<dyn Clock>,
}

impl SchedulerHandle {
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn schedule<F>(&self, delay_ms: u64, label: &'static str, f: F) -> Option<TimerId>
    where
        F: FnOnce() + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let due = self.now_ms().saturating_add(delay_ms);
        let id = lock(&inner).insert(due, label, Box::new(f));
        trace!(label, due, "timer scheduled");
        Some(id)
    }

    /// Schedule and wrap in a guard that cancels on drop
    pub fn timeout<F>(&self, delay_ms: u64, label: &'static str, f: F) -> TimerGuard
    where
        F: FnOnce() + Send + 'static,
    {
        TimerGuard {
            handle: self.clone(),
            id: self.schedule(delay_ms, label, f),
        }
    }

    pub fn cancel(&self, id: TimerId) -> bool {
        match self.inner.upgrade() {
            Some(inner) => lock(&inner).timers.remove(id).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        match self.inner.upgrade() {
            Some(inner) => lock(&inner).timers.contains_key(id),
            None => false,
        }
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A pending timer that is cancelled when the guard drops
#[must_use = "dropping a TimerGuard cancels the timer"]
#[derive(Debug)]
pub struct TimerGuard {
    handle: SchedulerHandle,
    id: Option<TimerId>,
}

impl TimerGuard {
    pub fn id(&self) -> Option<TimerId> {
        self.id
    }

    pub fn is_pending(&self) -> bool {
        self.id.is_some_and(|id| self.handle.is_pending(id))
    }

    /// Cancel now. Returns true if the timer had not fired yet.
    pub fn cancel(mut self) -> bool {
        self.id
            .take()
            .is_some_and(|id| self.handle.cancel(id))
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn bump(c: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let c = c.clone();
        move || {
            c.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_fires_at_due_time() {
        let scheduler = TimerScheduler::manual();
        let fired = counter();
        scheduler.schedule(3000, "test", bump(&fired));

        assert_eq!(scheduler.advance(2999), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_cancel() {
        let scheduler = TimerScheduler::manual();
        let fired = counter();
        let id = scheduler.schedule(10, "test", bump(&fired));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.advance(100);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_order_and_clock_during_callbacks() {
        let scheduler = TimerScheduler::manual();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = scheduler.handle();

        for (delay, tag) in [(300, "c"), (100, "a"), (100, "b")] {
            let seen = seen.clone();
            let h = handle.clone();
            scheduler.schedule(delay, "test", move || {
                seen.lock().unwrap().push((tag, h.now_ms()));
            });
        }

        scheduler.advance(1000);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("a", 100), ("b", 100), ("c", 300)]
        );
        assert_eq!(scheduler.now_ms(), 1000);
    }

    #[test]
    fn test_chained_timer_inside_window() {
        let scheduler = TimerScheduler::manual();
        let fired = counter();
        let handle = scheduler.handle();
        let inner = bump(&fired);
        scheduler.schedule(100, "outer", move || {
            let _ = handle.schedule(50, "inner", inner);
        });

        scheduler.advance(149);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        scheduler.advance(1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_cancels_on_drop() {
        let scheduler = TimerScheduler::manual();
        let fired = counter();
        let guard = scheduler.handle().timeout(10, "test", bump(&fired));
        assert!(guard.is_pending());
        drop(guard);
        scheduler.advance(10);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handle_outlived_scheduler() {
        let scheduler = TimerScheduler::manual();
        let handle = scheduler.handle();
        drop(scheduler);
        assert!(!handle.is_alive());
        assert!(handle.schedule(10, "test", || {}).is_none());
    }

    #[test]
    fn test_tick_fires_due() {
        let scheduler = TimerScheduler::manual();
        let fired = counter();
        scheduler.schedule(0, "now", bump(&fired));
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
