//! Masterclass Scheduler
//!
//! Cancellable delay timers for headless primitives.
//!
//! # Example
//!
//! ```
//! use masterclass_scheduler::TimerScheduler;
//!
//! let scheduler = TimerScheduler::manual();
//! let handle = scheduler.handle();
//!
//! let guard = handle.timeout(400, "tooltip-open", || println!("open"));
//! scheduler.advance(399);
//! assert!(guard.is_pending());
//! scheduler.advance(1);
//! assert!(!guard.is_pending());
//! ```

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{SchedulerHandle, TimerGuard, TimerId, TimerScheduler};
