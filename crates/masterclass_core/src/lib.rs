//! Masterclass Core
//!
//! Host-independent building blocks for headless UI primitives:
//!
//! - **Document**: focus tracking, focus listeners, and id generation
//! - **Focus registry**: ordered focusable handles with `focus_at`
//! - **Roving tabindex**: arrow-key/Home/End navigation with a single tab stop
//! - **Controllable state**: one API for controlled and uncontrolled values
//! - **External store**: subscribable state with atomic snapshots
//! - **State machines**: the `StateTransitions` trait and event constants
//!
//! Nothing in this crate renders. Primitives built on it describe their
//! output as [`Attributes`](attrs::Attributes) and react to the events in
//! [`events`].

pub mod attrs;
pub mod context;
pub mod controllable;
pub mod document;
pub mod error;
pub mod events;
pub mod focus;
pub mod fsm;
pub mod range;
pub mod roving;
pub mod store;
pub mod sync;

pub use attrs::Attributes;
pub use context::{CompoundRoot, ContextScope};
pub use controllable::{ControllableState, OnChange};
pub use document::{Document, Element, FocusChange, NodeId};
pub use error::PrimitiveError;
pub use events::{event_types, EventResult, Key, KeyEvent, Modifiers, Point, PointerId, Rect};
pub use focus::{FocusHandle, FocusRegistry, FocusableRegistry};
pub use fsm::{Machine, StateTransitions};
pub use range::NumericRange;
pub use roving::{Navigation, Orientation, RovingFocus, RovingOptions};
pub use store::{ExternalStore, Subscription};
pub use sync::LockExt;

/// Common imports for primitive implementations
pub mod prelude {
    pub use crate::attrs::Attributes;
    pub use crate::controllable::ControllableState;
    pub use crate::document::{Document, Element, FocusChange, NodeId};
    pub use crate::events::{EventResult, Key, KeyEvent, Point, Rect};
    pub use crate::focus::{FocusHandle, FocusRegistry, FocusableRegistry};
    pub use crate::fsm::StateTransitions;
    pub use crate::roving::{Navigation, Orientation, RovingFocus, RovingOptions};
    pub use crate::store::Subscription;
    pub use crate::sync::LockExt;
}
