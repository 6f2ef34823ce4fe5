//! Finite state machines for interaction states
//!
//! Interaction states (hover/press/drag of a thumb, open/closed of an overlay,
//! pending/visible of a tooltip) are small enums that react to numeric events
//! from [`crate::events::event_types`] or a primitive's own event module.

use std::hash::Hash;

/// Trait for state types that react to events
///
/// # Example
///
/// ```
/// use masterclass_core::events::event_types::*;
/// use masterclass_core::fsm::StateTransitions;
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum Hover {
///     Idle,
///     Hovered,
/// }
///
/// impl StateTransitions for Hover {
///     fn on_event(&self, event: u32) -> Option<Self> {
///         match (self, event) {
///             (Hover::Idle, POINTER_ENTER) => Some(Hover::Hovered),
///             (Hover::Hovered, POINTER_LEAVE) => Some(Hover::Idle),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Hover::Idle.on_event(POINTER_ENTER), Some(Hover::Hovered));
/// ```
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;
}

/// A state value plus the bookkeeping to drive it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Machine<S: StateTransitions> {
    state: S,
}

impl<S: StateTransitions> Machine<S> {
    pub fn new(initial: S) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> S {
        self.state
    }

    /// Feed an event. Returns true when the state changed.
    pub fn send(&mut self, event: u32) -> bool {
        match self.state.on_event(event) {
            Some(next) if next != self.state => {
                tracing::trace!(from = ?self.state, to = ?next, event, "state transition");
                self.state = next;
                true
            }
            _ => false,
        }
    }

    /// Force a state, bypassing the transition table
    pub fn reset(&mut self, state: S) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_types::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    enum Toggle {
        #[default]
        Off,
        On,
    }

    impl StateTransitions for Toggle {
        fn on_event(&self, event: u32) -> Option<Self> {
            match (self, event) {
                (Toggle::Off, POINTER_DOWN) => Some(Toggle::On),
                (Toggle::On, POINTER_DOWN) => Some(Toggle::Off),
                (_, POINTER_MOVE) => Some(*self),
                _ => None,
            }
        }
    }

    #[test]
    fn test_machine_send() {
        let mut machine = Machine::new(Toggle::Off);
        assert!(machine.send(POINTER_DOWN));
        assert_eq!(machine.state(), Toggle::On);

        // Self-transition is not a change
        assert!(!machine.send(POINTER_MOVE));
        // Unknown event is ignored
        assert!(!machine.send(KEY_DOWN));
        assert_eq!(machine.state(), Toggle::On);
    }
}
