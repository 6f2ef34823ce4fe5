//! Highlight cursor and popup mounting shared by Select and Combobox
//!
//! Focus stays on the trigger (or input) while the popup is open; the
//! highlighted option is a virtual cursor announced via
//! `aria-activedescendant`. The cursor clamps at both ends.

use masterclass_core::NodeId;
use masterclass_overlay::{DismissCallback, OverlayConfig, OverlayHandle, OverlayManager, OverlayManagerExt};

/// A registered option
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OptionRecord {
    pub value: String,
    pub label: String,
    /// Generated element id, the `aria-activedescendant` target
    pub id: String,
}

/// Move the cursor one step, clamping at the ends
///
/// From no highlight, both directions land on the first option.
pub(crate) fn step(current: Option<usize>, count: usize, forward: bool) -> Option<usize> {
    let last = count.checked_sub(1)?;
    let next = match (current, forward) {
        (None, _) => 0,
        (Some(i), true) => (i + 1).min(last),
        (Some(i), false) => i.saturating_sub(1),
    };
    Some(next.min(last))
}

pub(crate) fn last(count: usize) -> Option<usize> {
    count.checked_sub(1)
}

pub(crate) fn first(count: usize) -> Option<usize> {
    (count > 0).then_some(0)
}

/// Mount the option list anchored to `anchor`
pub(crate) fn mount_popup(
    overlays: &OverlayManager,
    anchor: NodeId,
    content: NodeId,
    on_dismiss: DismissCallback,
) -> OverlayHandle {
    let handle = overlays.mount(OverlayConfig::listbox(anchor), Some(on_dismiss));
    overlays.add_node(handle, content);
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_step_from_nothing() {
        assert_eq!(step(None, 3, true), Some(0));
        assert_eq!(step(None, 3, false), Some(0));
        assert_eq!(step(None, 0, true), None);
    }

    #[test]
    fn test_step_clamps() {
        assert_eq!(step(Some(2), 3, true), Some(2));
        assert_eq!(step(Some(0), 3, false), Some(0));
        assert_eq!(step(Some(1), 3, true), Some(2));
    }

    proptest! {
        #[test]
        fn test_step_stays_in_bounds(current in proptest::option::of(0usize..20), count in 1usize..20, forward: bool) {
            let current = current.map(|c| c.min(count - 1));
            let next = step(current, count, forward).unwrap();
            prop_assert!(next < count);
        }
    }
}
