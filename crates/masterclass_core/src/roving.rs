//! Roving tabindex
//!
//! Exactly one item of a group is reachable with Tab (`tabindex=0`), the rest
//! are `tabindex=-1`. Arrow keys, Home, and End move both DOM focus and that
//! tab stop. The tab stop also follows focus that arrives by other means
//! (pointer clicks, programmatic focus) through [`RovingFocus::set_active`].
//!
//! Whether moving focus also *selects* something is up to the consumer: tabs
//! select on every move, a toolbar never does.

use crate::events::{Key, KeyEvent};
use crate::focus::{FocusHandle, FocusRegistry, FocusableRegistry};

/// Which arrow keys navigate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
    /// Both axes navigate
    Both,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
            Orientation::Both => "both",
        }
    }
}

/// A resolved navigation intent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    Next,
    Previous,
    First,
    Last,
}

impl Navigation {
    /// Map a key press to a navigation for the given orientation
    pub fn from_key(key: Key, orientation: Orientation) -> Option<Self> {
        use Orientation::*;
        match (key, orientation) {
            (Key::ArrowRight, Horizontal | Both) | (Key::ArrowDown, Vertical | Both) => {
                Some(Navigation::Next)
            }
            (Key::ArrowLeft, Horizontal | Both) | (Key::ArrowUp, Vertical | Both) => {
                Some(Navigation::Previous)
            }
            (Key::Home, _) => Some(Navigation::First),
            (Key::End, _) => Some(Navigation::Last),
            _ => None,
        }
    }

    /// Target index for this navigation, or None for an empty list
    ///
    /// With `wrap`, Next from the last item lands on the first and Previous
    /// from the first lands on the last. Without it both clamp.
    pub fn resolve(&self, current: usize, count: usize, wrap: bool) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let last = count - 1;
        let current = current.min(last);
        let target = match self {
            Navigation::First => 0,
            Navigation::Last => last,
            Navigation::Next if current == last => {
                if wrap {
                    0
                } else {
                    last
                }
            }
            Navigation::Next => current + 1,
            Navigation::Previous if current == 0 => {
                if wrap {
                    last
                } else {
                    0
                }
            }
            Navigation::Previous => current - 1,
        };
        Some(target)
    }
}

/// Options for [`RovingFocus`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RovingOptions {
    pub orientation: Orientation,
    pub wrap: bool,
    pub initial_index: usize,
}

impl Default for RovingOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            wrap: true,
            initial_index: 0,
        }
    }
}

/// Registry of items plus the index that holds the tab stop
#[derive(Clone, Debug)]
pub struct RovingFocus<H> {
    items: FocusRegistry<H>,
    options: RovingOptions,
    active: usize,
}

impl<H: FocusHandle + PartialEq + Clone> RovingFocus<H> {
    pub fn new(options: RovingOptions) -> Self {
        Self {
            items: FocusRegistry::new(),
            options,
            active: options.initial_index,
        }
    }

    pub fn options(&self) -> RovingOptions {
        self.options
    }

    pub fn items(&self) -> &FocusRegistry<H> {
        &self.items
    }

    pub fn register(&mut self, handle: H) -> usize {
        self.items.register(handle)
    }

    /// Remove an item, keeping the tab stop inside the list
    pub fn unregister(&mut self, handle: &H) -> bool {
        let removed = self.items.unregister(handle);
        if removed && self.active >= self.items.len() {
            self.active = self.items.len().saturating_sub(1);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_of(&self, handle: &H) -> Option<usize> {
        self.items.index_of(handle)
    }

    /// Index holding the tab stop, kept inside the registered items even
    /// when `initial_index` points past them
    pub fn active_index(&self) -> usize {
        self.active.min(self.items.len().saturating_sub(1))
    }

    /// Record that the item at `index` received focus
    pub fn set_active(&mut self, index: usize) {
        if index < self.items.len() {
            self.active = index;
        }
    }

    /// Record focus arriving on `handle`. Returns its index if it belongs here.
    pub fn set_active_handle(&mut self, handle: &H) -> Option<usize> {
        let index = self.items.index_of(handle)?;
        self.active = index;
        Some(index)
    }

    /// `0` for the tab stop, `-1` for everything else
    pub fn tab_index(&self, index: usize) -> i32 {
        if index == self.active_index() {
            0
        } else {
            -1
        }
    }

    /// Resolve a key press into a target without focusing it
    ///
    /// Moves the tab stop and returns the target index and handle. Callers
    /// that hold a lock around this registry should release it before calling
    /// `focus()` on the returned handle, since focus listeners re-enter.
    pub fn navigate(&mut self, event: &KeyEvent) -> Option<(usize, H)> {
        let nav = Navigation::from_key(event.key, self.options.orientation)?;
        self.navigate_to(nav)
    }

    pub fn navigate_to(&mut self, nav: Navigation) -> Option<(usize, H)> {
        let target = nav.resolve(self.active, self.items.len(), self.options.wrap)?;
        let handle = self.items.get(target)?.clone();
        self.active = target;
        Some((target, handle))
    }

    /// Resolve and focus in one step, for registries not shared behind a lock
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<usize> {
        let (index, handle) = self.navigate(event)?;
        handle.focus();
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Element};
    use proptest::prelude::*;

    fn group(doc: &Document, n: usize, options: RovingOptions) -> (RovingFocus<Element>, Vec<Element>) {
        let mut roving = RovingFocus::new(options);
        let items: Vec<Element> = (0..n).map(|_| doc.create_element()).collect();
        for item in &items {
            roving.register(item.clone());
        }
        (roving, items)
    }

    #[test]
    fn test_horizontal_wraps() {
        let doc = Document::new();
        let (mut roving, items) = group(&doc, 3, RovingOptions::default());

        assert_eq!(roving.handle_key(&Key::ArrowLeft.into()), Some(2));
        assert!(items[2].is_focused());
        assert_eq!(roving.handle_key(&Key::ArrowRight.into()), Some(0));
        assert!(items[0].is_focused());

        // Vertical keys are ignored for a horizontal group
        assert_eq!(roving.handle_key(&Key::ArrowDown.into()), None);
    }

    #[test]
    fn test_no_wrap_clamps() {
        let doc = Document::new();
        let (mut roving, _) = group(
            &doc,
            3,
            RovingOptions {
                orientation: Orientation::Vertical,
                wrap: false,
                initial_index: 2,
            },
        );
        assert_eq!(roving.handle_key(&Key::ArrowDown.into()), Some(2));
        roving.set_active(0);
        assert_eq!(roving.handle_key(&Key::ArrowUp.into()), Some(0));
    }

    #[test]
    fn test_both_orientation() {
        let doc = Document::new();
        let (mut roving, _) = group(
            &doc,
            4,
            RovingOptions {
                orientation: Orientation::Both,
                ..RovingOptions::default()
            },
        );
        assert_eq!(roving.handle_key(&Key::ArrowDown.into()), Some(1));
        assert_eq!(roving.handle_key(&Key::ArrowRight.into()), Some(2));
        assert_eq!(roving.handle_key(&Key::ArrowUp.into()), Some(1));
        assert_eq!(roving.handle_key(&Key::End.into()), Some(3));
    }

    #[test]
    fn test_empty_group_is_noop() {
        let mut roving: RovingFocus<Element> = RovingFocus::new(RovingOptions::default());
        assert_eq!(roving.handle_key(&Key::Home.into()), None);
    }

    #[test]
    fn test_unregister_keeps_tab_stop_in_range() {
        let doc = Document::new();
        let (mut roving, items) = group(&doc, 3, RovingOptions::default());
        roving.set_active(2);
        roving.unregister(&items[2]);
        assert_eq!(roving.active_index(), 1);
        assert_eq!(roving.tab_index(1), 0);
    }

    #[test]
    fn test_initial_index_past_end_falls_back_to_last() {
        let doc = Document::new();
        let (mut roving, items) = group(
            &doc,
            3,
            RovingOptions {
                initial_index: 5,
                ..RovingOptions::default()
            },
        );
        assert_eq!(roving.active_index(), 2);
        let stops: Vec<i32> = (0..3).map(|i| roving.tab_index(i)).collect();
        assert_eq!(stops, vec![-1, -1, 0]);

        assert_eq!(roving.handle_key(&Key::ArrowRight.into()), Some(0));
        assert!(items[0].is_focused());
    }

    proptest! {
        #[test]
        fn test_exactly_one_tab_stop(n in 1usize..12, initial in 0usize..20, keys in prop::collection::vec(0u8..6, 0..40)) {
            let doc = Document::new();
            let (mut roving, _) = group(&doc, n, RovingOptions { orientation: Orientation::Both, wrap: true, initial_index: initial });
            prop_assert_eq!((0..n).filter(|i| roving.tab_index(*i) == 0).count(), 1);
            for k in keys {
                let key = match k {
                    0 => Key::ArrowDown,
                    1 => Key::ArrowUp,
                    2 => Key::ArrowLeft,
                    3 => Key::ArrowRight,
                    4 => Key::Home,
                    _ => Key::End,
                };
                roving.handle_key(&key.into());
                let stops = (0..n).filter(|i| roving.tab_index(*i) == 0).count();
                prop_assert_eq!(stops, 1);
            }
        }

        #[test]
        fn test_wrap_at_edges(n in 1usize..20) {
            prop_assert_eq!(Navigation::Next.resolve(n - 1, n, true), Some(0));
            prop_assert_eq!(Navigation::Previous.resolve(0, n, true), Some(n - 1));
            prop_assert_eq!(Navigation::Next.resolve(n - 1, n, false), Some(n - 1));
        }

        #[test]
        fn test_home_end_idempotent(n in 1usize..20, start in 0usize..20) {
            let first = Navigation::First.resolve(start, n, true);
            prop_assert_eq!(first, Some(0));
            prop_assert_eq!(Navigation::First.resolve(0, n, true), Some(0));
            prop_assert_eq!(Navigation::Last.resolve(n - 1, n, true), Some(n - 1));
        }
    }
}
