//! Combobox
//!
//! A text input that filters a listbox. Typing keeps DOM focus in the input
//! while the arrow keys move a virtual highlight through the *filtered*
//! options, announced with `aria-activedescendant`.
//!
//! Every edit re-filters (case-insensitive substring match on the label),
//! opens the popup and clears the highlight. Committing an option writes its
//! label into the input and its value into the controllable value.

use std::sync::{Arc, Mutex, Weak};

use masterclass_core::{
    Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, FocusChange,
    FocusHandle, Key, KeyEvent, LockExt, Subscription,
};
use masterclass_overlay::{DismissCallback, OverlayHandle, OverlayManager, OverlayManagerExt};
use tracing::debug;

use crate::listbox::{self, OptionRecord};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComboboxProps {
    pub value: Option<String>,
    pub default_value: String,
}

#[derive(Default)]
struct ComboboxState {
    options: Vec<OptionRecord>,
    elements: Vec<Element>,
    text: String,
    /// Index into the filtered list
    highlighted: Option<usize>,
    handle: Option<OverlayHandle>,
}

impl ComboboxState {
    /// Indices into `options` that match the current text, in render order
    fn filtered(&self) -> Vec<usize> {
        let needle = self.text.to_lowercase();
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| needle.is_empty() || o.label.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }
}

struct Shared {
    overlays: OverlayManager,
    doc: Document,
    input: Element,
    content: Element,
    listbox_id: String,
    value: ControllableState<String>,
    state: Mutex<ComboboxState>,
    focus_listener: Mutex<Option<Subscription>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let handle = self.state.locked().handle.take();
        if let Some(handle) = handle {
            self.overlays.unmount(handle);
        }
    }
}

#[derive(Clone)]
pub struct Combobox {
    shared: Arc<Shared>,
}

impl CompoundRoot for Combobox {
    const NAME: &'static str = "Combobox.Root";
}

impl Combobox {
    pub fn new(doc: &Document, overlays: &OverlayManager, props: ComboboxProps) -> Self {
        let input = doc.create_element();
        let shared = Arc::new(Shared {
            overlays: overlays.clone(),
            doc: doc.clone(),
            input: input.clone(),
            content: doc.create_element(),
            listbox_id: doc.use_id("combobox-listbox"),
            value: ControllableState::new(props.value, props.default_value),
            state: Mutex::new(ComboboxState::default()),
            focus_listener: Mutex::new(None),
        });

        let weak = Arc::downgrade(&shared);
        let listener = input.on_focus_change(move |change| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let root = Combobox { shared };
            if change == FocusChange::Focused && !root.text().is_empty() {
                root.open_with(None);
            }
        });
        *shared.focus_listener.locked() = Some(listener);

        Self { shared }
    }

    pub fn on_value_change<F>(self, f: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.shared.value.set_on_change(Some(Arc::new(f)));
        self
    }

    pub fn value(&self) -> String {
        self.shared.value.get()
    }

    pub fn sync_value(&self, value: Option<String>) {
        self.shared.value.sync(value);
    }

    /// Current input text
    pub fn text(&self) -> String {
        self.shared.state.locked().text.clone()
    }

    pub fn is_open(&self) -> bool {
        self.shared.state.locked().handle.is_some()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.shared.state.locked().highlighted
    }

    /// Values of the options that match the input text
    pub fn filtered_values(&self) -> Vec<String> {
        let state = self.shared.state.locked();
        state
            .filtered()
            .into_iter()
            .map(|i| state.options[i].value.clone())
            .collect()
    }

    fn open_with(&self, highlighted: Option<usize>) {
        let shared = &self.shared;
        let mut state = shared.state.locked();
        state.highlighted = highlighted;
        if state.handle.is_some() {
            return;
        }
        let weak: Weak<Shared> = Arc::downgrade(shared);
        let on_dismiss: DismissCallback = Arc::new(move |reason| {
            if let Some(shared) = weak.upgrade() {
                debug!(?reason, "combobox dismissed");
                Combobox { shared }.close();
            }
        });
        let handle = listbox::mount_popup(
            &shared.overlays,
            shared.input.id(),
            shared.content.id(),
            on_dismiss,
        );
        for element in &state.elements {
            shared.overlays.add_node(handle, element.id());
        }
        state.handle = Some(handle);
        debug!(id = %shared.listbox_id, "combobox opened");
    }

    pub fn close(&self) {
        let handle = {
            let mut state = self.shared.state.locked();
            state.highlighted = None;
            state.handle.take()
        };
        if let Some(handle) = handle {
            self.shared.overlays.unmount(handle);
            debug!(id = %self.shared.listbox_id, "combobox closed");
        }
    }

    /// Commit the option at `option` (an index into all options)
    fn commit(&self, option: usize) {
        let record = self.shared.state.locked().options.get(option).cloned();
        let Some(record) = record else {
            return;
        };
        self.shared.input.focus();
        self.shared.value.set(record.value);
        self.shared.state.locked().text = record.label;
        self.close();
    }

    fn set_highlighted(&self, index: Option<usize>) {
        self.shared.state.locked().highlighted = index;
    }

    pub fn input(&self) -> ComboboxInput {
        ComboboxInput { root: self.clone() }
    }

    pub fn content(&self) -> ComboboxContent {
        ComboboxContent { root: self.clone() }
    }

    pub fn empty(&self) -> ComboboxEmpty {
        ComboboxEmpty { root: self.clone() }
    }

    /// Register an option; duplicate values keep the first registration
    pub fn option(&self, value: impl Into<String>, label: impl Into<String>) -> ComboboxOption {
        let value = value.into();
        let mut state = self.shared.state.locked();
        let element = match state.options.iter().position(|o| o.value == value) {
            Some(index) => state.elements[index].clone(),
            None => {
                let element = self.shared.doc.create_element();
                state.options.push(OptionRecord {
                    value: value.clone(),
                    label: label.into(),
                    id: self.shared.doc.use_id("combobox-option"),
                });
                state.elements.push(element.clone());
                if let Some(handle) = state.handle {
                    self.shared.overlays.add_node(handle, element.id());
                }
                element
            }
        };
        ComboboxOption {
            root: self.clone(),
            element,
            value,
        }
    }
}

impl std::fmt::Debug for Combobox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combobox")
            .field("id", &self.shared.listbox_id)
            .field("value", &self.value())
            .field("text", &self.text())
            .field("open", &self.is_open())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct ComboboxInput {
    root: Combobox,
}

impl ComboboxInput {
    pub fn element(&self) -> &Element {
        &self.root.shared.input
    }

    /// The user edited the text
    pub fn change(&self, text: impl Into<String>) {
        self.root.shared.state.locked().text = text.into();
        self.root.open_with(None);
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        let root = &self.root;
        let (open, current, filtered) = {
            let state = root.shared.state.locked();
            (state.handle.is_some(), state.highlighted, state.filtered())
        };
        let count = filtered.len();
        match (event.key, open) {
            (Key::ArrowDown, false) => root.open_with(listbox::first(count)),
            (Key::ArrowUp, false) => root.open_with(listbox::last(count)),
            (Key::ArrowDown, true) => root.set_highlighted(listbox::step(current, count, true)),
            (Key::ArrowUp, true) => root.set_highlighted(listbox::step(current, count, false)),
            (Key::Home, true) => root.set_highlighted(listbox::first(count)),
            (Key::End, true) => root.set_highlighted(listbox::last(count)),
            (Key::Enter, _) => {
                if let Some(option) = current.filter(|_| open).and_then(|i| filtered.get(i)) {
                    root.commit(*option);
                }
            }
            (Key::Escape, true) => root.close(),
            (Key::Escape, false) => root.shared.state.locked().text.clear(),
            _ => return EventResult::Ignored,
        }
        EventResult::Handled
    }

    pub fn attrs(&self) -> Attributes {
        let state = self.root.shared.state.locked();
        let open = state.handle.is_some();
        let filtered = state.filtered();
        let active = state
            .highlighted
            .and_then(|i| filtered.get(i))
            .map(|&i| state.options[i].id.clone());
        Attributes::with_role("combobox")
            .set("aria-haspopup", "listbox")
            .bool("aria-expanded", open)
            .set("aria-controls", &self.root.shared.listbox_id)
            .set_opt("aria-activedescendant", active)
            .set("aria-autocomplete", "list")
            .set("value", &state.text)
    }
}

#[derive(Clone, Debug)]
pub struct ComboboxContent {
    root: Combobox,
}

impl ComboboxContent {
    pub fn element(&self) -> &Element {
        &self.root.shared.content
    }

    pub fn is_rendered(&self) -> bool {
        self.root.is_open()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("listbox").set("id", &self.root.shared.listbox_id)
    }
}

#[derive(Clone, Debug)]
pub struct ComboboxOption {
    root: Combobox,
    element: Element,
    value: String,
}

impl ComboboxOption {
    /// (index into all options, index into the filtered list)
    fn position(&self) -> Option<(usize, Option<usize>)> {
        let state = self.root.shared.state.locked();
        let option = state.options.iter().position(|o| o.value == self.value)?;
        let filtered = state.filtered().iter().position(|&i| i == option);
        Some((option, filtered))
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_rendered(&self) -> bool {
        self.root.is_open() && matches!(self.position(), Some((_, Some(_))))
    }

    pub fn is_selected(&self) -> bool {
        self.root.value() == self.value
    }

    pub fn is_highlighted(&self) -> bool {
        match self.position() {
            Some((_, Some(filtered))) => self.root.highlighted() == Some(filtered),
            _ => false,
        }
    }

    pub fn click(&self) -> EventResult {
        match self.position() {
            Some((option, _)) => {
                self.root.commit(option);
                EventResult::Handled
            }
            None => EventResult::Ignored,
        }
    }

    pub fn pointer_move(&self) {
        if let Some((_, Some(filtered))) = self.position() {
            self.root.set_highlighted(Some(filtered));
        }
    }

    pub fn attrs(&self) -> Attributes {
        let id = self
            .position()
            .map(|(option, _)| self.root.shared.state.locked().options[option].id.clone());
        let selected = self.is_selected();
        Attributes::with_role("option")
            .set_opt("id", id)
            .bool("aria-selected", selected)
            .flag("data-highlighted", self.is_highlighted())
            .set_opt("data-state", selected.then_some("selected"))
    }
}

/// Shown while open with no matching options
#[derive(Clone, Debug)]
pub struct ComboboxEmpty {
    root: Combobox,
}

impl ComboboxEmpty {
    pub fn is_rendered(&self) -> bool {
        self.root.is_open() && self.root.filtered_values().is_empty()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("presentation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_overlay::overlay_manager;
    use proptest::prelude::*;

    const FRAMEWORKS: [(&str, &str); 4] = [
        ("react", "React"),
        ("vue", "Vue"),
        ("svelte", "Svelte"),
        ("solid", "SolidJS"),
    ];

    fn setup() -> (Document, OverlayManager, Combobox, Vec<ComboboxOption>) {
        let doc = Document::new();
        let overlays = overlay_manager();
        let combobox = Combobox::new(&doc, &overlays, ComboboxProps::default());
        let options = FRAMEWORKS
            .iter()
            .map(|(v, l)| combobox.option(*v, *l))
            .collect();
        (doc, overlays, combobox, options)
    }

    fn rendered(options: &[ComboboxOption]) -> Vec<&str> {
        options
            .iter()
            .filter(|o| o.is_rendered())
            .map(|o| o.value())
            .collect()
    }

    #[test]
    fn test_typing_filters_case_insensitively() {
        let (_, _, combobox, options) = setup();
        combobox.input().change("S");
        assert!(combobox.is_open());
        assert_eq!(rendered(&options), vec!["svelte", "solid"]);
        assert!(!combobox.empty().is_rendered());
    }

    #[test]
    fn test_no_match_shows_empty() {
        let (_, _, combobox, options) = setup();
        combobox.input().change("angular");
        assert!(rendered(&options).is_empty());
        assert!(combobox.empty().is_rendered());
    }

    #[test]
    fn test_edit_resets_highlight() {
        let (_, _, combobox, _) = setup();
        let input = combobox.input();
        input.key_down(&KeyEvent::new(Key::ArrowDown));
        input.key_down(&KeyEvent::new(Key::ArrowDown));
        assert_eq!(combobox.highlighted(), Some(1));
        input.change("v");
        assert_eq!(combobox.highlighted(), None);
        assert!(!input.attrs().has("aria-activedescendant"));
    }

    #[test]
    fn test_enter_commits_label_and_value() {
        let (doc, _, combobox, options) = setup();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let log = changes.clone();
        let combobox = combobox.on_value_change(move |v| log.locked().push(v));
        let input = combobox.input();
        input.element().focus();

        input.change("sol");
        input.key_down(&KeyEvent::new(Key::ArrowDown));
        assert!(options[3].is_highlighted());
        assert_eq!(
            input.attrs().get("aria-activedescendant"),
            options[3].attrs().get("id")
        );
        input.key_down(&KeyEvent::new(Key::Enter));

        assert_eq!(combobox.value(), "solid");
        assert_eq!(combobox.text(), "SolidJS");
        assert!(!combobox.is_open());
        assert_eq!(*changes.locked(), vec!["solid".to_owned()]);
        assert_eq!(doc.active_element(), Some(input.element().id()));
    }

    #[test]
    fn test_click_commits_and_refocuses_input() {
        let (doc, _, combobox, options) = setup();
        combobox.input().change("v");
        doc.blur();
        options[1].click();
        assert_eq!(combobox.text(), "Vue");
        assert_eq!(doc.active_element(), Some(combobox.input().element().id()));
        assert!(!combobox.is_open());
    }

    #[test]
    fn test_escape_closes_then_clears() {
        let (_, _, combobox, _) = setup();
        let input = combobox.input();
        input.change("re");
        input.key_down(&KeyEvent::new(Key::Escape));
        assert!(!combobox.is_open());
        assert_eq!(combobox.text(), "re");
        input.key_down(&KeyEvent::new(Key::Escape));
        assert_eq!(combobox.text(), "");
    }

    #[test]
    fn test_home_end_only_while_open() {
        let (_, _, combobox, _) = setup();
        let input = combobox.input();
        assert_eq!(input.key_down(&KeyEvent::new(Key::End)), EventResult::Ignored);
        assert!(!combobox.is_open());

        input.key_down(&KeyEvent::new(Key::ArrowUp));
        assert_eq!(combobox.highlighted(), Some(3));
        input.key_down(&KeyEvent::new(Key::Home));
        assert_eq!(combobox.highlighted(), Some(0));
    }

    #[test]
    fn test_focus_reopens_with_text() {
        let (doc, _, combobox, _) = setup();
        let input = combobox.input();
        input.element().focus();
        assert!(!combobox.is_open());

        input.change("vue");
        combobox.close();
        doc.blur();
        input.element().focus();
        assert!(combobox.is_open());
    }

    #[test]
    fn test_outside_pointer_closes() {
        let (doc, overlays, combobox, options) = setup();
        combobox.input().change("s");
        assert!(!overlays.handle_pointer_down(Some(options[2].element().id())));
        assert!(!overlays.handle_pointer_down(Some(combobox.input().element().id())));
        let outside = doc.create_element();
        assert!(overlays.handle_pointer_down(Some(outside.id())));
        assert!(!combobox.is_open());
    }

    proptest! {
        #[test]
        fn test_filter_matches_exactly_the_containing_labels(text in "[a-zA-Z]{0,3}") {
            let (_, _, combobox, options) = setup();
            combobox.input().change(text.clone());
            let needle = text.to_lowercase();
            let expected: Vec<&str> = FRAMEWORKS
                .iter()
                .filter(|(_, l)| l.to_lowercase().contains(&needle))
                .map(|(v, _)| *v)
                .collect();
            prop_assert_eq!(rendered(&options), expected.clone());
            prop_assert_eq!(combobox.empty().is_rendered(), expected.is_empty());
        }
    }
}
