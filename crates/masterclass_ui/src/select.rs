//! Select
//!
//! A button that opens a listbox. Focus stays on the trigger the whole time
//! and the highlighted option is announced with `aria-activedescendant`.
//! Committing an option (click, or Enter/Space on the highlight) sets the
//! value, closes the popup and focuses the trigger. Escape and outside
//! pointer-down close without committing.
//!
//! ```
//! use masterclass_core::{Document, Key, KeyEvent};
//! use masterclass_overlay::overlay_manager;
//! use masterclass_ui::select::{Select, SelectProps};
//!
//! let doc = Document::new();
//! let select = Select::new(&doc, &overlay_manager(), SelectProps::default());
//! select.option("apple", "Apple");
//! select.option("pear", "Pear");
//!
//! let trigger = select.trigger();
//! trigger.key_down(&KeyEvent::new(Key::ArrowDown));
//! trigger.key_down(&KeyEvent::new(Key::ArrowDown));
//! trigger.key_down(&KeyEvent::new(Key::Enter));
//! assert_eq!(select.value(), "pear");
//! assert_eq!(select.value_part().text(), "Pear");
//! ```

use std::sync::{Arc, Mutex, Weak};

use masterclass_core::{
    Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, FocusHandle, Key,
    KeyEvent, LockExt,
};
use masterclass_overlay::{DismissCallback, OverlayHandle, OverlayManager, OverlayManagerExt};
use tracing::debug;

use crate::listbox::{self, OptionRecord};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectProps {
    pub value: Option<String>,
    /// `""` means nothing selected
    pub default_value: String,
    pub placeholder: String,
}

impl Default for SelectProps {
    fn default() -> Self {
        Self {
            value: None,
            default_value: String::new(),
            placeholder: "Select...".to_owned(),
        }
    }
}

#[derive(Default)]
struct SelectState {
    options: Vec<OptionRecord>,
    /// Option elements, parallel to `options`
    elements: Vec<Element>,
    highlighted: Option<usize>,
    handle: Option<OverlayHandle>,
}

struct Shared {
    doc: Document,
    overlays: OverlayManager,
    trigger: Element,
    content: Element,
    listbox_id: String,
    placeholder: String,
    value: ControllableState<String>,
    state: Mutex<SelectState>,
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
pub struct Select {
    shared: Arc<Shared>,
}

impl CompoundRoot for Select {
    const NAME: &'static str = "Select.Root";
}

impl Select {
    pub fn new(doc: &Document, overlays: &OverlayManager, props: SelectProps) -> Self {
        Self {
            shared: Arc::new(Shared {
                doc: doc.clone(),
                overlays: overlays.clone(),
                trigger: doc.create_element(),
                content: doc.create_element(),
                listbox_id: doc.use_id("listbox"),
                placeholder: props.placeholder,
                value: ControllableState::new(props.value, props.default_value),
                state: Mutex::new(SelectState::default()),
            }),
        }
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

    pub fn is_open(&self) -> bool {
        self.shared.state.locked().handle.is_some()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.shared.state.locked().highlighted
    }

    /// Label of the selected option, if one is registered for the value
    pub fn selected_label(&self) -> Option<String> {
        let value = self.value();
        self.shared
            .state
            .locked()
            .options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.clone())
    }

    fn open_with(&self, highlight: impl FnOnce(usize) -> Option<usize>) {
        let shared = &self.shared;
        let mut state = shared.state.locked();
        state.highlighted = highlight(state.options.len());
        if state.handle.is_some() {
            return;
        }
        let weak: Weak<Shared> = Arc::downgrade(shared);
        let on_dismiss: DismissCallback = Arc::new(move |reason| {
            if let Some(shared) = weak.upgrade() {
                debug!(?reason, "select dismissed");
                Select { shared }.close();
            }
        });
        let handle = listbox::mount_popup(
            &shared.overlays,
            shared.trigger.id(),
            shared.content.id(),
            on_dismiss,
        );
        for element in &state.elements {
            shared.overlays.add_node(handle, element.id());
        }
        state.handle = Some(handle);
        debug!(id = %shared.listbox_id, highlighted = ?state.highlighted, "select opened");
    }

    pub fn open(&self) {
        self.open_with(listbox::first);
    }

    /// Close without committing
    pub fn close(&self) {
        let handle = {
            let mut state = self.shared.state.locked();
            state.highlighted = None;
            state.handle.take()
        };
        if let Some(handle) = handle {
            self.shared.overlays.unmount(handle);
            debug!(id = %self.shared.listbox_id, "select closed");
        }
    }

    fn commit(&self, index: usize) {
        let value = self
            .shared
            .state
            .locked()
            .options
            .get(index)
            .map(|o| o.value.clone());
        let Some(value) = value else {
            return;
        };
        self.shared.value.set(value);
        self.close();
        self.shared.trigger.focus();
    }

    fn set_highlighted(&self, index: Option<usize>) {
        self.shared.state.locked().highlighted = index;
    }

    pub fn trigger(&self) -> SelectTrigger {
        SelectTrigger { root: self.clone() }
    }

    pub fn value_part(&self) -> SelectValue {
        SelectValue { root: self.clone() }
    }

    pub fn content(&self) -> SelectContent {
        SelectContent { root: self.clone() }
    }

    /// Register an option. A value that is already registered keeps its
    /// first label and id.
    pub fn option(&self, value: impl Into<String>, label: impl Into<String>) -> SelectOption {
        let value = value.into();
        let mut state = self.shared.state.locked();
        let element = match state.options.iter().position(|o| o.value == value) {
            Some(index) => state.elements[index].clone(),
            None => {
                let element = self.shared.doc.create_element();
                state.options.push(OptionRecord {
                    value: value.clone(),
                    label: label.into(),
                    id: self.shared.doc.use_id("option"),
                });
                state.elements.push(element.clone());
                if let Some(handle) = state.handle {
                    self.shared.overlays.add_node(handle, element.id());
                }
                element
            }
        };
        SelectOption {
            root: self.clone(),
            element,
            value,
        }
    }
}

impl std::fmt::Debug for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("id", &self.shared.listbox_id)
            .field("value", &self.value())
            .field("open", &self.is_open())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct SelectTrigger {
    root: Select,
}

impl SelectTrigger {
    pub fn element(&self) -> &Element {
        &self.root.shared.trigger
    }

    pub fn click(&self) -> EventResult {
        if self.root.is_open() {
            self.root.close();
        } else {
            self.root.open();
        }
        EventResult::Handled
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        let root = &self.root;
        if !root.is_open() {
            match event.key {
                Key::Enter | Key::Space | Key::ArrowDown => root.open_with(listbox::first),
                Key::ArrowUp => root.open_with(listbox::last),
                _ => return EventResult::Ignored,
            }
            return EventResult::Handled;
        }

        let (current, count) = {
            let state = root.shared.state.locked();
            (state.highlighted, state.options.len())
        };
        match event.key {
            Key::ArrowDown => root.set_highlighted(listbox::step(current, count, true)),
            Key::ArrowUp => root.set_highlighted(listbox::step(current, count, false)),
            Key::Home => root.set_highlighted(listbox::first(count)),
            Key::End => root.set_highlighted(listbox::last(count)),
            Key::Enter | Key::Space => {
                if let Some(index) = current {
                    root.commit(index);
                }
            }
            Key::Escape => root.close(),
            _ => return EventResult::Ignored,
        }
        EventResult::Handled
    }

    pub fn attrs(&self) -> Attributes {
        let state = self.root.shared.state.locked();
        let open = state.handle.is_some();
        let active = state
            .highlighted
            .filter(|_| open)
            .and_then(|i| state.options.get(i))
            .map(|o| o.id.clone());
        Attributes::with_role("combobox")
            .set("aria-haspopup", "listbox")
            .bool("aria-expanded", open)
            .set("aria-controls", &self.root.shared.listbox_id)
            .set_opt("aria-activedescendant", active)
    }
}

/// Selected label or the placeholder
#[derive(Clone, Debug)]
pub struct SelectValue {
    root: Select,
}

impl SelectValue {
    pub fn text(&self) -> String {
        self.root
            .selected_label()
            .unwrap_or_else(|| self.root.shared.placeholder.clone())
    }

    pub fn is_placeholder(&self) -> bool {
        self.root.selected_label().is_none()
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::new().flag("data-placeholder", self.is_placeholder())
    }
}

#[derive(Clone, Debug)]
pub struct SelectContent {
    root: Select,
}

impl SelectContent {
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
pub struct SelectOption {
    root: Select,
    element: Element,
    value: String,
}

impl SelectOption {
    fn index(&self) -> Option<usize> {
        self.root
            .shared
            .state
            .locked()
            .options
            .iter()
            .position(|o| o.value == self.value)
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_selected(&self) -> bool {
        self.root.value() == self.value
    }

    pub fn is_highlighted(&self) -> bool {
        let index = self.index();
        index.is_some() && index == self.root.highlighted()
    }

    pub fn click(&self) -> EventResult {
        match self.index() {
            Some(index) => {
                self.root.commit(index);
                EventResult::Handled
            }
            None => EventResult::Ignored,
        }
    }

    pub fn pointer_move(&self) {
        if let Some(index) = self.index() {
            self.root.set_highlighted(Some(index));
        }
    }

    pub fn attrs(&self) -> Attributes {
        let id = self
            .index()
            .and_then(|i| self.root.shared.state.locked().options.get(i).map(|o| o.id.clone()));
        let selected = self.is_selected();
        Attributes::with_role("option")
            .set_opt("id", id)
            .bool("aria-selected", selected)
            .flag("data-highlighted", self.is_highlighted())
            .set_opt("data-state", selected.then_some("selected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_overlay::overlay_manager;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fruit() -> (Document, OverlayManager, Select, Vec<SelectOption>) {
        let doc = Document::new();
        let overlays = overlay_manager();
        let select = Select::new(&doc, &overlays, SelectProps::default());
        let options = [("apple", "Apple"), ("banana", "Banana"), ("cherry", "Cherry")]
            .into_iter()
            .map(|(v, l)| select.option(v, l))
            .collect();
        (doc, overlays, select, options)
    }

    fn key(trigger: &SelectTrigger, key: Key) -> EventResult {
        trigger.key_down(&KeyEvent::new(key))
    }

    #[test]
    fn test_placeholder_until_selected() {
        let (_, _, select, _) = fruit();
        assert_eq!(select.value_part().text(), "Select...");
        assert!(select.value_part().attrs().has("data-placeholder"));
    }

    #[test]
    fn test_arrow_up_opens_at_last() {
        let (_, _, select, _) = fruit();
        let trigger = select.trigger();
        key(&trigger, Key::ArrowUp);
        assert!(select.is_open());
        assert_eq!(select.highlighted(), Some(2));
    }

    #[test]
    fn test_highlight_clamps() {
        let (_, _, select, _) = fruit();
        let trigger = select.trigger();
        key(&trigger, Key::ArrowDown);
        key(&trigger, Key::ArrowUp);
        assert_eq!(select.highlighted(), Some(0));
        key(&trigger, Key::End);
        key(&trigger, Key::ArrowDown);
        assert_eq!(select.highlighted(), Some(2));
        key(&trigger, Key::Home);
        assert_eq!(select.highlighted(), Some(0));
    }

    #[test]
    fn test_commit_fires_once_and_closes() {
        let (doc, overlays, select, options) = fruit();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = calls.clone();
        let select = select.on_value_change(move |v| log.locked().push(v));

        select.trigger().click();
        options[1].pointer_move();
        assert!(options[1].is_highlighted());
        assert!(!overlays.handle_pointer_down(Some(options[1].element().id())));
        options[1].click();

        assert_eq!(*calls.locked(), vec!["banana".to_owned()]);
        assert_eq!(select.value_part().text(), "Banana");
        assert!(!select.content().is_rendered());
        assert_eq!(overlays.open_count(), 0);
        assert_eq!(doc.active_element(), Some(select.trigger().element().id()));
        assert_eq!(options[1].attrs().get("aria-selected"), Some("true"));
    }

    #[test]
    fn test_enter_commits_highlighted() {
        let (_, _, select, _) = fruit();
        let trigger = select.trigger();
        key(&trigger, Key::Enter);
        key(&trigger, Key::ArrowDown);
        key(&trigger, Key::ArrowDown);
        key(&trigger, Key::Space);
        assert_eq!(select.value(), "cherry");
        assert!(!select.is_open());
    }

    #[test]
    fn test_escape_and_outside_close_without_commit() {
        let (doc, overlays, select, _) = fruit();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let select = select.on_value_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let trigger = select.trigger();

        key(&trigger, Key::ArrowDown);
        key(&trigger, Key::Escape);
        assert!(!select.is_open());

        trigger.click();
        let outside = doc.create_element();
        assert!(overlays.handle_pointer_down(Some(outside.id())));
        assert!(!select.is_open());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(select.value(), "");
    }

    #[test]
    fn test_active_descendant_only_while_open() {
        let (doc, _, select, options) = fruit();
        let trigger = select.trigger();
        trigger.element().focus();
        assert!(!trigger.attrs().has("aria-activedescendant"));

        key(&trigger, Key::ArrowDown);
        key(&trigger, Key::ArrowDown);
        let option_id = options[1].attrs().get("id").map(str::to_owned);
        assert_eq!(trigger.attrs().get("aria-activedescendant").map(str::to_owned), option_id);
        // Focus never leaves the trigger
        assert_eq!(doc.active_element(), Some(trigger.element().id()));

        key(&trigger, Key::Escape);
        assert!(!trigger.attrs().has("aria-activedescendant"));
    }

    #[test]
    fn test_duplicate_values_ignored() {
        let (_, _, select, _) = fruit();
        let again = select.option("apple", "Another apple");
        select.open();
        assert_eq!(select.shared.state.locked().options.len(), 3);
        again.click();
        assert_eq!(select.value_part().text(), "Apple");
    }

    #[test]
    fn test_controlled_value_wins() {
        let doc = Document::new();
        let select = Select::new(
            &doc,
            &overlay_manager(),
            SelectProps {
                value: Some("apple".into()),
                ..Default::default()
            },
        );
        let pear = select.option("pear", "Pear");
        select.option("apple", "Apple");
        select.open();
        pear.click();
        assert_eq!(select.value(), "apple");
        select.sync_value(Some("pear".into()));
        assert!(pear.is_selected());
    }

    #[test]
    fn test_empty_select_opens_without_highlight() {
        let doc = Document::new();
        let select = Select::new(&doc, &overlay_manager(), SelectProps::default());
        let trigger = select.trigger();
        key(&trigger, Key::ArrowDown);
        assert!(select.is_open());
        assert_eq!(select.highlighted(), None);
        assert_eq!(key(&trigger, Key::Enter), EventResult::Handled);
        assert!(select.is_open());
    }
}
