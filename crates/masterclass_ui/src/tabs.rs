//! Tabs
//!
//! A tab list with automatic activation: moving focus with the arrow keys
//! also selects the focused tab. Only the selected tab is a tab stop and
//! only the selected panel renders.
//!
//! # Example
//!
//! ```
//! use masterclass_core::{Document, Key, KeyEvent};
//! use masterclass_ui::tabs::{Tabs, TabsProps};
//!
//! let doc = Document::new();
//! let tabs = Tabs::new(&doc, TabsProps::with_default("account"));
//! let account = tabs.tab("account");
//! let password = tabs.tab("password");
//!
//! account.key_down(&KeyEvent::new(Key::ArrowRight));
//! assert_eq!(tabs.value(), "password");
//! assert!(tabs.panel("password").is_rendered());
//! assert!(!tabs.panel("account").is_rendered());
//! # let _ = password;
//! ```

use std::sync::{Arc, Mutex};

use masterclass_core::{
    Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, FocusHandle,
    KeyEvent, LockExt, Orientation, RovingFocus, RovingOptions,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabsProps {
    pub value: Option<String>,
    pub default_value: String,
    pub orientation: Orientation,
}

impl TabsProps {
    pub fn with_default(value: impl Into<String>) -> Self {
        Self {
            default_value: value.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct TabsInner {
    roving: RovingFocus<Element>,
    values: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Tabs {
    doc: Document,
    selected: ControllableState<String>,
    orientation: Orientation,
    base_id: String,
    inner: Arc<Mutex<TabsInner>>,
}

impl CompoundRoot for Tabs {
    const NAME: &'static str = "Tabs.Root";
}

impl Tabs {
    pub fn new(doc: &Document, props: TabsProps) -> Self {
        Self {
            doc: doc.clone(),
            selected: ControllableState::new(props.value, props.default_value),
            orientation: props.orientation,
            base_id: doc.use_id("tabs"),
            inner: Arc::new(Mutex::new(TabsInner {
                roving: RovingFocus::new(RovingOptions {
                    orientation: props.orientation,
                    ..RovingOptions::default()
                }),
                values: Vec::new(),
            })),
        }
    }

    pub fn on_value_change<F>(self, f: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            selected: self.selected.on_change(f),
            ..self
        }
    }

    pub fn value(&self) -> String {
        self.selected.get()
    }

    pub fn sync_value(&self, value: Option<String>) {
        self.selected.sync(value);
    }

    pub fn select(&self, value: &str) {
        self.selected.set(value.to_string());
    }

    pub fn list_attrs(&self) -> Attributes {
        Attributes::with_role("tablist").set("aria-orientation", self.orientation.as_str())
    }

    /// Register a tab in render order. Registering a value twice returns
    /// the existing tab.
    pub fn tab(&self, value: &str) -> Tab {
        let mut inner = self.inner.locked();
        let element = match inner.values.iter().position(|v| v == value) {
            Some(index) => inner.roving.items().get(index).cloned(),
            None => None,
        };
        let element = element.unwrap_or_else(|| {
            let element = self.doc.create_element();
            inner.roving.register(element.clone());
            inner.values.push(value.to_string());
            element
        });
        Tab {
            root: self.clone(),
            value: value.to_string(),
            element,
        }
    }

    pub fn panel(&self, value: &str) -> TabPanel {
        TabPanel {
            root: self.clone(),
            value: value.to_string(),
        }
    }

    /// Index of the tab stop: the selected tab, or the first tab when the
    /// value matches none
    fn tab_stop(&self) -> usize {
        let value = self.value();
        let inner = self.inner.locked();
        inner.values.iter().position(|v| *v == value).unwrap_or(0)
    }

    fn tab_id(&self, value: &str) -> String {
        format!("{}-tab-{}", self.base_id, id_fragment(value))
    }

    fn panel_id(&self, value: &str) -> String {
        format!("{}-panel-{}", self.base_id, id_fragment(value))
    }
}

/// Encode a tab value for use inside an id. ASCII letters, digits and `-`
/// pass through; everything else (including `_`) becomes `_<hex>_`, so
/// distinct values never share an id.
fn id_fragment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else {
            out.push_str(&format!("_{:x}_", u32::from(c)));
        }
    }
    out
}

#[derive(Clone, Debug)]
pub struct Tab {
    root: Tabs,
    value: String,
    element: Element,
}

impl Tab {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn is_selected(&self) -> bool {
        self.root.value() == self.value
    }

    pub fn click(&self) -> EventResult {
        self.root.select(&self.value);
        EventResult::Handled
    }

    /// Arrow keys, Home and End move focus and select in one step
    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        let target = {
            let mut inner = self.root.inner.locked();
            let current = inner.roving.index_of(&self.element).unwrap_or(0);
            inner.roving.set_active(current);
            inner
                .roving
                .navigate(event)
                .and_then(|(index, element)| Some((element, inner.values.get(index)?.clone())))
        };
        match target {
            Some((element, value)) => {
                element.focus();
                self.root.select(&value);
                EventResult::Handled
            }
            None => EventResult::Ignored,
        }
    }

    pub fn attrs(&self) -> Attributes {
        let selected = self.is_selected();
        let stop = self.root.tab_stop();
        let is_stop = self.root.inner.locked().roving.index_of(&self.element) == Some(stop);
        Attributes::with_role("tab")
            .set("id", self.root.tab_id(&self.value))
            .bool("aria-selected", selected)
            .set("aria-controls", self.root.panel_id(&self.value))
            .set("tabindex", if is_stop { 0 } else { -1 })
            .set("data-state", if selected { "active" } else { "inactive" })
    }
}

#[derive(Clone, Debug)]
pub struct TabPanel {
    root: Tabs,
    value: String,
}

impl TabPanel {
    pub fn is_rendered(&self) -> bool {
        self.root.value() == self.value
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("tabpanel")
            .set("id", self.root.panel_id(&self.value))
            .set("aria-labelledby", self.root.tab_id(&self.value))
            .set("tabindex", 0)
    }
}
