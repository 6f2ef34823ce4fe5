//! Accordion
//!
//! A vertical stack of headers where at most one item is expanded. Arrow
//! keys move focus between headers without changing what is expanded;
//! Enter, Space or a click toggles the focused item.
//!
//! The expanded value is a string, `""` meaning nothing is expanded. That is
//! also what `on_value_change` receives when the open item collapses.

use std::sync::{Arc, Mutex};

use masterclass_core::{
    Attributes, CompoundRoot, ControllableState, Document, Element, EventResult, FocusHandle,
    KeyEvent, LockExt, Orientation, RovingFocus, RovingOptions,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccordionProps {
    /// Controlled expanded value; `Some("")` keeps everything collapsed
    pub value: Option<String>,
    pub default_value: String,
}

#[derive(Debug)]
struct ItemRecord {
    value: String,
    disabled: bool,
}

#[derive(Debug)]
struct AccordionInner {
    triggers: RovingFocus<Element>,
    items: Vec<ItemRecord>,
}

#[derive(Clone, Debug)]
pub struct Accordion {
    doc: Document,
    expanded: ControllableState<String>,
    base_id: String,
    inner: Arc<Mutex<AccordionInner>>,
}

impl CompoundRoot for Accordion {
    const NAME: &'static str = "Accordion.Root";
}

impl Accordion {
    pub fn new(doc: &Document, props: AccordionProps) -> Self {
        Self {
            doc: doc.clone(),
            expanded: ControllableState::new(props.value, props.default_value),
            base_id: doc.use_id("accordion"),
            inner: Arc::new(Mutex::new(AccordionInner {
                triggers: RovingFocus::new(RovingOptions {
                    orientation: Orientation::Vertical,
                    wrap: true,
                    initial_index: 0,
                }),
                items: Vec::new(),
            })),
        }
    }

    pub fn on_value_change<F>(self, f: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            expanded: self.expanded.on_change(f),
            ..self
        }
    }

    /// The expanded item's value, if any
    pub fn value(&self) -> Option<String> {
        Some(self.expanded.get()).filter(|v| !v.is_empty())
    }

    pub fn sync_value(&self, value: Option<String>) {
        self.expanded.sync(value);
    }

    /// Expand `value`, or collapse it if it is already expanded
    pub fn toggle(&self, value: &str) {
        let next = if self.expanded.get() == value {
            String::new()
        } else {
            value.to_string()
        };
        self.expanded.set(next);
    }

    /// Register an item in render order
    pub fn item(&self, value: &str) -> AccordionItem {
        self.add_item(value, false)
    }

    pub fn disabled_item(&self, value: &str) -> AccordionItem {
        self.add_item(value, true)
    }

    fn add_item(&self, value: &str, disabled: bool) -> AccordionItem {
        let mut inner = self.inner.locked();
        let trigger = match inner.items.iter().position(|item| item.value == value) {
            Some(index) => {
                inner.items[index].disabled = disabled;
                inner.triggers.items().get(index).cloned()
            }
            None => None,
        };
        let trigger = trigger.unwrap_or_else(|| {
            let trigger = self.doc.create_element();
            inner.triggers.register(trigger.clone());
            inner.items.push(ItemRecord {
                value: value.to_string(),
                disabled,
            });
            trigger
        });
        AccordionItem {
            root: self.clone(),
            value: value.to_string(),
            trigger,
        }
    }

    fn is_disabled(&self, value: &str) -> bool {
        self.inner
            .locked()
            .items
            .iter()
            .any(|item| item.value == value && item.disabled)
    }

    fn trigger_id(&self, value: &str) -> String {
        format!("{}-trigger-{}", self.base_id, value)
    }

    fn panel_id(&self, value: &str) -> String {
        format!("{}-panel-{}", self.base_id, value)
    }
}

#[derive(Clone, Debug)]
pub struct AccordionItem {
    root: Accordion,
    value: String,
    trigger: Element,
}

impl AccordionItem {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_expanded(&self) -> bool {
        self.root.expanded.get() == self.value
    }

    pub fn trigger(&self) -> AccordionTrigger {
        AccordionTrigger { item: self.clone() }
    }

    pub fn panel(&self) -> AccordionPanel {
        AccordionPanel { item: self.clone() }
    }

    fn data_state(&self) -> &'static str {
        if self.is_expanded() {
            "open"
        } else {
            "closed"
        }
    }
}

#[derive(Clone, Debug)]
pub struct AccordionTrigger {
    item: AccordionItem,
}

impl AccordionTrigger {
    pub fn element(&self) -> &Element {
        &self.item.trigger
    }

    pub fn click(&self) -> EventResult {
        let item = &self.item;
        if item.root.is_disabled(&item.value) {
            return EventResult::Ignored;
        }
        item.root.toggle(&item.value);
        EventResult::Handled
    }

    /// ArrowUp/ArrowDown (wrapping), Home and End move focus only
    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            return self.click();
        }
        let target = {
            let mut inner = self.item.root.inner.locked();
            let Some(current) = inner.triggers.index_of(&self.item.trigger) else {
                return EventResult::Ignored;
            };
            inner.triggers.set_active(current);
            inner.triggers.navigate(event)
        };
        match target {
            Some((_, trigger)) => {
                trigger.focus();
                EventResult::Handled
            }
            None => EventResult::Ignored,
        }
    }

    pub fn attrs(&self) -> Attributes {
        let item = &self.item;
        let disabled = item.root.is_disabled(&item.value);
        Attributes::new()
            .set("id", item.root.trigger_id(&item.value))
            .bool("aria-expanded", item.is_expanded())
            .set("aria-controls", item.root.panel_id(&item.value))
            .set_opt("aria-disabled", disabled.then_some("true"))
            .set("data-state", item.data_state())
            .flag("data-disabled", disabled)
    }
}

#[derive(Clone, Debug)]
pub struct AccordionPanel {
    item: AccordionItem,
}

impl AccordionPanel {
    pub fn is_rendered(&self) -> bool {
        self.item.is_expanded()
    }

    pub fn attrs(&self) -> Attributes {
        let item = &self.item;
        Attributes::with_role("region")
            .set("id", item.root.panel_id(&item.value))
            .set("aria-labelledby", item.root.trigger_id(&item.value))
            .set("data-state", item.data_state())
    }
}
