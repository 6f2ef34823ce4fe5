//! Menu
//!
//! Unlike the listbox popups, a menu moves real focus: opening focuses an
//! item, arrow keys move focus between items (wrapping), and closing sends
//! focus back. Items register when they are created, before the menu opens,
//! so the first item is focusable the moment the popup mounts.
//!
//! Menus do not trap Tab. Tab closes the menu instead. Disabled items stay
//! in the DOM order but keyboard navigation and opening skip over them.
//!
//! [`MenuCore`] is also the engine behind
//! [`ContextMenu`](crate::context_menu::ContextMenu); the two differ in how
//! they open and where focus goes on close.

use std::sync::{Arc, Mutex, Weak};

use masterclass_core::{
    Attributes, CompoundRoot, Document, Element, EventResult, FocusChange, FocusHandle, Key,
    KeyEvent, LockExt, Navigation, NodeId, OnChange, Orientation, Point, RovingFocus, RovingOptions,
    Subscription,
};
use masterclass_overlay::{
    DismissCallback, OverlayConfig, OverlayHandle, OverlayManager, OverlayManagerExt,
    OverlayPosition,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::Callback;

/// Which item receives focus when the menu opens
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OpenAt {
    First,
    Last,
}

struct MenuState {
    roving: RovingFocus<Element>,
    disabled: FxHashSet<NodeId>,
    highlighted: Option<usize>,
    handle: Option<OverlayHandle>,
    position: Option<Point>,
    return_focus: Option<NodeId>,
    on_open_change: Option<OnChange<bool>>,
    listeners: Vec<Subscription>,
}

impl MenuState {
    /// Resolve `nav`, stepping past disabled items. Leaves the tab stop
    /// untouched when every item is disabled.
    fn enabled_target(&mut self, nav: Navigation) -> Option<(usize, Element)> {
        let start = self.roving.active_index();
        let follow = match nav {
            Navigation::First | Navigation::Next => Navigation::Next,
            Navigation::Last | Navigation::Previous => Navigation::Previous,
        };
        let mut target = self.roving.navigate_to(nav)?;
        for _ in 0..self.roving.len() {
            if !self.disabled.contains(&target.1.id()) {
                return Some(target);
            }
            target = self.roving.navigate_to(follow)?;
        }
        self.roving.set_active(start);
        None
    }
}

struct Shared {
    doc: Document,
    overlays: OverlayManager,
    trigger: Element,
    content: Element,
    content_id: String,
    state: Mutex<MenuState>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let handle = self.state.locked().handle.take();
        if let Some(handle) = handle {
            self.overlays.unmount(handle);
        }
    }
}

/// Open state, item registry and highlight shared by Menu and ContextMenu
#[derive(Clone)]
pub(crate) struct MenuCore {
    shared: Arc<Shared>,
}

impl MenuCore {
    pub(crate) fn new(doc: &Document, overlays: &OverlayManager, id_prefix: &str) -> Self {
        Self {
            shared: Arc::new(Shared {
                doc: doc.clone(),
                overlays: overlays.clone(),
                trigger: doc.create_element(),
                content: doc.create_element(),
                content_id: doc.use_id(id_prefix),
                state: Mutex::new(MenuState {
                    roving: RovingFocus::new(RovingOptions {
                        orientation: Orientation::Vertical,
                        wrap: true,
                        initial_index: 0,
                    }),
                    disabled: FxHashSet::default(),
                    highlighted: None,
                    handle: None,
                    position: None,
                    return_focus: None,
                    on_open_change: None,
                    listeners: Vec::new(),
                }),
            }),
        }
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    pub(crate) fn set_on_open_change(&self, f: OnChange<bool>) {
        self.shared.state.locked().on_open_change = Some(f);
    }

    pub(crate) fn document(&self) -> &Document {
        &self.shared.doc
    }

    pub(crate) fn trigger(&self) -> &Element {
        &self.shared.trigger
    }

    pub(crate) fn content(&self) -> &Element {
        &self.shared.content
    }

    pub(crate) fn content_id(&self) -> &str {
        &self.shared.content_id
    }

    pub(crate) fn is_open(&self) -> bool {
        self.shared.state.locked().handle.is_some()
    }

    pub(crate) fn highlighted(&self) -> Option<usize> {
        self.shared.state.locked().highlighted
    }

    pub(crate) fn position(&self) -> Option<Point> {
        self.shared.state.locked().position
    }

    /// Register the next item in render order
    pub(crate) fn register_item(&self) -> Element {
        let element = self.shared.doc.create_element();
        let weak = Arc::downgrade(&self.shared);
        let target = element.clone();
        let listener = element.on_focus_change(move |change| {
            if change != FocusChange::Focused {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                let mut state = shared.state.locked();
                state.highlighted = state.roving.set_active_handle(&target);
            }
        });

        let mut state = self.shared.state.locked();
        state.roving.register(element.clone());
        state.listeners.push(listener);
        if let Some(handle) = state.handle {
            self.shared.overlays.add_node(handle, element.id());
        }
        element
    }

    pub(crate) fn set_item_disabled(&self, element: &Element, disabled: bool) {
        let mut state = self.shared.state.locked();
        if disabled {
            state.disabled.insert(element.id());
        } else {
            state.disabled.remove(&element.id());
        }
    }

    pub(crate) fn item_index(&self, element: &Element) -> Option<usize> {
        self.shared.state.locked().roving.index_of(element)
    }

    /// Mount with `config` and focus the first or last item
    ///
    /// Opening an already open menu moves it (context menus re-open at the
    /// new pointer position) but keeps the original focus return target.
    pub(crate) fn open(&self, config: OverlayConfig, at: OpenAt, return_focus: Option<NodeId>) {
        let weak = Arc::downgrade(&self.shared);
        let on_dismiss: DismissCallback = Arc::new(move |reason| {
            if let Some(core) = MenuCore::from_weak(&weak) {
                debug!(?reason, "menu dismissed");
                core.close();
            }
        });

        let position = match config.position {
            OverlayPosition::AtPoint(point) => Some(point),
            _ => None,
        };
        let overlays = &self.shared.overlays;
        let (previous, focus, callback) = {
            let mut state = self.shared.state.locked();
            let previous = state.handle.take();
            if previous.is_none() {
                state.return_focus = return_focus;
            }

            let handle = overlays.mount(config, Some(on_dismiss));
            overlays.add_node(handle, self.shared.content.id());
            for item in state.roving.items().iter() {
                overlays.add_node(handle, item.id());
            }
            state.handle = Some(handle);
            state.position = position;

            let nav = match at {
                OpenAt::First => Navigation::First,
                OpenAt::Last => Navigation::Last,
            };
            let focus = state.enabled_target(nav).map(|(index, item)| {
                state.highlighted = Some(index);
                item
            });
            let callback = previous.is_none().then(|| state.on_open_change.clone()).flatten();
            (previous, focus, callback)
        };

        if let Some(previous) = previous {
            overlays.unmount(previous);
        }
        debug!(id = %self.shared.content_id, ?at, "menu opened");
        if let Some(item) = focus {
            item.focus();
        }
        if let Some(callback) = callback {
            callback(true);
        }
    }

    /// Unmount, clear the highlight and return focus. False if already closed.
    pub(crate) fn close(&self) -> bool {
        let (handle, return_focus, callback) = {
            let mut state = self.shared.state.locked();
            let Some(handle) = state.handle.take() else {
                return false;
            };
            state.roving.set_active(0);
            state.highlighted = None;
            state.position = None;
            (handle, state.return_focus.take(), state.on_open_change.clone())
        };
        self.shared.overlays.unmount(handle);
        debug!(id = %self.shared.content_id, "menu closed");

        match return_focus {
            Some(node) => self.shared.doc.focus(node),
            None => {
                if self.focus_is_inside() {
                    self.shared.doc.blur();
                }
            }
        }
        if let Some(callback) = callback {
            callback(false);
        }
        true
    }

    fn focus_is_inside(&self) -> bool {
        let Some(active) = self.shared.doc.active_element() else {
            return false;
        };
        active == self.shared.content.id()
            || self
                .shared
                .state
                .locked()
                .roving
                .items()
                .iter()
                .any(|item| item.id() == active)
    }

    /// Arrow keys, Home and End move focus; Escape and Tab close
    pub(crate) fn content_key_down(&self, event: &KeyEvent) -> EventResult {
        match event.key {
            Key::Escape | Key::Tab => EventResult::handled_if(self.close()),
            _ => {
                let target = {
                    let mut state = self.shared.state.locked();
                    let orientation = state.roving.options().orientation;
                    let target = Navigation::from_key(event.key, orientation)
                        .and_then(|nav| state.enabled_target(nav));
                    if let Some((index, _)) = &target {
                        state.highlighted = Some(*index);
                    }
                    target
                };
                match target {
                    Some((_, item)) => {
                        item.focus();
                        EventResult::Handled
                    }
                    None => EventResult::Ignored,
                }
            }
        }
    }
}

impl std::fmt::Debug for MenuCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuCore")
            .field("id", &self.shared.content_id)
            .field("open", &self.is_open())
            .field("highlighted", &self.highlighted())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Menu {
    core: MenuCore,
}

impl CompoundRoot for Menu {
    const NAME: &'static str = "Menu.Root";
}

impl Menu {
    pub fn new(doc: &Document, overlays: &OverlayManager) -> Self {
        Self {
            core: MenuCore::new(doc, overlays, "menu"),
        }
    }

    pub fn on_open_change<F>(self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.core.set_on_open_change(Arc::new(f));
        self
    }

    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    /// Index of the highlighted (focused) item while open
    pub fn highlighted(&self) -> Option<usize> {
        self.core.highlighted()
    }

    pub fn open(&self) {
        self.open_at(OpenAt::First);
    }

    pub fn close(&self) {
        self.core.close();
    }

    fn open_at(&self, at: OpenAt) {
        let trigger = self.core.trigger().id();
        self.core.open(OverlayConfig::menu(trigger), at, Some(trigger));
    }

    pub fn trigger(&self) -> MenuTrigger {
        MenuTrigger { root: self.clone() }
    }

    pub fn content(&self) -> MenuContent {
        MenuContent {
            core: self.core.clone(),
        }
    }

    /// Register the next item in render order
    pub fn item(&self) -> MenuItem {
        MenuItem::new(&self.core)
    }
}

#[derive(Clone, Debug)]
pub struct MenuTrigger {
    root: Menu,
}

impl MenuTrigger {
    pub fn element(&self) -> &Element {
        self.root.core.trigger()
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
        match event.key {
            Key::ArrowDown | Key::Enter | Key::Space => self.root.open_at(OpenAt::First),
            Key::ArrowUp => self.root.open_at(OpenAt::Last),
            _ => return EventResult::Ignored,
        }
        EventResult::Handled
    }

    pub fn attrs(&self) -> Attributes {
        let open = self.root.is_open();
        Attributes::new()
            .set("aria-haspopup", "menu")
            .bool("aria-expanded", open)
            .set("aria-controls", self.root.core.content_id())
            .set("data-state", if open { "open" } else { "closed" })
    }
}

#[derive(Clone, Debug)]
pub struct MenuContent {
    core: MenuCore,
}

impl MenuContent {
    pub fn element(&self) -> &Element {
        self.core.content()
    }

    pub fn is_rendered(&self) -> bool {
        self.core.is_open()
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        self.core.content_key_down(event)
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("menu")
            .set("id", self.core.content_id())
            .set("aria-orientation", Orientation::Vertical.as_str())
    }
}

/// A menu entry. `on_select` runs on click, Enter or Space, then the menu closes.
#[derive(Clone)]
pub struct MenuItem {
    core: MenuCore,
    element: Element,
    disabled: bool,
    on_select: Option<Callback>,
}

impl MenuItem {
    pub(crate) fn new(core: &MenuCore) -> Self {
        Self {
            core: core.clone(),
            element: core.register_item(),
            disabled: false,
            on_select: None,
        }
    }

    pub fn on_select<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_select = Some(Arc::new(f));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self.core.set_item_disabled(&self.element, disabled);
        self
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_highlighted(&self) -> bool {
        let index = self.core.item_index(&self.element);
        index.is_some() && index == self.core.highlighted()
    }

    pub fn click(&self) -> EventResult {
        if self.disabled {
            return EventResult::Ignored;
        }
        if let Some(on_select) = &self.on_select {
            on_select();
        }
        self.core.close();
        EventResult::Handled
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            self.click()
        } else {
            EventResult::Ignored
        }
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("menuitem")
            .set("tabindex", -1)
            .set_opt("aria-disabled", self.disabled.then_some("true"))
            .flag("data-disabled", self.disabled)
            .flag("data-highlighted", self.is_highlighted())
    }
}

impl std::fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("element", &self.element)
            .field("disabled", &self.disabled)
            .finish()
    }
}

pub fn separator_attrs() -> Attributes {
    Attributes::with_role("separator")
}
