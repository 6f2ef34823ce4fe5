//! Context menu
//!
//! A menu opened by the host's context-menu event (right click) at the
//! pointer position. The native menu is suppressed by returning
//! [`EventResult::Handled`]. Items, keyboard handling and closing rules are
//! those of [`Menu`](crate::menu::Menu); on close, focus goes back to
//! whatever had it before the menu opened.

use std::sync::Arc;

use masterclass_core::{Attributes, CompoundRoot, Document, Element, EventResult, KeyEvent, Point};
use masterclass_overlay::{OverlayConfig, OverlayManager};

use crate::menu::{MenuCore, MenuItem, OpenAt};

#[derive(Clone, Debug)]
pub struct ContextMenu {
    core: MenuCore,
}

impl CompoundRoot for ContextMenu {
    const NAME: &'static str = "ContextMenu.Root";
}

impl ContextMenu {
    pub fn new(doc: &Document, overlays: &OverlayManager) -> Self {
        Self {
            core: MenuCore::new(doc, overlays, "context-menu"),
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

    pub fn highlighted(&self) -> Option<usize> {
        self.core.highlighted()
    }

    /// Where the menu was opened, while open
    pub fn position(&self) -> Option<Point> {
        self.core.position()
    }

    pub fn close(&self) {
        self.core.close();
    }

    pub fn trigger(&self) -> ContextMenuTrigger {
        ContextMenuTrigger { root: self.clone() }
    }

    pub fn content(&self) -> ContextMenuContent {
        ContextMenuContent { root: self.clone() }
    }

    pub fn item(&self) -> MenuItem {
        MenuItem::new(&self.core)
    }
}

/// The area that responds to right click
#[derive(Clone, Debug)]
pub struct ContextMenuTrigger {
    root: ContextMenu,
}

impl ContextMenuTrigger {
    pub fn element(&self) -> &Element {
        self.root.core.trigger()
    }

    /// Open at `at` (viewport coordinates) and focus the first item
    pub fn context_menu(&self, at: Point) -> EventResult {
        let previous = self.root.core.document().active_element();
        self.root
            .core
            .open(OverlayConfig::context_menu(at), OpenAt::First, previous);
        EventResult::Handled
    }
}

#[derive(Clone, Debug)]
pub struct ContextMenuContent {
    root: ContextMenu,
}

impl ContextMenuContent {
    pub fn element(&self) -> &Element {
        self.root.core.content()
    }

    pub fn is_rendered(&self) -> bool {
        self.root.is_open()
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        self.root.core.content_key_down(event)
    }

    pub fn attrs(&self) -> Attributes {
        let style = self
            .root
            .position()
            .map(|p| format!("position: fixed; left: {}px; top: {}px", p.x, p.y));
        Attributes::with_role("menu")
            .set("id", self.root.core.content_id())
            .set_opt("style", style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_core::{FocusHandle, Key};
    use masterclass_overlay::{overlay_manager, OverlayManagerExt};

    fn context_menu(n: usize) -> (Document, OverlayManager, ContextMenu, Vec<MenuItem>) {
        let doc = Document::new();
        let overlays = overlay_manager();
        let menu = ContextMenu::new(&doc, &overlays);
        let items = (0..n).map(|_| menu.item()).collect();
        (doc, overlays, menu, items)
    }

    #[test]
    fn test_opens_at_pointer() {
        let (doc, _, menu, items) = context_menu(2);
        let result = menu.trigger().context_menu(Point::new(120.0, 48.0));
        assert_eq!(result, EventResult::Handled);
        assert_eq!(menu.position(), Some(Point::new(120.0, 48.0)));
        assert_eq!(
            menu.content().attrs().get("style"),
            Some("position: fixed; left: 120px; top: 48px")
        );
        assert_eq!(doc.active_element(), Some(items[0].element().id()));
    }

    #[test]
    fn test_reopen_moves_without_stacking() {
        let (_, overlays, menu, _) = context_menu(1);
        let trigger = menu.trigger();
        trigger.context_menu(Point::new(10.0, 10.0));
        trigger.context_menu(Point::new(50.0, 60.0));
        assert_eq!(overlays.open_count(), 1);
        assert_eq!(menu.position(), Some(Point::new(50.0, 60.0)));
    }

    #[test]
    fn test_close_restores_previous_focus() {
        let (doc, _, menu, _) = context_menu(2);
        let editor = doc.create_element();
        editor.focus();

        menu.trigger().context_menu(Point::new(0.0, 0.0));
        menu.content().key_down(&KeyEvent::new(Key::Escape));
        assert!(!menu.is_open());
        assert_eq!(doc.active_element(), Some(editor.id()));
        assert_eq!(menu.highlighted(), None);
    }

    #[test]
    fn test_close_without_previous_focus_blurs() {
        let (doc, _, menu, items) = context_menu(2);
        menu.trigger().context_menu(Point::new(0.0, 0.0));
        items[1].click();
        assert!(!menu.is_open());
        assert_eq!(doc.active_element(), None);
        assert!(!menu.content().is_rendered());
    }

    #[test]
    fn test_reopen_starts_at_first_item() {
        let (doc, _, menu, items) = context_menu(3);
        let content = menu.content();
        menu.trigger().context_menu(Point::new(0.0, 0.0));
        content.key_down(&KeyEvent::new(Key::End));
        menu.close();

        menu.trigger().context_menu(Point::new(0.0, 0.0));
        assert_eq!(menu.highlighted(), Some(0));
        assert_eq!(doc.active_element(), Some(items[0].element().id()));
    }
}
