//! Alert dialog
//!
//! A dialog that demands a decision. Escape is swallowed and the backdrop
//! is inert; only [`AlertDialogCancel`] and [`AlertDialogAction`] close it.
//! Focus handling and aria wiring are the same as
//! [`Dialog`](crate::dialog::Dialog), with `role="alertdialog"`.

use std::sync::Arc;

use masterclass_core::{CompoundRoot, Document, Element, EventResult, KeyEvent};
use masterclass_overlay::{OverlayConfig, OverlayManager, OverlayState};

use crate::dialog::{
    DialogBackdrop, DialogContent, DialogCore, DialogDescription, DialogProps, DialogTitle,
    DialogTrigger,
};
use crate::Callback;

pub type AlertDialogProps = DialogProps;

#[derive(Clone, Debug)]
pub struct AlertDialog {
    core: DialogCore,
}

impl CompoundRoot for AlertDialog {
    const NAME: &'static str = "AlertDialog.Root";
}

impl AlertDialog {
    pub fn new(doc: &Document, overlays: &OverlayManager, props: AlertDialogProps) -> Self {
        Self {
            core: DialogCore::new(
                doc,
                overlays,
                props,
                OverlayConfig::alert_dialog(),
                "alertdialog",
            ),
        }
    }

    pub fn on_open_change<F>(self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.core.set_on_open_change(f);
        self
    }

    pub fn is_open(&self) -> bool {
        self.core.root.is_open()
    }

    pub fn state(&self) -> OverlayState {
        self.core.root.state()
    }

    pub fn sync_open(&self, open: Option<bool>) {
        self.core.root.sync_open(open);
    }

    pub fn trigger(&self) -> DialogTrigger {
        self.core.trigger()
    }

    pub fn content(&self) -> DialogContent {
        self.core.content()
    }

    pub fn backdrop(&self) -> DialogBackdrop {
        self.core.backdrop()
    }

    pub fn title(&self) -> DialogTitle {
        self.core.title()
    }

    pub fn description(&self) -> DialogDescription {
        self.core.description()
    }

    /// Register the cancel button; it closes without side effects
    pub fn cancel(&self) -> AlertDialogCancel {
        AlertDialogCancel {
            core: self.core.clone(),
            element: self.core.close_button(),
        }
    }

    /// Register an action button; `on_action` runs, then the dialog closes
    pub fn action<F>(&self, on_action: F) -> AlertDialogAction
    where
        F: Fn() + Send + Sync + 'static,
    {
        AlertDialogAction {
            core: self.core.clone(),
            element: self.core.close_button(),
            on_action: Arc::new(on_action),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AlertDialogCancel {
    core: DialogCore,
    element: Element,
}

impl AlertDialogCancel {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn click(&self) -> EventResult {
        self.core.root.set_open(false);
        EventResult::Handled
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            self.click()
        } else {
            EventResult::Ignored
        }
    }
}

#[derive(Clone)]
pub struct AlertDialogAction {
    core: DialogCore,
    element: Element,
    on_action: Callback,
}

impl AlertDialogAction {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn click(&self) -> EventResult {
        (self.on_action)();
        self.core.root.set_open(false);
        EventResult::Handled
    }

    pub fn key_down(&self, event: &KeyEvent) -> EventResult {
        if event.key.is_activation() {
            self.click()
        } else {
            EventResult::Ignored
        }
    }
}

impl std::fmt::Debug for AlertDialogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDialogAction")
            .field("element", &self.element)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_core::Key;
    use masterclass_overlay::{overlay_manager, EscapeOutcome, OverlayManagerExt};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn open_alert() -> (Document, OverlayManager, AlertDialog) {
        let doc = Document::new();
        let overlays = overlay_manager();
        let alert = AlertDialog::new(
            &doc,
            &overlays,
            AlertDialogProps {
                default_open: true,
                ..Default::default()
            },
        );
        (doc, overlays, alert)
    }

    #[test]
    fn test_escape_and_backdrop_do_not_close() {
        let (_, overlays, alert) = open_alert();
        let content = alert.content();

        assert_eq!(content.key_down(&KeyEvent::new(Key::Escape)), EventResult::Handled);
        assert!(matches!(overlays.handle_escape(), EscapeOutcome::Suppressed(_)));
        assert_eq!(alert.backdrop().click(), EventResult::Ignored);
        assert!(!overlays.handle_backdrop_click());
        assert!(alert.is_open());
        assert_eq!(content.attrs().role(), Some("alertdialog"));
    }

    #[test]
    fn test_cancel_closes_and_restores_focus() {
        let (doc, _, alert) = open_alert();
        let cancel = alert.cancel();
        let trigger = alert.trigger();

        cancel.click();
        assert!(!alert.is_open());
        assert_eq!(doc.active_element(), Some(trigger.element().id()));
    }

    #[test]
    fn test_action_runs_then_closes() {
        let doc = Document::new();
        let overlays = overlay_manager();
        let alert = AlertDialog::new(&doc, &overlays, AlertDialogProps::default());
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let _cancel = alert.cancel();
        let action = alert.action(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        alert.trigger().click();
        action.key_down(&KeyEvent::new(Key::Enter));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!alert.is_open());
        assert_eq!(overlays.open_count(), 0);
    }

    proptest! {
        #[test]
        fn test_never_dismissed_by_escape_or_backdrop(events in proptest::collection::vec(any::<bool>(), 0..20)) {
            let (_, overlays, alert) = open_alert();
            for escape in events {
                if escape {
                    overlays.handle_escape();
                    alert.content().key_down(&KeyEvent::new(Key::Escape));
                } else {
                    overlays.handle_backdrop_click();
                    alert.backdrop().click();
                }
            }
            prop_assert!(alert.is_open());
            prop_assert_eq!(overlays.open_count(), 1);
        }
    }
}
