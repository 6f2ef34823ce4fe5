//! # Masterclass UI
//!
//! Headless, accessible compound primitives. Each primitive is a root handle
//! (`Dialog`, `Tabs`, `Select`, ...) from which its parts are created
//! (`trigger()`, `content()`, `item()`, ...). A part cannot exist without its
//! root, so "used outside Root" is not a runtime error here.
//!
//! Nothing is rendered. Parts take host events (`click`, `key_down`,
//! `pointer_*`, `focus`) and expose `attrs()` for the role, aria-*, data-*
//! and tabindex the host should put on the element.
//!
//! ## Families
//!
//! - **State only**: [`button`], [`input`], [`switch`], [`checkbox`],
//!   [`collapsible`], [`progress`], [`number_field`], [`slider`],
//!   [`scroll_area`]
//! - **List navigation**: [`tabs`], [`accordion`], [`toolbar`]
//! - **Overlays**: [`dialog`], [`alert_dialog`], [`popover`], [`tooltip`],
//!   [`menu`], [`context_menu`], [`select`], [`combobox`]
//! - **Notifications**: [`toast`]
//!
//! ## Example
//!
//! ```
//! use masterclass_ui::prelude::*;
//!
//! let doc = Document::new();
//! let switch = Switch::new(&doc, SwitchProps::default());
//! switch.click();
//! assert_eq!(switch.attrs().get("aria-checked"), Some("true"));
//! ```

use std::sync::Arc;

pub mod accordion;
pub mod alert_dialog;
pub mod button;
pub mod checkbox;
pub mod collapsible;
pub mod combobox;
pub mod context_menu;
pub mod dialog;
pub mod input;
pub mod menu;
pub mod number_field;
pub mod popover;
pub mod progress;
pub mod scroll_area;
pub mod select;
pub mod slider;
pub mod switch;
pub mod tabs;
pub mod toast;
pub mod toolbar;
pub mod tooltip;

mod listbox;
mod overlay_root;

/// Argument-less event callback (clicks, menu selection, alert actions)
pub type Callback = Arc<dyn Fn() + Send + Sync>;

pub use accordion::{Accordion, AccordionProps};
pub use alert_dialog::{AlertDialog, AlertDialogProps};
pub use button::Button;
pub use checkbox::{CheckedState, Checkbox, CheckboxProps};
pub use collapsible::{Collapsible, CollapsibleProps};
pub use combobox::{Combobox, ComboboxProps};
pub use context_menu::ContextMenu;
pub use dialog::{Dialog, DialogProps};
pub use input::{Input, InputProps};
pub use menu::{Menu, MenuItem};
pub use number_field::{NumberField, NumberFieldProps};
pub use popover::{Popover, PopoverProps};
pub use progress::{Progress, ProgressProps};
pub use scroll_area::{ScrollArea, ScrollMetrics};
pub use select::{Select, SelectProps};
pub use slider::{Slider, SliderProps, SliderThumbState};
pub use switch::{Switch, SwitchProps};
pub use tabs::{Tabs, TabsProps};
pub use toast::{Toast, ToastOptions, ToastStore, ToastVariant, ToastViewport};
pub use toolbar::Toolbar;
pub use tooltip::{Tooltip, TooltipOptions};

/// Everything needed to build and drive the primitives
pub mod prelude {
    pub use crate::*;
    pub use masterclass_core::prelude::*;
    pub use masterclass_core::{CompoundRoot, PrimitiveError};
    pub use masterclass_overlay::{overlay_manager, OverlayManager, OverlayManagerExt};
    pub use masterclass_scheduler::{SchedulerHandle, TimerScheduler};
}
