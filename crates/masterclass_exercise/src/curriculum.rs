//! Course outline
//!
//! The module list is fixed at build time. Lesson and exercise content is
//! loaded from disk and keyed by these slugs.

use crate::locale::Localized;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
    pub slug: &'static str,
    pub title: Localized<&'static str>,
    pub description: Localized<&'static str>,
    pub order: u32,
    pub is_free: bool,
    /// Primitives built in this module
    pub components: &'static [&'static str],
}

macro_rules! module {
    ($slug:literal, $order:literal, $free:literal, [$en:literal, $ja:literal], [$den:literal, $dja:literal], [$($c:literal),*]) => {
        ModuleConfig {
            slug: $slug,
            title: Localized { en: $en, ja: Some($ja) },
            description: Localized { en: $den, ja: Some($dja) },
            order: $order,
            is_free: $free,
            components: &[$($c),*],
        }
    };
}

pub static MODULES: &[ModuleConfig] = &[
    module!("00-foundation", 0, true, ["Foundation", "基礎"],
        ["Compound Components, TypeScript Generics, Project Setup",
         "コンパウンドコンポーネント、TypeScriptジェネリクス、プロジェクトセットアップ"], []),
    module!("01-primitives", 1, false, ["Primitives", "プリミティブ"],
        ["Button, Input, Separator", "Button, Input, Separator"],
        ["Button", "Input", "Separator"]),
    module!("02-toggle-state", 2, false, ["Toggle & State", "トグル＆ステート"],
        ["Switch, Toggle, ToggleGroup, Checkbox", "Switch, Toggle, ToggleGroup, Checkbox"],
        ["Switch", "Toggle", "ToggleGroup", "Checkbox"]),
    module!("03-form-system", 3, false, ["Form System", "フォームシステム"],
        ["Field, Fieldset, Form, CheckboxGroup, Radio", "Field, Fieldset, Form, CheckboxGroup, Radio"],
        ["Field", "Fieldset", "Form", "CheckboxGroup", "Radio"]),
    module!("04-data-display", 4, false, ["Data Display", "データ表示"],
        ["Progress, Meter, Avatar", "Progress, Meter, Avatar"],
        ["Progress", "Meter", "Avatar"]),
    module!("05-disclosure", 5, false, ["Disclosure", "ディスクロージャー"],
        ["Collapsible, Accordion", "Collapsible, Accordion"],
        ["Collapsible", "Accordion"]),
    module!("06-navigation", 6, false, ["Navigation", "ナビゲーション"],
        ["Tabs, Toolbar", "Tabs, Toolbar"],
        ["Tabs", "Toolbar"]),
    module!("07-overlays-1", 7, false, ["Overlays I: Positioning", "オーバーレイ I: ポジショニング"],
        ["Tooltip, Popover, PreviewCard", "Tooltip, Popover, PreviewCard"],
        ["Tooltip", "Popover", "PreviewCard"]),
    module!("08-overlays-2", 8, false, ["Overlays II: Modals", "オーバーレイ II: モーダル"],
        ["Dialog, AlertDialog, Drawer", "Dialog, AlertDialog, Drawer"],
        ["Dialog", "AlertDialog", "Drawer"]),
    module!("09-selection", 9, false, ["Selection", "セレクション"],
        ["Select, Combobox, Autocomplete", "Select, Combobox, Autocomplete"],
        ["Select", "Combobox", "Autocomplete"]),
    module!("10-menus", 10, false, ["Menu Systems", "メニューシステム"],
        ["Menu, ContextMenu, Menubar, NavigationMenu", "Menu, ContextMenu, Menubar, NavigationMenu"],
        ["Menu", "ContextMenu", "Menubar", "NavigationMenu"]),
    module!("11-advanced", 11, false, ["Advanced", "アドバンスド"],
        ["NumberField, Slider, ScrollArea, Toast", "NumberField, Slider, ScrollArea, Toast"],
        ["NumberField", "Slider", "ScrollArea", "Toast"]),
    module!("12-capstone", 12, false, ["Capstone: Ship Your Library", "キャップストーン: ライブラリ公開"],
        ["Bundling, Documentation, Testing, npm Publish", "バンドル、ドキュメント、テスト、npm公開"],
        []),
];

pub fn module(slug: &str) -> Option<&'static ModuleConfig> {
    MODULES.iter().find(|m| m.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    #[test]
    fn test_modules_are_ordered() {
        for (i, m) in MODULES.iter().enumerate() {
            assert_eq!(m.order as usize, i, "{}", m.slug);
        }
        assert!(MODULES[0].is_free);
        assert!(MODULES[1..].iter().all(|m| !m.is_free));
    }

    #[test]
    fn test_lookup() {
        let m = module("10-menus").unwrap();
        assert_eq!(*m.title.get(Locale::Ja), "メニューシステム");
        assert!(m.components.contains(&"ContextMenu"));
        assert!(module("99-missing").is_none());
    }
}
