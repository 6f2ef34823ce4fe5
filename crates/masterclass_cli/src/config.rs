//! `masterclass.toml` handling
//!
//! Every section is optional. A missing file means all defaults.
//!
//! ```toml
//! [content]
//! exercises_dir = "packages/content/exercises"
//! modules_dir = "packages/content/modules"
//! default_locale = "en"
//!
//! [tooltip]
//! open_delay_ms = 400
//! close_delay_ms = 100
//!
//! [toast]
//! default_duration_ms = 5000
//!
//! [draft]
//! save_debounce_ms = 500
//! ```

use anyhow::{Context, Result};
use masterclass_exercise::draft::DEFAULT_SAVE_DEBOUNCE_MS;
use masterclass_exercise::{FsContentLoader, Locale};
use masterclass_ui::{ToastOptions, TooltipOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "masterclass.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MasterclassConfig {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub tooltip: TooltipOptions,
    #[serde(default)]
    pub toast: ToastOptions,
    #[serde(default)]
    pub draft: DraftConfig,
}

/// Content roots, relative to the directory holding `masterclass.toml`
#[derive(Debug, Deserialize, Serialize)]
pub struct ContentConfig {
    #[serde(default = "default_exercises_dir")]
    pub exercises_dir: String,
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,
    #[serde(default)]
    pub default_locale: Locale,
}

fn default_exercises_dir() -> String {
    "content/exercises".to_string()
}

fn default_modules_dir() -> String {
    "content/modules".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            exercises_dir: default_exercises_dir(),
            modules_dir: default_modules_dir(),
            default_locale: Locale::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DraftConfig {
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

fn default_save_debounce_ms() -> u64 {
    DEFAULT_SAVE_DEBOUNCE_MS
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: default_save_debounce_ms(),
        }
    }
}

impl MasterclassConfig {
    /// Load `masterclass.toml` from a directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: MasterclassConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Content loader for these roots. `CONTENT_EXERCISES_DIR` and
    /// `CONTENT_MODULES_DIR` override the configured paths.
    pub fn content_loader(&self, root: &Path) -> FsContentLoader {
        FsContentLoader::from_env_or(
            root.join(&self.content.exercises_dir),
            root.join(&self.content.modules_dir),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_ui::toast::ToastVariant;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = MasterclassConfig::load_from_dir(tmp.path()).unwrap();
        assert_eq!(config.content.exercises_dir, "content/exercises");
        assert_eq!(config.content.default_locale, Locale::En);
        assert_eq!(config.tooltip, TooltipOptions::default());
        assert_eq!(config.draft.save_debounce_ms, 500);
    }

    #[test]
    fn test_partial_sections() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[content]
modules_dir = "packages/content/modules"
default_locale = "ja"

[tooltip]
open_delay_ms = 700

[toast]
default_variant = "success"
"#,
        )
        .unwrap();

        let config = MasterclassConfig::load_from_dir(tmp.path()).unwrap();
        assert_eq!(config.content.exercises_dir, "content/exercises");
        assert_eq!(config.content.modules_dir, "packages/content/modules");
        assert_eq!(config.content.default_locale, Locale::Ja);
        assert_eq!(config.tooltip.open_delay_ms, 700);
        assert_eq!(config.tooltip.close_delay_ms, 100);
        assert_eq!(config.toast.default_variant, ToastVariant::Success);
        assert_eq!(config.toast.default_duration_ms, 5000);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[content\n").unwrap();
        let err = MasterclassConfig::load_from_dir(tmp.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
