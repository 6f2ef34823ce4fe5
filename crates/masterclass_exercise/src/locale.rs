//! Course locales and per-locale text

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ja];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "ja" => Ok(Locale::Ja),
            other => Err(ContentError::UnknownLocale(other.to_string())),
        }
    }
}

/// A value with an English and a Japanese variant
///
/// Japanese text may be missing from older content, in which case
/// [`get`](Self::get) falls back to English.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Localized<T> {
    pub en: T,
    #[serde(default)]
    pub ja: Option<T>,
}

impl<T> Localized<T> {
    pub fn new(en: T, ja: T) -> Self {
        Self { en, ja: Some(ja) }
    }

    pub fn get(&self, locale: Locale) -> &T {
        match locale {
            Locale::En => &self.en,
            Locale::Ja => self.ja.as_ref().unwrap_or(&self.en),
        }
    }
}
