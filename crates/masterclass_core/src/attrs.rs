//! Rendered attributes
//!
//! Parts describe what they would render as an ordered attribute map: role,
//! `aria-*`, `data-*`, `id`, `tabindex`, and the occasional inline style
//! value. The host maps these onto its own element model.

use std::fmt;

use indexmap::IndexMap;

/// Ordered attribute map for one rendered element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<&'static str, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a fresh map with `role` set
    pub fn with_role(role: &str) -> Self {
        Self::new().set("role", role)
    }

    pub fn set(mut self, name: &'static str, value: impl ToString) -> Self {
        self.entries.insert(name, value.to_string());
        self
    }

    /// Set only when `value` is present; absent values are omitted entirely
    pub fn set_opt<V: ToString>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }

    /// Boolean presence attribute, e.g. `data-disabled=""`
    pub fn flag(self, name: &'static str, present: bool) -> Self {
        if present {
            self.set(name, "")
        } else {
            self
        }
    }

    /// `"true"` / `"false"` string attribute, e.g. `aria-expanded`
    pub fn bool(self, name: &'static str, value: bool) -> Self {
        self.set(name, if value { "true" } else { "false" })
    }

    pub fn insert(&mut self, name: &'static str, value: impl ToString) {
        self.entries.insert(name, value.to_string());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn role(&self) -> Option<&str> {
        self.get("role")
    }

    pub fn tab_index(&self) -> Option<i32> {
        self.get("tabindex").and_then(|v| v.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for Attributes {
    /// HTML-style rendering: `role="dialog" aria-modal="true"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if value.is_empty() {
                f.write_str(name)?;
            } else {
                write!(f, "{}=\"{}\"", name, value.replace('"', "&quot;"))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let attrs = Attributes::with_role("switch")
            .bool("aria-checked", false)
            .flag("data-disabled", true)
            .flag("data-checked", false)
            .set_opt("aria-valuenow", None::<f64>)
            .set("tabindex", 0);

        assert_eq!(attrs.role(), Some("switch"));
        assert_eq!(attrs.get("aria-checked"), Some("false"));
        assert!(attrs.has("data-disabled"));
        assert!(!attrs.has("data-checked"));
        assert!(!attrs.has("aria-valuenow"));
        assert_eq!(attrs.tab_index(), Some(0));
    }

    #[test]
    fn test_display() {
        let attrs = Attributes::with_role("dialog")
            .bool("aria-modal", true)
            .flag("data-open", true);
        assert_eq!(
            attrs.to_string(),
            r#"role="dialog" aria-modal="true" data-open"#
        );
    }
}
