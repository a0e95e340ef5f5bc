//! String catalogs
//!
//! A `Catalog` is an in-memory table of strings and plural forms, usually
//! loaded from a TOML file:
//!
//! ```text
//! [strings]
//! greeting = "Hello %s!"
//!
//! [plurals.apples]
//! one = "%d apple"
//! other = "%d apples"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TextError};
use crate::resources::Resources;

/// Quantity-dependent forms of one plural entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PluralForms {
    pub zero: Option<String>,
    pub one: Option<String>,
    pub two: Option<String>,
    pub other: Option<String>,
}

impl PluralForms {
    /// Pick the form for a quantity, falling back to `other`
    pub fn select(&self, quantity: i64) -> Option<&str> {
        let specific = match quantity {
            0 => self.zero.as_deref(),
            1 => self.one.as_deref(),
            2 => self.two.as_deref(),
            _ => None,
        };
        specific.or(self.other.as_deref())
    }
}

/// A table of strings and plurals implementing `Resources`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    strings: HashMap<String, String>,
    #[serde(default)]
    plurals: HashMap<String, PluralForms>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML source
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Builder: add a string entry
    pub fn with_string(mut self, id: &str, value: &str) -> Self {
        self.insert_string(id, value);
        self
    }

    /// Builder: add a plural entry
    pub fn with_plural(mut self, id: &str, forms: PluralForms) -> Self {
        self.plurals.insert(id.to_string(), forms);
        self
    }

    /// Add or replace a string entry
    pub fn insert_string(&mut self, id: &str, value: &str) {
        self.strings.insert(id.to_string(), value.to_string());
    }

    /// Merge another catalog into this one; entries from `other` win
    pub fn merge(&mut self, other: Catalog) {
        self.strings.extend(other.strings);
        self.plurals.extend(other.plurals);
    }

    /// Check whether a string entry exists
    pub fn contains(&self, id: &str) -> bool {
        self.strings.contains_key(id)
    }

    /// Number of string and plural entries
    pub fn len(&self) -> usize {
        self.strings.len() + self.plurals.len()
    }

    /// Check if the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Resources for Catalog {
    fn string(&self, id: &str) -> Result<String> {
        self.strings
            .get(id)
            .cloned()
            .ok_or_else(|| TextError::Resolution { id: id.to_string() })
    }

    fn plural(&self, id: &str, quantity: i64) -> Result<String> {
        self.plurals
            .get(id)
            .and_then(|forms| forms.select(quantity))
            .map(str::to_string)
            .ok_or_else(|| TextError::PluralResolution {
                id: id.to_string(),
                quantity,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[strings]
greeting = "Hello %s!"

[plurals.apples]
one = "%d apple"
other = "%d apples"

[plurals.messages]
zero = "No messages"
one = "One message"
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.string("greeting").unwrap(), "Hello %s!");
        assert!(catalog.contains("greeting"));
    }

    #[test]
    fn test_plural_selection() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        assert_eq!(catalog.plural("apples", 1).unwrap(), "%d apple");
        assert_eq!(catalog.plural("apples", 0).unwrap(), "%d apples");
        assert_eq!(catalog.plural("apples", 7).unwrap(), "%d apples");
        assert_eq!(catalog.plural("messages", 0).unwrap(), "No messages");
        // No `other` form to fall back on
        assert!(catalog.plural("messages", 5).is_err());
    }

    #[test]
    fn test_missing_entries_fail() {
        let catalog = Catalog::new().with_string("a", "A");
        let err = catalog.string("b").unwrap_err();
        assert!(err.is_resolution());
        assert!(matches!(
            catalog.plural("b", 1),
            Err(TextError::PluralResolution { quantity: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Catalog::from_toml_str("[strings\nbroken"),
            Err(TextError::Config(_))
        ));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Catalog::new().with_string("a", "A").with_string("b", "B");
        base.merge(Catalog::new().with_string("b", "bee"));
        assert_eq!(base.string("a").unwrap(), "A");
        assert_eq!(base.string("b").unwrap(), "bee");
    }
}
