//! Configuration file support
//!
//! Loads settings from ~/.ctext.toml (or %USERPROFILE%\.ctext.toml on Windows)
//!
//! Example:
//! ```toml
//! catalog = "strings.toml"
//!
//! [styles]
//! warning = "color:#e5c07b;bold"
//! link = "underline;color:cyan"
//! ```
//!
//! Each entry under `[styles]` becomes a style key expanding to its style
//! string. Aliases expand against the keys registered before any alias,
//! so one alias cannot refer to another.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, TextError};
use crate::markup::StyleStringResolver;

/// Configuration settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Catalog used when none is given on the command line
    pub catalog: Option<PathBuf>,
    /// Style aliases: key to style string
    pub styles: BTreeMap<String, String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".ctext.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".ctext.toml"))
        }
    }

    /// Load the user configuration, falling back to defaults
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => match Self::load_from(&path) {
                Err(TextError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                    Ok(Config::default())
                }
                other => other,
            },
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        // A relative catalog path is relative to the config file
        if let (Some(catalog), Some(dir)) = (&config.catalog, path.parent()) {
            if catalog.is_relative() {
                config.catalog = Some(dir.join(catalog));
            }
        }
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Register every style alias as a key of `resolver`
    pub fn register_aliases<C, M>(&self, resolver: &mut StyleStringResolver<C, M>)
    where
        C: ?Sized + 'static,
        M: 'static,
    {
        let base = resolver.clone();
        for (alias, style) in &self.styles {
            let base = base.clone();
            let style = style.clone();
            if resolver.contains(alias) {
                log::debug!("style alias {alias:?} replaces a built-in key");
            }
            resolver.set_many(alias, move |ctx, _| base.resolve_str(ctx, &style));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let contents = r##"
# Comment
catalog = "strings.toml"

[styles]
warning = "color:#e5c07b;bold"
quiet = "dim"
        "##;

        let config = Config::from_toml_str(contents).unwrap();
        assert_eq!(config.catalog, Some(PathBuf::from("strings.toml")));
        assert_eq!(config.styles.get("warning").map(String::as_str), Some("color:#e5c07b;bold"));
        assert_eq!(config.styles.get("quiet").map(String::as_str), Some("dim"));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            Config::from_toml_str("tab-width = 4"),
            Err(TextError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Config::load_from(Path::new("/nonexistent/ctext/config.toml"));
        assert!(matches!(result, Err(TextError::Io(_))));
    }

    #[test]
    fn test_register_aliases() {
        let mut resolver: StyleStringResolver<(), &'static str> = StyleStringResolver::new();
        resolver.set_flag("bold", |_| Some("B"));
        resolver.set_flag("dim", |_| Some("D"));

        let config = Config::from_toml_str(
            r#"
[styles]
loud = "bold;dim"
dim = "bold"
nested = "loud"
            "#,
        )
        .unwrap();
        config.register_aliases(&mut resolver);

        assert_eq!(resolver.resolve_str(&(), "loud"), vec!["B", "D"]);
        assert_eq!(resolver.resolve_str(&(), "dim"), vec!["B"]);
        assert!(resolver.resolve_str(&(), "nested").is_empty());
    }
}
