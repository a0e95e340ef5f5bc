//! Style string resolution
//!
//! A style string is a `;`-separated list of `key` or `key:value`
//! entries, for example `"bold;color:#ff8800"`. Keys and values are
//! trimmed; blank keys are skipped and blank values count as absent.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::token::StyleValue;

use super::MarkupResolver;

static STYLE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<key>[^:;]+)(:(?P<value>[^;]*))?").expect("style entry pattern")
});

/// Split a style string into its `(key, value)` entries
pub fn parse_style_string(style: &str) -> Vec<(&str, Option<&str>)> {
    STYLE_ENTRY
        .captures_iter(style)
        .filter_map(|caps| {
            let key = caps.name("key")?.as_str().trim();
            if key.is_empty() {
                return None;
            }
            let value = caps
                .name("value")
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty());
            Some((key, value))
        })
        .collect()
}

type Handler<C, M> = Arc<dyn Fn(&C, Option<&str>) -> Vec<M> + Send + Sync>;

/// Resolves style strings through handlers registered per key
pub struct StyleStringResolver<C: ?Sized, M> {
    handlers: HashMap<String, Handler<C, M>>,
}

impl<C: ?Sized, M> StyleStringResolver<C, M> {
    /// Create a resolver with no keys
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler that may produce several markups
    pub fn set_many(
        &mut self,
        key: &str,
        handler: impl Fn(&C, Option<&str>) -> Vec<M> + Send + Sync + 'static,
    ) {
        self.handlers.insert(key.to_string(), Arc::new(handler));
    }

    /// Register a handler receiving the optional value
    pub fn set(
        &mut self,
        key: &str,
        handler: impl Fn(&C, Option<&str>) -> Option<M> + Send + Sync + 'static,
    ) {
        self.set_many(key, move |ctx, value| handler(ctx, value).into_iter().collect());
    }

    /// Register a handler that ignores any value
    pub fn set_flag(&mut self, key: &str, handler: impl Fn(&C) -> Option<M> + Send + Sync + 'static) {
        self.set(key, move |ctx, _| handler(ctx));
    }

    /// Register a handler that requires a value
    pub fn set_value(
        &mut self,
        key: &str,
        handler: impl Fn(&C, &str) -> Option<M> + Send + Sync + 'static,
    ) {
        self.set(key, move |ctx, value| handler(ctx, value?));
    }

    /// Register a handler for values parsed as `T`; unparsable values are ignored
    pub fn set_parsed<T: FromStr>(
        &mut self,
        key: &str,
        handler: impl Fn(&C, T) -> Option<M> + Send + Sync + 'static,
    ) {
        self.set(key, move |ctx, value| handler(ctx, value?.parse().ok()?));
    }

    /// Remove a key, returning whether it was registered
    pub fn remove(&mut self, key: &str) -> bool {
        self.handlers.remove(key).is_some()
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Check if a key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Resolve a style string; unknown keys yield nothing
    pub fn resolve_str(&self, ctx: &C, style: &str) -> Vec<M> {
        if self.handlers.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (key, value) in parse_style_string(style) {
            match self.handlers.get(key) {
                Some(handler) => out.extend(handler(ctx, value)),
                None => log::trace!("no handler for style key {key:?}"),
            }
        }
        out
    }
}

impl<C: ?Sized, M> MarkupResolver<C, M> for StyleStringResolver<C, M> {
    fn resolve_value(&self, ctx: &C, value: &StyleValue, out: &mut Vec<M>) {
        if let Some(style) = value.as_str() {
            out.extend(self.resolve_str(ctx, style));
        }
    }
}

impl<C: ?Sized, M> Clone for StyleStringResolver<C, M> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<C: ?Sized, M> Default for StyleStringResolver<C, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, M> fmt::Debug for StyleStringResolver<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleStringResolver")
            .field("keys", &self.keys())
            .finish()
    }
}
