//! Style tokens
//!
//! A style token is the opaque value attached to a span of text. The
//! composition engine never looks inside it; markup resolvers turn it
//! into renderer-specific presentation objects later on.

use std::fmt;
use std::sync::Arc;

/// A shared action attached to a span of text (for example a click handler)
///
/// Two callbacks are equal only if they share the same underlying closure.
#[derive(Clone)]
pub struct Callback {
    name: Arc<str>,
    action: Arc<dyn Fn() + Send + Sync>,
}

impl Callback {
    /// Create a named callback
    pub fn new(name: impl Into<Arc<str>>, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            action: Arc::new(action),
        }
    }

    /// Name used for debugging output
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the action
    pub fn invoke(&self) {
        (self.action)()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.action) as *const (),
            Arc::as_ptr(&other.action) as *const (),
        )
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({})", self.name)
    }
}

/// The kind of a single style value, used to route values to resolvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Str,
    Callback,
}

/// A single, non-list style value
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// A style string such as `"bold"` or `"color:#f00;underline"`
    Str(Arc<str>),
    /// An action to attach to the span
    Callback(Callback),
}

impl StyleValue {
    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            StyleValue::Str(_) => ValueKind::Str,
            StyleValue::Callback(_) => ValueKind::Callback,
        }
    }

    /// Get the style string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            StyleValue::Callback(_) => None,
        }
    }
}

/// A style token: one value or an ordered list of tokens
///
/// Lists are distributed: each element applies independently to the
/// same span.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleToken {
    Single(StyleValue),
    List(Vec<StyleToken>),
}

impl StyleToken {
    /// Visit every single value in order, descending into lists
    pub fn for_each_value<'a>(&'a self, f: &mut impl FnMut(&'a StyleValue)) {
        match self {
            StyleToken::Single(value) => f(value),
            StyleToken::List(items) => {
                for item in items {
                    item.for_each_value(f);
                }
            }
        }
    }

    /// Collect every single value in order
    pub fn values(&self) -> Vec<&StyleValue> {
        let mut values = Vec::new();
        self.for_each_value(&mut |v| values.push(v));
        values
    }

    /// The style string of a single string token
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleToken::Single(value) => value.as_str(),
            StyleToken::List(_) => None,
        }
    }
}

impl From<&str> for StyleToken {
    fn from(s: &str) -> Self {
        StyleToken::Single(StyleValue::Str(s.into()))
    }
}

impl From<String> for StyleToken {
    fn from(s: String) -> Self {
        StyleToken::Single(StyleValue::Str(s.into()))
    }
}

impl From<Callback> for StyleToken {
    fn from(callback: Callback) -> Self {
        StyleToken::Single(StyleValue::Callback(callback))
    }
}

impl From<StyleValue> for StyleToken {
    fn from(value: StyleValue) -> Self {
        StyleToken::Single(value)
    }
}

impl<T: Into<StyleToken>> From<Vec<T>> for StyleToken {
    fn from(items: Vec<T>) -> Self {
        StyleToken::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_values_are_distributed() {
        let token = StyleToken::from(vec![
            StyleToken::from("bold"),
            StyleToken::from(vec!["italic", "underline"]),
        ]);
        let names: Vec<_> = token.values().iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["bold", "italic", "underline"]);
        assert_eq!(token.as_str(), None);
    }

    #[test]
    fn test_callback_identity_equality() {
        let a = Callback::new("open", || {});
        let b = Callback::new("open", || {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(StyleValue::Callback(a).kind(), ValueKind::Callback);
    }
}
