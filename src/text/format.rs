//! Printf-style placeholders
//!
//! `format_string` replaces `%…` placeholders with positional arguments,
//! each optionally carrying its own style. Placeholders pick the argument
//! matching their ordinal, or an explicit `N$` position.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::token::StyleToken;

use super::{RepeatPolicy, Rule, Text};

/// A `%` with optional position, flags, width and precision, ending on a conversion
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(\d+\$)?[-0+]*\d*(\.\d+)?[sdixXf]").expect("placeholder pattern")
});

/// Widths and precisions above this are not placeholders
const MAX_WIDTH: usize = 4096;

/// The value of a format argument
#[derive(Debug, Clone, PartialEq)]
pub enum FormatValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for FormatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatValue::Str(s) => f.write_str(s),
            FormatValue::Int(n) => write!(f, "{n}"),
            FormatValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A positional argument for `format_string`
#[derive(Debug, Clone, PartialEq)]
pub struct FormatArg {
    pub value: FormatValue,
    pub style: Option<StyleToken>,
}

impl FormatArg {
    /// Create an argument rendered with a style
    pub fn styled(value: impl Into<FormatArg>, style: impl Into<StyleToken>) -> Self {
        Self {
            style: Some(style.into()),
            ..value.into()
        }
    }

    fn plain(value: FormatValue) -> Self {
        Self { value, style: None }
    }
}

impl From<&str> for FormatArg {
    fn from(s: &str) -> Self {
        Self::plain(FormatValue::Str(s.to_string()))
    }
}

impl From<String> for FormatArg {
    fn from(s: String) -> Self {
        Self::plain(FormatValue::Str(s))
    }
}

impl From<i64> for FormatArg {
    fn from(n: i64) -> Self {
        Self::plain(FormatValue::Int(n))
    }
}

impl From<i32> for FormatArg {
    fn from(n: i32) -> Self {
        Self::plain(FormatValue::Int(n.into()))
    }
}

impl From<u32> for FormatArg {
    fn from(n: u32) -> Self {
        Self::plain(FormatValue::Int(n.into()))
    }
}

impl From<f64> for FormatArg {
    fn from(x: f64) -> Self {
        Self::plain(FormatValue::Float(x))
    }
}

/// A parsed placeholder
#[derive(Debug, Default, PartialEq)]
struct Spec {
    position: Option<usize>,
    left: bool,
    zero: bool,
    plus: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

impl Spec {
    /// Parse a placeholder such as `%-5s`, `%2$d` or `%.2f`
    fn parse(placeholder: &str) -> Option<Self> {
        let body = placeholder.strip_prefix('%')?;
        let conversion = body.chars().last()?;
        if !conversion.is_ascii_alphabetic() {
            return None;
        }
        let mut rest = &body[..body.len() - conversion.len_utf8()];
        let mut spec = Spec {
            conversion,
            ..Default::default()
        };

        if let Some((position, tail)) = rest.split_once('$') {
            spec.position = Some(position.parse::<usize>().ok()?.checked_sub(1)?);
            rest = tail;
        }
        while let Some(flag) = rest.chars().next().filter(|c| matches!(c, '-' | '0' | '+')) {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                _ => spec.plus = true,
            }
            rest = &rest[1..];
        }
        let (width, precision) = match rest.split_once('.') {
            Some((width, precision)) => (width, Some(precision)),
            None => (rest, None),
        };
        if !width.is_empty() {
            spec.width = width.parse().ok().filter(|&w| w <= MAX_WIDTH)?;
        }
        if let Some(precision) = precision {
            spec.precision = Some(precision.parse().ok().filter(|&p| p <= MAX_WIDTH)?);
        }
        Some(spec)
    }

    /// Format a value, or None if the conversion does not apply to it
    fn apply(&self, value: &FormatValue) -> Option<String> {
        let body = match (self.conversion, value) {
            ('s', value) => {
                let s = value.to_string();
                match self.precision {
                    Some(max) => s.chars().take(max).collect(),
                    None => s,
                }
            }
            ('d' | 'i', FormatValue::Int(n)) => self.signed(*n < 0, n.unsigned_abs().to_string()),
            ('d' | 'i', FormatValue::Str(s)) => {
                let n = s.trim().parse::<i64>().ok()?;
                self.signed(n < 0, n.unsigned_abs().to_string())
            }
            ('x', FormatValue::Int(n)) => format!("{n:x}"),
            ('X', FormatValue::Int(n)) => format!("{n:X}"),
            ('f', FormatValue::Float(x)) => self.float(*x),
            ('f', FormatValue::Int(n)) => self.float(*n as f64),
            _ => return None,
        };
        Some(self.pad(body))
    }

    fn float(&self, x: f64) -> String {
        let digits = format!("{:.*}", self.precision.unwrap_or(6), x.abs());
        self.signed(x.is_sign_negative() && x != 0.0, digits)
    }

    fn signed(&self, negative: bool, digits: String) -> String {
        let sign = if negative {
            "-"
        } else if self.plus {
            "+"
        } else {
            ""
        };
        if self.zero && !self.left && sign.len() + digits.len() < self.width {
            let zeros = "0".repeat(self.width - sign.len() - digits.len());
            format!("{sign}{zeros}{digits}")
        } else {
            format!("{sign}{digits}")
        }
    }

    fn pad(&self, body: String) -> String {
        let len = body.chars().count();
        if len >= self.width {
            body
        } else if self.left {
            format!("{body}{}", " ".repeat(self.width - len))
        } else {
            format!("{}{body}", " ".repeat(self.width - len))
        }
    }
}

/// Format one placeholder with an argument
///
/// Falls back to the plain value when the placeholder cannot be applied.
fn format_placeholder(placeholder: &str, value: &FormatValue) -> String {
    Spec::parse(placeholder)
        .and_then(|spec| spec.apply(value))
        .unwrap_or_else(|| value.to_string())
}

impl Text {
    /// Replace `%` placeholders with positional arguments
    ///
    /// A placeholder without a matching argument is kept verbatim.
    pub fn format_string<A: Into<FormatArg>>(self, args: impl IntoIterator<Item = A>) -> Self {
        let args: Vec<FormatArg> = args.into_iter().map(Into::into).collect();
        self.substitute([Rule::from_regex(
            PLACEHOLDER.clone(),
            RepeatPolicy::ReplaceAll,
            move |caps, ordinal| {
                let placeholder = &caps[0];
                let position = Spec::parse(placeholder)
                    .and_then(|spec| spec.position)
                    .unwrap_or(ordinal);
                let Some(arg) = args.get(position) else {
                    return Text::new(placeholder);
                };
                let value = format_placeholder(placeholder, &arg.value);
                match &arg.style {
                    Some(style) => Text::styled(value, style.clone()),
                    None => Text::new(value),
                }
            },
        )])
    }
}
