//! Composite text trees
//!
//! A `Text` is an immutable, reference-counted tree of fragments:
//! literals, references resolved through a `Resources` provider,
//! pluralized references, joins, style overlays, and pattern
//! substitutions. Every transformation returns a new node; subtrees are
//! shared, never copied.
//!
//! Rendering happens in [`Text::render`]: the tree is
//! flattened to a string and, in the same pass, annotated with the
//! style ranges of every node.

mod format;
mod layout;
mod substitute;

use std::fmt;
use std::ops::Add;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::error::Result;
use crate::range::RangeStyle;
use crate::resources::Resources;
use crate::token::StyleToken;

pub use format::{FormatArg, FormatValue};
pub use layout::Rendered;
pub use substitute::{plan_substitutions, RepeatPolicy, Replacement, Rule};

/// Leading whitespace of the whole text
static LEADING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+").expect("leading space pattern"));
/// Trailing whitespace of the whole text
static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+$").expect("trailing space pattern"));
/// End of the whole text
static END_OF_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"$").expect("end pattern"));
/// Whitespace trailing a word character at the end of each line
static UNTERMINATED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\w(?P<slot>\s*)$").expect("line end pattern"));

/// Signature of the range generators used by style overlays
pub type RangeFn = dyn Fn(&dyn Resources, &str) -> Result<Vec<RangeStyle>> + Send + Sync;

/// A function adding style ranges over an already flattened string
#[derive(Clone)]
pub struct RangeGenerator(Arc<RangeFn>);

impl RangeGenerator {
    /// Wrap a range generating function
    pub fn new(
        f: impl Fn(&dyn Resources, &str) -> Result<Vec<RangeStyle>> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// Generate ranges for a flattened string
    pub fn generate(&self, resources: &dyn Resources, text: &str) -> Result<Vec<RangeStyle>> {
        (self.0)(resources, text)
    }
}

impl PartialEq for RangeGenerator {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for RangeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RangeGenerator")
    }
}

/// The node variants of a text tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A fixed string
    Literal {
        text: Arc<str>,
        style: Option<StyleToken>,
    },
    /// A string looked up by identifier at render time
    Reference {
        id: Arc<str>,
        style: Option<StyleToken>,
    },
    /// A quantity-dependent string looked up by identifier at render time
    Quantified {
        id: Arc<str>,
        quantity: i64,
        style: Option<StyleToken>,
    },
    /// Present parts in order, with a separator between neighbours
    Join {
        separator: Option<Text>,
        style: Option<StyleToken>,
        parts: Vec<Option<Text>>,
    },
    /// Extra ranges laid over an unchanged inner text
    Overlay {
        inner: Text,
        ranges: RangeGenerator,
    },
    /// Pattern substitutions applied to an inner text
    Substitution { inner: Text, rules: Vec<Rule> },
}

/// An immutable composite text
#[derive(Debug, Clone)]
pub struct Text(Arc<Node>);

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Text {
    fn from_node(node: Node) -> Self {
        Self(Arc::new(node))
    }

    /// Create an unstyled literal
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self::from_node(Node::Literal {
            text: text.into(),
            style: None,
        })
    }

    /// Create a styled literal
    pub fn styled(text: impl Into<Arc<str>>, style: impl Into<StyleToken>) -> Self {
        Self::from_node(Node::Literal {
            text: text.into(),
            style: Some(style.into()),
        })
    }

    /// Create a reference to a string resource
    pub fn reference(id: impl Into<Arc<str>>) -> Self {
        Self::from_node(Node::Reference {
            id: id.into(),
            style: None,
        })
    }

    /// Create a styled reference to a string resource
    pub fn reference_styled(id: impl Into<Arc<str>>, style: impl Into<StyleToken>) -> Self {
        Self::from_node(Node::Reference {
            id: id.into(),
            style: Some(style.into()),
        })
    }

    /// Create a reference to a plural resource
    pub fn plural(id: impl Into<Arc<str>>, quantity: i64) -> Self {
        Self::from_node(Node::Quantified {
            id: id.into(),
            quantity,
            style: None,
        })
    }

    /// Create a styled reference to a plural resource
    pub fn plural_styled(
        id: impl Into<Arc<str>>,
        quantity: i64,
        style: impl Into<StyleToken>,
    ) -> Self {
        Self::from_node(Node::Quantified {
            id: id.into(),
            quantity,
            style: Some(style.into()),
        })
    }

    /// The empty text
    pub fn empty() -> Self {
        Self::new("")
    }

    /// A single line break
    pub fn line_break() -> Self {
        Self::new("\n")
    }

    /// A single space
    pub fn space() -> Self {
        Self::new(" ")
    }

    /// Join parts with an optional separator and style
    ///
    /// Absent parts contribute neither content nor a separator.
    pub fn join<I, P>(separator: Option<Text>, style: Option<StyleToken>, parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<Text>>,
    {
        Self::from_node(Node::Join {
            separator,
            style,
            parts: parts.into_iter().map(Into::into).collect(),
        })
    }

    /// Concatenate parts without a separator
    pub fn concatenate<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<Text>>,
    {
        Self::join(None, None, parts)
    }

    /// Join parts with single spaces
    pub fn spaced<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<Text>>,
    {
        Self::join(Some(Self::space()), None, parts)
    }

    /// Join parts with a separator
    pub fn joining<I, P>(separator: Text, parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<Text>>,
    {
        Self::join(Some(separator), None, parts)
    }

    /// Put every part on its own line
    ///
    /// All parts but the last get a trailing line break.
    pub fn lines<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<Text>>,
    {
        let mut parts: Vec<Option<Text>> = parts.into_iter().map(Into::into).collect();
        let last = parts.pop().flatten();
        let mut lines: Vec<Option<Text>> = parts
            .into_iter()
            .map(|part| {
                part.map(|text| {
                    text.substitute([Rule::from_regex(
                        END_OF_TEXT.clone(),
                        RepeatPolicy::ReplaceAll,
                        |_, _| Text::line_break(),
                    )])
                })
            })
            .collect();
        lines.push(last);
        Self::concatenate(lines)
    }

    /// The node behind this text
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// The style token covering this node's whole output, if any
    pub fn style(&self) -> Option<&StyleToken> {
        match self.node() {
            Node::Literal { style, .. }
            | Node::Reference { style, .. }
            | Node::Quantified { style, .. }
            | Node::Join { style, .. } => style.as_ref(),
            Node::Overlay { .. } | Node::Substitution { .. } => None,
        }
    }

    /// Apply a style to the whole text
    pub fn with_style(self, style: impl Into<StyleToken>) -> Self {
        self.with_optional_style(Some(style.into()))
    }

    /// Apply a style to the whole text; `None` leaves the text unchanged
    ///
    /// An unstyled join adopts the style directly, anything else is
    /// wrapped in a single-part join.
    pub fn with_optional_style(self, style: Option<StyleToken>) -> Self {
        let Some(style) = style else {
            return self;
        };
        match self.node() {
            Node::Join {
                separator,
                style: None,
                parts,
            } => Self::from_node(Node::Join {
                separator: separator.clone(),
                style: Some(style),
                parts: parts.clone(),
            }),
            _ => Self::join(None, Some(style), [self]),
        }
    }

    /// Lay extra ranges over this text without changing its content
    pub fn overlay(
        self,
        ranges: impl Fn(&dyn Resources, &str) -> Result<Vec<RangeStyle>> + Send + Sync + 'static,
    ) -> Self {
        Self::from_node(Node::Overlay {
            inner: self,
            ranges: RangeGenerator::new(ranges),
        })
    }

    /// Apply substitution rules to this text
    pub fn substitute(self, rules: impl IntoIterator<Item = Rule>) -> Self {
        Self::from_node(Node::Substitution {
            inner: self,
            rules: rules.into_iter().collect(),
        })
    }

    /// Replace every match of a pattern
    ///
    /// The factory receives the match and its ordinal among all matches
    /// of the pattern.
    pub fn replace_all(
        self,
        pattern: &str,
        factory: impl Fn(&Captures<'_>, usize) -> Text + Send + Sync + 'static,
    ) -> Result<Self> {
        Ok(self.substitute([Rule::new(pattern, RepeatPolicy::ReplaceAll, factory)?]))
    }

    /// Replace the first accepted match of a pattern
    pub fn replace_once(
        self,
        pattern: &str,
        factory: impl Fn(&Captures<'_>) -> Text + Send + Sync + 'static,
    ) -> Result<Self> {
        let rule = Rule::new(pattern, RepeatPolicy::ReplaceFirstOnly, move |caps, _| factory(caps))?;
        Ok(self.substitute([rule]))
    }

    /// Replace every occurrence of each literal string
    pub fn replace_all_str<'a>(
        self,
        pairs: impl IntoIterator<Item = (&'a str, Text)>,
    ) -> Result<Self> {
        self.replace_literals(pairs, RepeatPolicy::ReplaceAll)
    }

    /// Replace the first occurrence of each literal string
    pub fn replace_once_str<'a>(
        self,
        pairs: impl IntoIterator<Item = (&'a str, Text)>,
    ) -> Result<Self> {
        self.replace_literals(pairs, RepeatPolicy::ReplaceFirstOnly)
    }

    fn replace_literals<'a>(
        self,
        pairs: impl IntoIterator<Item = (&'a str, Text)>,
        policy: RepeatPolicy,
    ) -> Result<Self> {
        let rules = pairs
            .into_iter()
            .map(|(needle, replacement)| Rule::literal(needle, replacement, policy))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.substitute(rules))
    }

    /// Surround the text with double quotes
    pub fn quoted(self) -> Self {
        Self::concatenate([Self::new("\""), self, Self::new("\"")])
    }

    /// End every line that stops on a word character with a full stop
    ///
    /// Whitespace after the last word character is replaced.
    pub fn terminated(self) -> Self {
        self.substitute([Rule::from_regex(
            UNTERMINATED_LINE.clone(),
            RepeatPolicy::ReplaceAll,
            |_, _| Text::new("."),
        )])
    }

    /// Remove leading and trailing whitespace
    pub fn trim(self) -> Self {
        self.substitute([
            Rule::from_regex(LEADING_SPACE.clone(), RepeatPolicy::ReplaceAll, |_, _| {
                Text::empty()
            }),
            Rule::from_regex(TRAILING_SPACE.clone(), RepeatPolicy::ReplaceAll, |_, _| {
                Text::empty()
            }),
        ])
    }

    /// Style every match of a pattern with the style `style_for` picks
    pub fn style_matches(
        self,
        pattern: Regex,
        style_for: impl Fn(&str) -> Option<StyleToken> + Send + Sync + 'static,
    ) -> Self {
        self.overlay(move |_, text| {
            Ok(pattern
                .find_iter(text)
                .filter_map(|m| {
                    let style = style_for(m.as_str())?;
                    RangeStyle::from_span(m.range(), style)
                })
                .collect())
        })
    }

    /// Style every whole-word occurrence of another text
    ///
    /// Each occurrence gets all of `styles`, followed by the subtext's
    /// own style if it has one.
    pub fn style_occurrences(self, subtext: Text, styles: Vec<StyleToken>) -> Self {
        self.overlay(move |resources, text| {
            let needle = subtext.flatten(resources)?;
            if needle.is_empty() {
                return Ok(Vec::new());
            }
            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&needle)))?;
            Ok(occurrence_ranges(&pattern, text, &styles, subtext.style()))
        })
    }

    /// Style every match of a pattern chosen at render time
    pub fn style_occurrences_with(
        self,
        pattern_for: impl Fn(&dyn Resources) -> Result<Regex> + Send + Sync + 'static,
        styles: Vec<StyleToken>,
    ) -> Self {
        self.overlay(move |resources, text| {
            let pattern = pattern_for(resources)?;
            Ok(occurrence_ranges(&pattern, text, &styles, None))
        })
    }
}

fn occurrence_ranges(
    pattern: &Regex,
    text: &str,
    styles: &[StyleToken],
    extra: Option<&StyleToken>,
) -> Vec<RangeStyle> {
    let mut ranges = Vec::new();
    for m in pattern.find_iter(text) {
        for style in styles.iter().chain(extra) {
            if let Some(range) = RangeStyle::from_span(m.range(), style.clone()) {
                ranges.push(range);
            }
        }
    }
    ranges
}

impl Add for Text {
    type Output = Text;

    fn add(self, rhs: Text) -> Text {
        Text::concatenate([self, rhs])
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::new(text)
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, PluralForms};
    use crate::resources::NoResources;

    fn render(text: &Text) -> Rendered {
        text.render(&NoResources).unwrap()
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Text::styled("a", "bold"), Text::styled("a", "bold"));
        assert_ne!(Text::styled("a", "bold"), Text::styled("a", "italic"));
        assert_eq!(
            Text::spaced([Text::new("a"), Text::new("b")]),
            Text::spaced([Text::new("a"), Text::new("b")])
        );
        assert_ne!(Text::reference("a"), Text::new("a"));
        assert_ne!(Text::plural("a", 1), Text::plural("a", 2));
    }

    #[test]
    fn test_with_style_on_unstyled_join_adopts_style() {
        let text = Text::spaced([Text::new("a"), Text::new("b")]).with_style("bold");
        match text.node() {
            Node::Join { separator, style, parts } => {
                assert_eq!(separator, &Some(Text::space()));
                assert_eq!(style, &Some(StyleToken::from("bold")));
                assert_eq!(parts.len(), 2);
            }
            other => panic!("expected join, got {other:?}"),
        }
    }

    #[test]
    fn test_with_style_wraps_styled_nodes() {
        let text = Text::styled("a", "bold").with_style("italic");
        assert_eq!(text.style(), Some(&StyleToken::from("italic")));
        let rendered = render(&text);
        assert_eq!(
            rendered.ranges,
            vec![RangeStyle::new(0, 0, "italic"), RangeStyle::new(0, 0, "bold")]
        );
        let unchanged = Text::new("a").with_optional_style(None);
        assert_eq!(unchanged, Text::new("a"));
    }

    #[test]
    fn test_add_concatenates() {
        let text = Text::new("foo") + Text::styled("bar", "bold");
        let rendered = render(&text);
        assert_eq!(rendered.text, "foobar");
        assert_eq!(rendered.ranges, vec![RangeStyle::new(3, 5, "bold")]);
    }

    #[test]
    fn test_lines() {
        let text = Text::lines([
            Some(Text::styled("one", "bold")),
            None,
            Some(Text::new("two")),
            Some(Text::new("three")),
        ]);
        let rendered = render(&text);
        assert_eq!(rendered.text, "one\ntwo\nthree");
        assert_eq!(rendered.ranges, vec![RangeStyle::new(0, 2, "bold")]);
    }

    #[test]
    fn test_quoted_keeps_inner_styles() {
        let text = (Text::new("say ") + Text::styled("hi", "bold")).quoted();
        let rendered = render(&text);
        assert_eq!(rendered.text, "\"say hi\"");
        assert_eq!(rendered.ranges, vec![RangeStyle::new(5, 6, "bold")]);
    }

    #[test]
    fn test_terminated() {
        assert_eq!(Text::new("Done  ").terminated().flatten(&NoResources).unwrap(), "Done.");
        assert_eq!(Text::new("Done!").terminated().flatten(&NoResources).unwrap(), "Done!");
        assert_eq!(
            Text::new("first\nsecond?\nthird").terminated().flatten(&NoResources).unwrap(),
            "first.\nsecond?\nthird."
        );
    }

    #[test]
    fn test_trim_keeps_styles_in_place() {
        let text =
            Text::concatenate([Text::new("  "), Text::styled("word", "bold"), Text::new(" \n")])
                .trim();
        let rendered = render(&text);
        assert_eq!(rendered.text, "word");
        assert_eq!(rendered.ranges, vec![RangeStyle::new(0, 3, "bold")]);
    }

    #[test]
    fn test_style_matches() {
        let digits = Regex::new(r"\d+").unwrap();
        let text = Text::new("call 555 or 911").style_matches(digits, |m| {
            (m != "911").then(|| StyleToken::from("bold"))
        });
        let rendered = render(&text);
        assert_eq!(rendered.text, "call 555 or 911");
        assert_eq!(rendered.ranges, vec![RangeStyle::new(5, 7, "bold")]);
    }

    #[test]
    fn test_style_occurrences_uses_resources() {
        let catalog = Catalog::new().with_string("name", "Ada");
        let text = Text::new("Ada met Adam and Ada").style_occurrences(
            Text::reference_styled("name", "italic"),
            vec![StyleToken::from("bold")],
        );
        let rendered = text.render(&catalog).unwrap();
        assert_eq!(
            rendered.ranges,
            vec![
                RangeStyle::new(0, 2, "bold"),
                RangeStyle::new(0, 2, "italic"),
                RangeStyle::new(17, 19, "bold"),
                RangeStyle::new(17, 19, "italic"),
            ]
        );
    }

    #[test]
    fn test_style_occurrences_with_pattern() {
        let text = Text::new("a1 b2").style_occurrences_with(
            |_| Ok(Regex::new(r"[a-z]\d")?),
            vec![StyleToken::from("code")],
        );
        let rendered = render(&text);
        assert_eq!(
            rendered.ranges,
            vec![RangeStyle::new(0, 1, "code"), RangeStyle::new(3, 4, "code")]
        );
    }

    #[test]
    fn test_plural_and_reference_render() {
        let catalog = Catalog::new().with_string("title", "Inbox").with_plural(
            "unread",
            PluralForms {
                one: Some("one unread".into()),
                other: Some("many unread".into()),
                ..Default::default()
            },
        );
        let text = Text::joining(
            Text::new(": "),
            [Text::reference_styled("title", "bold"), Text::plural_styled("unread", 3, "dim")],
        );
        let rendered = text.render(&catalog).unwrap();
        assert_eq!(rendered.text, "Inbox: many unread");
        assert_eq!(
            rendered.ranges,
            vec![RangeStyle::new(0, 4, "bold"), RangeStyle::new(7, 17, "dim")]
        );
    }

    #[test]
    fn test_replace_str_helpers() {
        let text = Text::new("a-b-c")
            .replace_once_str([("-", Text::new("+"))])
            .unwrap();
        assert_eq!(text.flatten(&NoResources).unwrap(), "a+b-c");
        let text = Text::new("a-b-c")
            .replace_all_str([("-", Text::new("+")), ("c", Text::new("C"))])
            .unwrap();
        assert_eq!(text.flatten(&NoResources).unwrap(), "a+b+C");
    }
}
