//! Flattening and range collection
//!
//! `flatten` produces the plain string of a tree. `render` produces the
//! same string together with the style ranges of every node, in the
//! node's own coordinate space, outer ranges before inner ones.

use crate::error::Result;
use crate::range::RangeStyle;
use crate::resources::Resources;
use crate::token::StyleToken;

use super::substitute;
use super::{Node, Text};

/// A flattened text together with its style ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    /// The flattened string
    pub text: String,
    /// Style ranges over `text`, outer before inner
    pub ranges: Vec<RangeStyle>,
}

impl Rendered {
    /// A rendered leaf: its content plus an optional full-span range
    fn leaf(text: String, style: Option<&StyleToken>) -> Self {
        let ranges = own_range(&text, style).into_iter().collect();
        Self { text, ranges }
    }

    /// Append another rendered piece, shifting its ranges to its new start
    pub(super) fn append(&mut self, piece: &Rendered) {
        let cursor = self.text.len();
        self.ranges
            .extend(piece.ranges.iter().map(|range| range.offset(cursor)));
        self.text.push_str(&piece.text);
    }
}

/// The range a node's own style covers; none for an empty output
fn own_range(text: &str, style: Option<&StyleToken>) -> Option<RangeStyle> {
    RangeStyle::from_span(0..text.len(), style?.clone())
}

impl Text {
    /// Flatten this text to a plain string
    ///
    /// Fails if any reference in the tree cannot be resolved; no partial
    /// string is returned.
    pub fn flatten(&self, resources: &dyn Resources) -> Result<String> {
        match self.node() {
            Node::Literal { text, .. } => Ok(text.to_string()),
            Node::Reference { id, .. } => resources.string(id),
            Node::Quantified { id, quantity, .. } => resources.plural(id, *quantity),
            Node::Join {
                separator, parts, ..
            } => {
                let mut output = String::new();
                let mut separator_text: Option<String> = None;
                for (index, part) in parts.iter().flatten().enumerate() {
                    if index > 0 {
                        if let Some(separator) = separator {
                            if separator_text.is_none() {
                                separator_text = Some(separator.flatten(resources)?);
                            }
                            if let Some(text) = &separator_text {
                                output.push_str(text);
                            }
                        }
                    }
                    output.push_str(&part.flatten(resources)?);
                }
                Ok(output)
            }
            Node::Overlay { inner, .. } => inner.flatten(resources),
            Node::Substitution { inner, rules } => substitute::flatten(inner, rules, resources),
        }
    }

    /// Flatten this text and collect its style ranges in one pass
    pub fn render(&self, resources: &dyn Resources) -> Result<Rendered> {
        match self.node() {
            Node::Literal { text, style } => Ok(Rendered::leaf(text.to_string(), style.as_ref())),
            Node::Reference { id, style } => {
                Ok(Rendered::leaf(resources.string(id)?, style.as_ref()))
            }
            Node::Quantified { id, quantity, style } => Ok(Rendered::leaf(
                resources.plural(id, *quantity)?,
                style.as_ref(),
            )),
            Node::Join {
                separator,
                style,
                parts,
            } => render_join(separator.as_ref(), style.as_ref(), parts, resources),
            Node::Overlay { inner, ranges } => {
                let mut rendered = inner.render(resources)?;
                let len = rendered.text.len();
                for range in ranges.generate(resources, &rendered.text)? {
                    if range.start <= range.end && range.end < len {
                        rendered.ranges.push(range);
                    } else {
                        log::debug!(
                            "dropping overlay range {}..={} outside text of length {}",
                            range.start,
                            range.end,
                            len
                        );
                    }
                }
                Ok(rendered)
            }
            Node::Substitution { inner, rules } => substitute::render(inner, rules, resources),
        }
    }

    /// Collect the style ranges of this text
    ///
    /// Offsets are relative to the start of `self.flatten(..)`.
    pub fn collect_ranges(&self, resources: &dyn Resources) -> Result<Vec<RangeStyle>> {
        Ok(self.render(resources)?.ranges)
    }
}

fn render_join(
    separator: Option<&Text>,
    style: Option<&StyleToken>,
    parts: &[Option<Text>],
    resources: &dyn Resources,
) -> Result<Rendered> {
    let mut rendered = Rendered::default();
    // The separator renders at most once per call
    let mut rendered_separator: Option<Rendered> = None;

    for (index, part) in parts.iter().flatten().enumerate() {
        if index > 0 {
            if let Some(separator) = separator {
                if rendered_separator.is_none() {
                    rendered_separator = Some(separator.render(resources)?);
                }
                if let Some(piece) = &rendered_separator {
                    rendered.append(piece);
                }
            }
        }
        rendered.append(&part.render(resources)?);
    }

    if let Some(range) = own_range(&rendered.text, style) {
        rendered.ranges.insert(0, range);
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::TextError;
    use crate::resources::NoResources;

    fn assert_contained(rendered: &Rendered) {
        for range in &rendered.ranges {
            assert!(range.start <= range.end, "inverted range {range:?}");
            assert!(range.end < rendered.text.len(), "range {range:?} outside {:?}", rendered.text);
        }
    }

    #[test]
    fn test_literal_own_range() {
        let rendered = Text::styled("hello", "bold").render(&NoResources).unwrap();
        assert_eq!(rendered.text, "hello");
        assert_eq!(rendered.ranges, vec![RangeStyle::new(0, 4, "bold")]);
    }

    #[test]
    fn test_empty_output_has_no_own_range() {
        let rendered = Text::styled("", "bold").render(&NoResources).unwrap();
        assert_eq!(rendered.text, "");
        assert!(rendered.ranges.is_empty());

        let join = Text::join(None, Some("bold".into()), [None::<Text>, None]);
        assert!(join.collect_ranges(&NoResources).unwrap().is_empty());
    }

    #[test]
    fn test_join_with_absent_parts() {
        let text = Text::joining(
            Text::new(", "),
            [Some(Text::new("a")), None, Some(Text::styled("b", "italic"))],
        );
        let rendered = text.render(&NoResources).unwrap();
        assert_eq!(rendered.text, "a, b");
        assert_eq!(rendered.ranges, vec![RangeStyle::new(3, 3, "italic")]);
    }

    #[test]
    fn test_join_separator_law() {
        let a = Text::styled("left", "bold");
        let b = Text::new("right");
        let sep = Text::styled(" | ", "dim");
        let joined = Text::joining(sep.clone(), [None, Some(a.clone()), None, Some(b.clone())]);
        let expected = format!(
            "{}{}{}",
            a.flatten(&NoResources).unwrap(),
            sep.flatten(&NoResources).unwrap(),
            b.flatten(&NoResources).unwrap()
        );
        assert_eq!(joined.flatten(&NoResources).unwrap(), expected);

        let single = Text::joining(sep.clone(), [None, Some(a.clone()), None]);
        assert_eq!(single.flatten(&NoResources).unwrap(), "left");
        let none = Text::joining(sep, [None::<Text>, None]);
        assert_eq!(none.flatten(&NoResources).unwrap(), "");
    }

    #[test]
    fn test_separator_ranges_repeat_at_each_gap() {
        let text = Text::join(
            Some(Text::styled("-", "dim")),
            Some("bold".into()),
            [Text::new("a"), Text::styled("b", "italic"), Text::new("c")],
        );
        let rendered = text.render(&NoResources).unwrap();
        assert_eq!(rendered.text, "a-b-c");
        assert_eq!(
            rendered.ranges,
            vec![
                RangeStyle::new(0, 4, "bold"),
                RangeStyle::new(1, 1, "dim"),
                RangeStyle::new(2, 2, "italic"),
                RangeStyle::new(3, 3, "dim"),
            ]
        );
    }

    #[test]
    fn test_nested_joins_offset_consistently() {
        let inner = Text::spaced([Text::styled("x", "a"), Text::styled("y", "b")]);
        let outer = Text::concatenate([Text::new(">>"), inner.with_style("c")]);
        let rendered = outer.render(&NoResources).unwrap();
        assert_eq!(rendered.text, ">>x y");
        assert_eq!(
            rendered.ranges,
            vec![
                RangeStyle::new(2, 4, "c"),
                RangeStyle::new(2, 2, "a"),
                RangeStyle::new(4, 4, "b"),
            ]
        );
        assert_contained(&rendered);
    }

    #[test]
    fn test_overlay_does_not_change_content() {
        let base = Text::spaced([Text::new("one"), Text::styled("two", "bold")]);
        let overlay = base
            .clone()
            .overlay(|_, text| Ok(vec![RangeStyle::new(0, text.len() - 1, "link")]));
        assert_eq!(
            overlay.flatten(&NoResources).unwrap(),
            base.flatten(&NoResources).unwrap()
        );
        let rendered = overlay.render(&NoResources).unwrap();
        assert_eq!(
            rendered.ranges,
            vec![RangeStyle::new(4, 6, "bold"), RangeStyle::new(0, 6, "link")]
        );
        assert_eq!(overlay.style(), None);
    }

    #[test]
    fn test_overlay_drops_out_of_bounds_ranges() {
        let text = Text::new("abc").overlay(|_, _| {
            Ok(vec![RangeStyle::new(1, 2, "ok"), RangeStyle::new(2, 3, "too far")])
        });
        let rendered = text.render(&NoResources).unwrap();
        assert_eq!(rendered.ranges, vec![RangeStyle::new(1, 2, "ok")]);
    }

    #[test]
    fn test_resolution_error_aborts_whole_call() {
        let catalog = Catalog::new().with_string("known", "yes");
        let text = Text::spaced([Text::reference("known"), Text::reference("missing")]);
        assert!(matches!(
            text.flatten(&catalog),
            Err(TextError::Resolution { ref id }) if id == "missing"
        ));
        assert!(text.render(&catalog).is_err());
        assert!(Text::plural("missing", 2).collect_ranges(&catalog).is_err());
    }

    #[test]
    fn test_flatten_is_repeatable() {
        let catalog = Catalog::new().with_string("name", "Grace");
        let text = Text::spaced([Text::new("Hi"), Text::reference_styled("name", "bold")])
            .replace_all("Grace", |_, _| Text::styled("G.", "italic"))
            .unwrap();
        let first = text.flatten(&catalog).unwrap();
        let second = text.flatten(&catalog).unwrap();
        assert_eq!(first, second);
        assert_eq!(text.render(&catalog).unwrap().text, first);
    }
}
