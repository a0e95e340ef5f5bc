//! Rendering style ranges into markups
//!
//! `apply_markups` resolves every range of a rendered text through a
//! markup resolver, producing half-open spans in range order.

pub mod terminal;

use std::ops::Range;

use crate::error::Result;
use crate::markup::MarkupResolver;
use crate::resources::Resources;
use crate::text::{Rendered, Text};

/// A markup attached to a half-open byte span
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupSpan<M> {
    pub range: Range<usize>,
    pub markup: M,
}

/// Resolve each style range into markup spans
///
/// Spans follow the range order (outer before inner); the markups of one
/// range keep the order the resolver produced them in.
pub fn apply_markups<C: ?Sized, M>(
    rendered: &Rendered,
    ctx: &C,
    resolver: &dyn MarkupResolver<C, M>,
) -> Vec<MarkupSpan<M>> {
    let mut spans = Vec::new();
    for range in &rendered.ranges {
        for markup in resolver.resolve(ctx, &range.style) {
            spans.push(MarkupSpan {
                range: range.span(),
                markup,
            });
        }
    }
    spans
}

/// A flattened string with its resolved markup spans
#[derive(Debug, Clone, PartialEq)]
pub struct Styled<M> {
    pub text: String,
    pub spans: Vec<MarkupSpan<M>>,
}

impl<M> Styled<M> {
    /// Resolve the ranges of a rendered text
    pub fn new<C: ?Sized>(rendered: Rendered, ctx: &C, resolver: &dyn MarkupResolver<C, M>) -> Self {
        let spans = apply_markups(&rendered, ctx, resolver);
        Self {
            text: rendered.text,
            spans,
        }
    }

    /// Render a text and resolve its ranges
    ///
    /// `override_resolver`, when given, replaces `resolver` for this call only.
    pub fn render<C: ?Sized>(
        text: &Text,
        resources: &dyn Resources,
        ctx: &C,
        resolver: &dyn MarkupResolver<C, M>,
        override_resolver: Option<&dyn MarkupResolver<C, M>>,
    ) -> Result<Self> {
        let rendered = text.render(resources)?;
        Ok(Self::new(rendered, ctx, override_resolver.unwrap_or(resolver)))
    }

    /// Markups covering a byte offset, in span order
    pub fn markups_at(&self, offset: usize) -> impl Iterator<Item = &M> + '_ {
        self.spans
            .iter()
            .filter(move |span| span.range.contains(&offset))
            .map(|span| &span.markup)
    }
}
