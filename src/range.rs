//! Styled ranges
//!
//! A `RangeStyle` marks a closed interval of byte offsets in a rendered
//! string with a style token. Ranges are never empty: a range covering a
//! single byte has `start == end`.

use std::ops::Range;

use crate::token::StyleToken;

/// A closed interval of byte offsets plus the style token applied to it
#[derive(Debug, Clone, PartialEq)]
pub struct RangeStyle {
    /// First byte covered (inclusive)
    pub start: usize,
    /// Last byte covered (inclusive)
    pub end: usize,
    /// Style applied to the covered text
    pub style: StyleToken,
}

impl RangeStyle {
    /// Create a new range covering `start..=end`
    pub fn new(start: usize, end: usize, style: impl Into<StyleToken>) -> Self {
        debug_assert!(start <= end, "range start {start} is after end {end}");
        Self {
            start,
            end,
            style: style.into(),
        }
    }

    /// Create a range from a half-open byte range, or None if it is empty
    pub fn from_span(span: Range<usize>, style: impl Into<StyleToken>) -> Option<Self> {
        if span.is_empty() {
            return None;
        }
        Some(Self::new(span.start, span.end - 1, style))
    }

    /// Number of bytes covered
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false: a range covers at least one byte
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The covered bytes as a half-open range
    pub fn span(&self) -> Range<usize> {
        self.start..self.end + 1
    }

    /// Check if this range covers a byte offset
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// Translate both endpoints forward by `delta`
    pub fn offset(&self, delta: usize) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
            style: self.style.clone(),
        }
    }

    /// Move the start by `delta` and change the length by `size`
    ///
    /// Returns None when the result would start before zero or cover
    /// fewer than one byte.
    pub fn adjust(&self, delta: isize, size: isize) -> Option<Self> {
        let start = self.start as isize + delta;
        let end = self.end as isize + delta + size;
        if start < 0 || end < start {
            return None;
        }
        Some(Self {
            start: start as usize,
            end: end as usize,
            style: self.style.clone(),
        })
    }
}
