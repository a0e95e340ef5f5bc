//! Pattern substitution with range remapping
//!
//! A substitution node applies an ordered list of rules to the flattened
//! string of its inner text. Every rule is matched against the same,
//! unmodified base string. Matches from all rules are merged, sorted by
//! position, and accepted greedily when they do not overlap an already
//! accepted match.
//!
//! The inner text's own ranges are then projected into the coordinates
//! of the substituted string:
//!
//! - a range swallowed by a match (with room to spare on both sides) is
//!   dropped;
//! - matches before a range shift it, matches inside it resize it;
//! - a match straddling one edge trims the range back to the surviving
//!   text.
//!
//! Each replacement's own ranges are appended afterwards, at the
//! replacement's position in the output.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::error::Result;
use crate::range::RangeStyle;
use crate::resources::Resources;

use super::layout::Rendered;
use super::Text;

/// Builds the replacement for one match, given the match ordinal
type Factory = dyn Fn(&Captures<'_>, usize) -> Text + Send + Sync;

/// How many matches of a rule may be replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    /// Replace every accepted match
    ReplaceAll,
    /// Replace only the first accepted match
    ReplaceFirstOnly,
}

/// A substitution rule: pattern, replacement factory and repeat policy
///
/// If the pattern has a capture group named `slot`, only that group is
/// replaced; the rest of the match is context that stays in place.
#[derive(Clone)]
pub struct Rule {
    pattern: Regex,
    factory: Arc<Factory>,
    policy: RepeatPolicy,
}

impl Rule {
    /// Compile a rule from a pattern string
    ///
    /// Fails with a pattern error if the pattern is invalid.
    pub fn new(
        pattern: &str,
        policy: RepeatPolicy,
        factory: impl Fn(&Captures<'_>, usize) -> Text + Send + Sync + 'static,
    ) -> Result<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?, policy, factory))
    }

    /// Create a rule from an already compiled pattern
    pub fn from_regex(
        pattern: Regex,
        policy: RepeatPolicy,
        factory: impl Fn(&Captures<'_>, usize) -> Text + Send + Sync + 'static,
    ) -> Self {
        Self {
            pattern,
            factory: Arc::new(factory),
            policy,
        }
    }

    /// Create a rule replacing a literal string with a fixed text
    pub fn literal(needle: &str, replacement: Text, policy: RepeatPolicy) -> Result<Self> {
        Self::new(&regex::escape(needle), policy, move |_, _| replacement.clone())
    }

    /// The compiled pattern
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// The repeat policy
    pub fn policy(&self) -> RepeatPolicy {
        self.policy
    }

    /// Find every match of this rule in `base`, in order
    fn candidates(&self, base: &str, rule: usize) -> Vec<Candidate> {
        self.pattern
            .captures_iter(base)
            .enumerate()
            .filter_map(|(ordinal, caps)| {
                let slot = caps.name("slot").or_else(|| caps.get(0))?;
                Some(Candidate {
                    span: slot.range(),
                    text: (self.factory)(&caps, ordinal),
                    rule,
                })
            })
            .collect()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str()
            && self.policy == other.policy
            && std::ptr::eq(
                Arc::as_ptr(&self.factory) as *const (),
                Arc::as_ptr(&other.factory) as *const (),
            )
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.as_str())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// A match of some rule in the base string, with its replacement
#[derive(Debug, Clone)]
struct Candidate {
    span: Range<usize>,
    text: Text,
    rule: usize,
}

/// One applied substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Span of the match in the base string
    pub original: Range<usize>,
    /// Span of the match after earlier substitutions were applied
    pub shifted: Range<usize>,
    /// Span of the replacement in the output string
    pub output: Range<usize>,
    /// Replacement length minus match length
    pub size_change: isize,
}

/// Closed interval bounds of a half-open span; empty spans end before they start
fn closed(span: &Range<usize>) -> (isize, isize) {
    (span.start as isize, span.end as isize - 1)
}

/// Whether a candidate stays clear of an accepted match
///
/// Touching at a boundary does not count as overlap.
fn disjoint(candidate: &Range<usize>, accepted: &Range<usize>) -> bool {
    let (first, last) = closed(candidate);
    let (accepted_first, accepted_last) = closed(accepted);
    last < accepted_first.min(accepted_last) || first > accepted_last
}

/// Match all rules against `base` and pick the substitutions to apply
///
/// The result is sorted by position and free of overlaps.
fn select(base: &str, rules: &[Rule]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = rules
        .iter()
        .enumerate()
        .flat_map(|(index, rule)| rule.candidates(base, index))
        .collect();
    candidates.sort_by_key(|c| (c.span.start, c.span.end));

    let mut accepted: Vec<Candidate> = Vec::new();
    let mut used_rules = vec![false; rules.len()];
    for candidate in candidates {
        if !accepted.iter().all(|a| disjoint(&candidate.span, &a.span)) {
            log::trace!("rejecting overlapping match {:?}", candidate.span);
            continue;
        }
        if rules[candidate.rule].policy == RepeatPolicy::ReplaceFirstOnly {
            if used_rules[candidate.rule] {
                log::trace!("rejecting repeated match {:?}", candidate.span);
                continue;
            }
            used_rules[candidate.rule] = true;
        }
        accepted.push(candidate);
    }
    accepted
}

/// Apply accepted substitutions to `base`, in ascending position order
fn apply<'a>(
    base: &str,
    substitutions: impl IntoIterator<Item = (Range<usize>, &'a str)>,
) -> (String, Vec<Replacement>) {
    let mut output = base.to_string();
    let mut replacements = Vec::new();
    let mut delta: isize = 0;

    for (original, replacement) in substitutions {
        let shifted = (original.start as isize + delta) as usize
            ..(original.end as isize + delta) as usize;
        output.replace_range(shifted.clone(), replacement);

        let size_change = replacement.len() as isize - original.len() as isize;
        let output_span = shifted.start..shifted.start + replacement.len();
        replacements.push(Replacement {
            original,
            shifted,
            output: output_span,
            size_change,
        });
        delta += size_change;
    }

    (output, replacements)
}

/// How a substitution sits relative to a range of the base string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    /// Ends before the range starts
    Before,
    /// Starts after the range ends
    After,
    /// Lies within the range
    Inside,
    /// Starts before the range and ends inside it
    StraddlesStart,
    /// Starts inside the range and ends after it
    StraddlesEnd,
    /// Covers the range with room to spare on both sides
    Swallows,
}

fn overlap(replacement: &Replacement, range: &RangeStyle) -> Overlap {
    let (first, last) = closed(&replacement.original);
    let (start, end) = (range.start as isize, range.end as isize);
    if last < start {
        Overlap::Before
    } else if first > end {
        Overlap::After
    } else if first >= start && last <= end {
        Overlap::Inside
    } else if first < start && last > end {
        Overlap::Swallows
    } else if first < start {
        Overlap::StraddlesStart
    } else {
        Overlap::StraddlesEnd
    }
}

/// Project a range of the base string into the substituted output
///
/// Returns None when the text the range covered no longer exists.
fn remap(range: &RangeStyle, replacements: &[Replacement], output_len: usize) -> Option<RangeStyle> {
    let mut leading_shift: isize = 0;
    let mut internal_shift: isize = 0;
    let mut straddle_shift: isize = 0;
    let mut start_cut: Option<&Replacement> = None;
    let mut end_cut: Option<&Replacement> = None;

    for replacement in replacements {
        match overlap(replacement, range) {
            Overlap::Swallows => return None,
            Overlap::Before => leading_shift += replacement.size_change,
            Overlap::Inside => internal_shift += replacement.size_change,
            Overlap::After => {}
            Overlap::StraddlesStart => {
                if start_cut.map_or(true, |cut| replacement.original.start > cut.original.start) {
                    start_cut = Some(replacement);
                }
            }
            Overlap::StraddlesEnd => {
                if end_cut.map_or(true, |cut| replacement.original.start < cut.original.start) {
                    end_cut = Some(replacement);
                }
            }
        }
    }

    // Trims are measured in output coordinates: the range starts right
    // after a replacement straddling its start and ends right before one
    // straddling its end.
    let untrimmed_start = range.start as isize + leading_shift;
    let start_trim = match start_cut {
        Some(cut) => {
            straddle_shift = cut.size_change;
            cut.output.end as isize - untrimmed_start
        }
        None => 0,
    };
    let untrimmed_end = range.end as isize + leading_shift + internal_shift + straddle_shift;
    let end_trim = match end_cut {
        Some(cut) => untrimmed_end - (cut.output.start as isize - 1),
        None => 0,
    };

    let projected = range.adjust(
        leading_shift + start_trim,
        internal_shift + straddle_shift - start_trim - end_trim,
    );
    let Some(projected) = projected else {
        log::debug!("dropping range {}..={}: no text left", range.start, range.end);
        return None;
    };

    debug_assert!(
        projected.end < output_len,
        "projected range {projected:?} outside output of length {output_len}"
    );
    (projected.end < output_len).then_some(projected)
}

/// Flatten a substitution node
pub(super) fn flatten(inner: &Text, rules: &[Rule], resources: &dyn Resources) -> Result<String> {
    let base = inner.flatten(resources)?;
    let accepted = select(&base, rules);
    let replacements = accepted
        .iter()
        .map(|candidate| candidate.text.flatten(resources))
        .collect::<Result<Vec<_>>>()?;
    let (output, _) = apply(
        &base,
        accepted
            .iter()
            .zip(&replacements)
            .map(|(candidate, text)| (candidate.span.clone(), text.as_str())),
    );
    Ok(output)
}

/// Flatten a substitution node and remap its ranges
pub(super) fn render(inner: &Text, rules: &[Rule], resources: &dyn Resources) -> Result<Rendered> {
    let base = inner.render(resources)?;
    let accepted = select(&base.text, rules);
    let pieces = accepted
        .iter()
        .map(|candidate| candidate.text.render(resources))
        .collect::<Result<Vec<_>>>()?;
    let (text, replacements) = apply(
        &base.text,
        accepted
            .iter()
            .zip(&pieces)
            .map(|(candidate, piece)| (candidate.span.clone(), piece.text.as_str())),
    );

    let mut ranges: Vec<RangeStyle> = base
        .ranges
        .iter()
        .filter_map(|range| remap(range, &replacements, text.len()))
        .collect();
    for (replacement, piece) in replacements.iter().zip(&pieces) {
        ranges.extend(piece.ranges.iter().map(|range| range.offset(replacement.output.start)));
    }

    Ok(Rendered { text, ranges })
}

/// Compute the substitutions a rule set would apply to a string
///
/// Replacement texts are flattened with `resources`.
pub fn plan_substitutions(
    base: &str,
    rules: &[Rule],
    resources: &dyn Resources,
) -> Result<Vec<Replacement>> {
    let accepted = select(base, rules);
    let texts = accepted
        .iter()
        .map(|candidate| candidate.text.flatten(resources))
        .collect::<Result<Vec<_>>>()?;
    let (_, replacements) = apply(
        base,
        accepted
            .iter()
            .zip(&texts)
            .map(|(candidate, text)| (candidate.span.clone(), text.as_str())),
    );
    Ok(replacements)
}
