//! Terminal output using crossterm
//!
//! Styled text is cut into runs of constant style; each run is written
//! with the matching crossterm attributes and colours, then reset.

use std::io::Write;
use std::ops::Range;

use crossterm::{
    queue,
    style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
};

use crate::error::Result;
use crate::markup::{decode_color, CompositeResolver, StyleStringResolver};
use crate::token::Callback;

use super::Styled;

/// Presentation objects understood by the terminal sink
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalMarkup {
    Bold,
    Italic,
    Underline,
    Strike,
    Dim,
    Reverse,
    Foreground(Color),
    Background(Color),
    /// A callback run when the span is activated
    Action(Callback),
}

/// Effective style of a run of text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub dim: bool,
    pub reverse: bool,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    /// Actions are shown underlined
    pub action: bool,
}

impl CellStyle {
    /// Layer a markup on top of this style
    pub fn apply(&mut self, markup: &TerminalMarkup) {
        match markup {
            TerminalMarkup::Bold => self.bold = true,
            TerminalMarkup::Italic => self.italic = true,
            TerminalMarkup::Underline => self.underline = true,
            TerminalMarkup::Strike => self.strike = true,
            TerminalMarkup::Dim => self.dim = true,
            TerminalMarkup::Reverse => self.reverse = true,
            TerminalMarkup::Foreground(color) => self.foreground = Some(*color),
            TerminalMarkup::Background(color) => self.background = Some(*color),
            TerminalMarkup::Action(_) => self.action = true,
        }
    }

    /// Check if the run needs no escape sequences
    pub fn is_plain(&self) -> bool {
        *self == CellStyle::default()
    }

    fn attributes(&self) -> Vec<Attribute> {
        let flags = [
            (self.bold, Attribute::Bold),
            (self.italic, Attribute::Italic),
            (self.underline || self.action, Attribute::Underlined),
            (self.strike, Attribute::CrossedOut),
            (self.dim, Attribute::Dim),
            (self.reverse, Attribute::Reverse),
        ];
        flags
            .into_iter()
            .filter_map(|(on, attribute)| on.then_some(attribute))
            .collect()
    }
}

/// Resolver for the style keys the terminal understands
///
/// Keys: `bold` (alias `strong`), `italic`, `underline`, `strike`, `dim`,
/// `reverse`, `color:<colour>` and `background:<colour>`. Callback values
/// become `Action` markups.
pub fn default_resolver<C: ?Sized>() -> CompositeResolver<C, TerminalMarkup> {
    let mut strings = StyleStringResolver::new();
    let flags = [
        ("bold", TerminalMarkup::Bold),
        ("strong", TerminalMarkup::Bold),
        ("italic", TerminalMarkup::Italic),
        ("underline", TerminalMarkup::Underline),
        ("strike", TerminalMarkup::Strike),
        ("dim", TerminalMarkup::Dim),
        ("reverse", TerminalMarkup::Reverse),
    ];
    for (key, markup) in flags {
        strings.set_flag(key, move |_| Some(markup.clone()));
    }
    strings.set_value("color", |_, value| decode_color(value).map(TerminalMarkup::Foreground));
    strings.set_value("background", |_, value| {
        decode_color(value).map(TerminalMarkup::Background)
    });

    let mut resolver = CompositeResolver::new(strings);
    resolver.on_callback(|_, callback| Some(TerminalMarkup::Action(callback.clone())));
    resolver
}

/// Cut the text into runs of constant effective style
///
/// Markups are layered in span order, so later spans override earlier
/// ones. Runs cover the whole text and never split a character.
pub fn segments(styled: &Styled<TerminalMarkup>) -> Vec<(Range<usize>, CellStyle)> {
    let len = styled.text.len();
    let mut cuts = vec![0, len];
    for span in &styled.spans {
        cuts.push(span.range.start.min(len));
        cuts.push(span.range.end.min(len));
    }
    cuts.retain(|&cut| styled.text.is_char_boundary(cut));
    cuts.sort_unstable();
    cuts.dedup();

    let mut runs: Vec<(Range<usize>, CellStyle)> = Vec::new();
    for pair in cuts.windows(2) {
        let run = pair[0]..pair[1];
        let mut style = CellStyle::default();
        for span in &styled.spans {
            if span.range.start <= run.start && run.end <= span.range.end {
                style.apply(&span.markup);
            }
        }
        match runs.last_mut() {
            Some((previous, previous_style)) if *previous_style == style => previous.end = run.end,
            _ => runs.push((run, style)),
        }
    }
    runs
}

/// Write styled text with crossterm attributes
pub fn write_styled(out: &mut impl Write, styled: &Styled<TerminalMarkup>) -> Result<()> {
    for (run, style) in segments(styled) {
        let text = &styled.text[run];
        if style.is_plain() {
            queue!(out, Print(text))?;
            continue;
        }
        for attribute in style.attributes() {
            queue!(out, SetAttribute(attribute))?;
        }
        if let Some(color) = style.foreground {
            queue!(out, SetForegroundColor(color))?;
        }
        if let Some(color) = style.background {
            queue!(out, SetBackgroundColor(color))?;
        }
        queue!(out, Print(text), SetAttribute(Attribute::Reset))?;
    }
    out.flush()?;
    Ok(())
}

/// Run every action covering a byte offset; returns how many ran
pub fn activate(styled: &Styled<TerminalMarkup>, offset: usize) -> usize {
    let mut count = 0;
    for markup in styled.markups_at(offset) {
        if let TerminalMarkup::Action(callback) = markup {
            log::debug!("activating {} at offset {offset}", callback.name());
            callback.invoke();
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::resources::NoResources;
    use crate::text::Text;

    fn styled(text: Text) -> Styled<TerminalMarkup> {
        let rendered = text.render(&NoResources).unwrap();
        Styled::new(rendered, &(), &default_resolver::<()>())
    }

    #[test]
    fn test_default_resolver_keys() {
        let styled = styled(Text::styled("x", "strong;color:#ff0000;background:blue;wobbly"));
        let markups: Vec<_> = styled.spans.into_iter().map(|span| span.markup).collect();
        assert_eq!(
            markups,
            vec![
                TerminalMarkup::Bold,
                TerminalMarkup::Foreground(Color::Rgb { r: 255, g: 0, b: 0 }),
                TerminalMarkup::Background(Color::DarkBlue),
            ]
        );
    }

    #[test]
    fn test_segments_layer_nested_styles() {
        let text = Text::concatenate([
            Text::new("ab"),
            Text::join(
                None,
                Some("color:red".into()),
                [Text::new("c"), Text::styled("d", "bold;color:green")],
            ),
            Text::new("e"),
        ]);
        let runs = segments(&styled(text));
        let ranges: Vec<_> = runs.iter().map(|(run, _)| run.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..3, 3..4, 4..5]);
        assert!(runs[0].1.is_plain());
        assert_eq!(runs[1].1.foreground, Some(Color::DarkRed));
        assert!(!runs[1].1.bold);
        assert_eq!(runs[2].1.foreground, Some(Color::DarkGreen));
        assert!(runs[2].1.bold);
        assert!(runs[3].1.is_plain());
    }

    #[test]
    fn test_segments_merge_equal_neighbours() {
        let text = Text::styled("ab", "bold") + Text::styled("cd", "strong");
        let runs = segments(&styled(text));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, 0..4);
    }

    #[test]
    fn test_write_styled_plain_and_styled() {
        let mut out = Vec::new();
        write_styled(&mut out, &styled(Text::new("plain"))).unwrap();
        assert_eq!(out, b"plain");

        let mut out = Vec::new();
        write_styled(&mut out, &styled(Text::styled("hi", "bold") + Text::new("!"))).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("\u{1b}["));
        assert!(written.contains("hi"));
        assert!(written.ends_with('!'));
    }

    #[test]
    fn test_activate_runs_covering_actions() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let callback = Callback::new("count", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let styled = styled(Text::new("click ") + Text::styled("here", callback));

        assert_eq!(activate(&styled, 2), 0);
        assert_eq!(activate(&styled, 7), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(segments(&styled)[1].1.action);
    }
}
