//! Composite styled text
//!
//! Immutable trees of text fragments (literals, resource references,
//! plurals, joins, overlays and pattern substitutions) that flatten to a
//! plain string and, in the same pass, to the style ranges over it.
//! Substitutions remap the ranges of the text they rewrite.
//!
//! ```
//! use composite_text::{NoResources, RangeStyle, Text};
//!
//! let text = Text::spaced([Text::new("Hello"), Text::styled("world", "bold")])
//!     .replace_all_str([("world", Text::styled("there!", "italic"))])
//!     .unwrap();
//! let rendered = text.render(&NoResources).unwrap();
//! assert_eq!(rendered.text, "Hello there!");
//! assert_eq!(
//!     rendered.ranges,
//!     vec![RangeStyle::new(6, 11, "bold"), RangeStyle::new(6, 11, "italic")]
//! );
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod markup;
pub mod range;
pub mod render;
pub mod resources;
pub mod text;
pub mod token;

pub use catalog::{Catalog, PluralForms};
pub use error::{Result, TextError};
pub use range::RangeStyle;
pub use resources::{NoResources, Resources};
pub use text::{FormatArg, RepeatPolicy, Rendered, Rule, Text};
pub use token::{Callback, StyleToken, StyleValue, ValueKind};
