//! Reference resolution
//!
//! Text trees never hold a rendering context. Instead the caller passes a
//! `Resources` implementation at flatten/collection time, so the same tree
//! can be rendered against different locales.

use crate::error::{Result, TextError};

/// Resolves string and plural references to their content
///
/// Implementations must be deterministic for a fixed identifier (and
/// quantity).
pub trait Resources {
    /// Resolve a string reference
    fn string(&self, id: &str) -> Result<String>;

    /// Resolve a plural reference for a quantity
    fn plural(&self, id: &str, quantity: i64) -> Result<String>;
}

/// A provider with no content; every reference fails to resolve
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl Resources for NoResources {
    fn string(&self, id: &str) -> Result<String> {
        Err(TextError::Resolution { id: id.to_string() })
    }

    fn plural(&self, id: &str, quantity: i64) -> Result<String> {
        Err(TextError::PluralResolution {
            id: id.to_string(),
            quantity,
        })
    }
}

impl<R: Resources + ?Sized> Resources for &R {
    fn string(&self, id: &str) -> Result<String> {
        (**self).string(id)
    }

    fn plural(&self, id: &str, quantity: i64) -> Result<String> {
        (**self).plural(id, quantity)
    }
}
