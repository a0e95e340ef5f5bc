//! Markup resolution
//!
//! Style tokens are resolved into renderer-specific markups by a chain of
//! resolvers:
//!
//! - `StyleStringResolver` interprets `key:value;key2` style strings and
//!   dispatches each key to a registered handler;
//! - `CompositeResolver` chains a string resolver with auxiliary
//!   resolvers that handle other value kinds (callbacks, for example);
//! - `ResolverStack` allows temporarily overriding the resolver for a
//!   bounded scope.
//!
//! List tokens are distributed: each element is resolved on its own and
//! the results are concatenated.

mod color;
mod composite;
mod scope;
mod strings;

use crate::token::{StyleToken, StyleValue};

pub use color::decode_color;
pub use composite::{AuxiliaryId, CompositeResolver};
pub use scope::{ResolverStack, ScopedOverride};
pub use strings::{parse_style_string, StyleStringResolver};

/// Turns style tokens into markups of type `M`, given a context `C`
pub trait MarkupResolver<C: ?Sized, M> {
    /// Append the markups for a single style value
    fn resolve_value(&self, ctx: &C, value: &StyleValue, out: &mut Vec<M>);

    /// Resolve a whole token, distributing lists
    fn resolve(&self, ctx: &C, token: &StyleToken) -> Vec<M> {
        let mut out = Vec::new();
        token.for_each_value(&mut |value| self.resolve_value(ctx, value, &mut out));
        out
    }
}
