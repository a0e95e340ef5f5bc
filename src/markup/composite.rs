//! Composite resolution
//!
//! A string resolver chained with auxiliary resolvers for other value
//! kinds. Every value goes through the string resolver first, then
//! through each auxiliary resolver that declared its kind, in
//! registration order.

use std::fmt;
use std::sync::Arc;

use crate::token::{Callback, StyleValue, ValueKind};

use super::{MarkupResolver, StyleStringResolver};

/// Handle returned when registering an auxiliary resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuxiliaryId(u64);

type AuxiliaryFn<C, M> = Arc<dyn Fn(&C, &StyleValue) -> Vec<M> + Send + Sync>;

struct Auxiliary<C: ?Sized, M> {
    id: AuxiliaryId,
    kinds: Vec<ValueKind>,
    resolve: AuxiliaryFn<C, M>,
}

impl<C: ?Sized, M> Clone for Auxiliary<C, M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kinds: self.kinds.clone(),
            resolve: Arc::clone(&self.resolve),
        }
    }
}

/// A string resolver plus auxiliary resolvers keyed by value kind
pub struct CompositeResolver<C: ?Sized, M> {
    strings: StyleStringResolver<C, M>,
    auxiliary: Vec<Auxiliary<C, M>>,
    next_id: u64,
}

impl<C: ?Sized, M> CompositeResolver<C, M> {
    /// Create a resolver around a string resolver
    pub fn new(strings: StyleStringResolver<C, M>) -> Self {
        Self {
            strings,
            auxiliary: Vec::new(),
            next_id: 0,
        }
    }

    /// The style string resolver
    pub fn strings(&self) -> &StyleStringResolver<C, M> {
        &self.strings
    }

    /// Mutable access to the style string resolver
    pub fn strings_mut(&mut self) -> &mut StyleStringResolver<C, M> {
        &mut self.strings
    }

    /// Register an auxiliary resolver for the given value kinds
    pub fn add(
        &mut self,
        kinds: &[ValueKind],
        resolve: impl Fn(&C, &StyleValue) -> Vec<M> + Send + Sync + 'static,
    ) -> AuxiliaryId {
        let id = AuxiliaryId(self.next_id);
        self.next_id += 1;
        self.auxiliary.push(Auxiliary {
            id,
            kinds: kinds.to_vec(),
            resolve: Arc::new(resolve),
        });
        id
    }

    /// Register a resolver for callback values
    pub fn on_callback(
        &mut self,
        resolve: impl Fn(&C, &Callback) -> Option<M> + Send + Sync + 'static,
    ) -> AuxiliaryId {
        self.add(&[ValueKind::Callback], move |ctx, value| match value {
            StyleValue::Callback(callback) => resolve(ctx, callback).into_iter().collect(),
            StyleValue::Str(_) => Vec::new(),
        })
    }

    /// Remove an auxiliary resolver, returning whether it was registered
    pub fn remove(&mut self, id: AuxiliaryId) -> bool {
        let before = self.auxiliary.len();
        self.auxiliary.retain(|aux| aux.id != id);
        self.auxiliary.len() != before
    }

    /// Remove every auxiliary resolver and every style key
    pub fn clear(&mut self) {
        self.auxiliary.clear();
        self.strings.clear();
    }
}

impl<C: ?Sized, M> MarkupResolver<C, M> for CompositeResolver<C, M> {
    fn resolve_value(&self, ctx: &C, value: &StyleValue, out: &mut Vec<M>) {
        self.strings.resolve_value(ctx, value, out);
        let kind = value.kind();
        for aux in self.auxiliary.iter().filter(|aux| aux.kinds.contains(&kind)) {
            out.extend((aux.resolve)(ctx, value));
        }
    }
}

impl<C: ?Sized, M> Clone for CompositeResolver<C, M> {
    fn clone(&self) -> Self {
        Self {
            strings: self.strings.clone(),
            auxiliary: self.auxiliary.clone(),
            next_id: self.next_id,
        }
    }
}

impl<C: ?Sized, M> Default for CompositeResolver<C, M> {
    fn default() -> Self {
        Self::new(StyleStringResolver::new())
    }
}

impl<C: ?Sized, M> fmt::Debug for CompositeResolver<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeResolver")
            .field("strings", &self.strings)
            .field("auxiliary", &self.auxiliary.len())
            .finish()
    }
}
