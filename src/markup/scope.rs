//! Scoped resolver overrides
//!
//! A `ResolverStack` holds a base resolver and a stack of overrides. The
//! most recent override wins; each one is removed when its guard drops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::token::StyleValue;

use super::{CompositeResolver, MarkupResolver, StyleStringResolver};

type Entry<C, M> = (u64, Arc<CompositeResolver<C, M>>);

/// A base resolver with temporary, nested overrides
pub struct ResolverStack<C: ?Sized, M> {
    base: Arc<CompositeResolver<C, M>>,
    overrides: Mutex<Vec<Entry<C, M>>>,
    next_id: AtomicU64,
}

impl<C: ?Sized, M> ResolverStack<C, M> {
    pub fn new(base: CompositeResolver<C, M>) -> Self {
        Self {
            base: Arc::new(base),
            overrides: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry<C, M>>> {
        self.overrides.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The resolver currently in effect
    pub fn current(&self) -> Arc<CompositeResolver<C, M>> {
        match self.entries().last() {
            Some((_, resolver)) => Arc::clone(resolver),
            None => Arc::clone(&self.base),
        }
    }

    /// Number of active overrides
    pub fn depth(&self) -> usize {
        self.entries().len()
    }

    /// Install an override until the returned guard is dropped
    pub fn push(&self, resolver: CompositeResolver<C, M>) -> ScopedOverride<'_, C, M> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().push((id, Arc::new(resolver)));
        ScopedOverride { stack: self, id }
    }

    /// Override with a copy of the current resolver whose style keys are edited by `edit`
    pub fn modify_styles(
        &self,
        edit: impl FnOnce(&mut StyleStringResolver<C, M>),
    ) -> ScopedOverride<'_, C, M> {
        let mut resolver = CompositeResolver::clone(&self.current());
        edit(resolver.strings_mut());
        self.push(resolver)
    }

    fn pop(&self, id: u64) {
        let mut entries = self.entries();
        if let Some(index) = entries.iter().rposition(|(entry, _)| *entry == id) {
            entries.remove(index);
        }
    }
}

impl<C: ?Sized, M> MarkupResolver<C, M> for ResolverStack<C, M> {
    fn resolve_value(&self, ctx: &C, value: &StyleValue, out: &mut Vec<M>) {
        self.current().resolve_value(ctx, value, out);
    }
}

/// Keeps an override installed; removes it on drop
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct ScopedOverride<'a, C: ?Sized, M> {
    stack: &'a ResolverStack<C, M>,
    id: u64,
}

impl<C: ?Sized, M> Drop for ScopedOverride<'_, C, M> {
    fn drop(&mut self) {
        self.stack.pop(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::StyleToken;

    fn stack() -> ResolverStack<(), &'static str> {
        let mut strings = StyleStringResolver::new();
        strings.set_flag("bold", |_| Some("base-bold"));
        ResolverStack::new(CompositeResolver::new(strings))
    }

    fn resolve(stack: &ResolverStack<(), &'static str>, style: &str) -> Vec<&'static str> {
        stack.resolve(&(), &StyleToken::from(style))
    }

    #[test]
    fn test_override_applies_within_scope() {
        let stack = stack();
        {
            let _guard = stack.modify_styles(|strings| {
                strings.set_flag("bold", |_| Some("loud"));
                strings.set_flag("quiet", |_| Some("soft"));
            });
            assert_eq!(resolve(&stack, "bold;quiet"), vec!["loud", "soft"]);
            assert_eq!(stack.depth(), 1);
        }
        assert_eq!(resolve(&stack, "bold;quiet"), vec!["base-bold"]);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_nested_overrides() {
        let stack = stack();
        let outer = stack.modify_styles(|strings| strings.clear());
        assert!(resolve(&stack, "bold").is_empty());
        {
            let _inner = stack.modify_styles(|strings| strings.set_flag("bold", |_| Some("inner")));
            assert_eq!(resolve(&stack, "bold"), vec!["inner"]);
        }
        assert!(resolve(&stack, "bold").is_empty());
        drop(outer);
        assert_eq!(resolve(&stack, "bold"), vec!["base-bold"]);
    }

    #[test]
    fn test_out_of_order_drop_removes_the_right_override() {
        let stack = stack();
        let first = stack.push(CompositeResolver::default());
        let second = stack.modify_styles(|strings| strings.set_flag("bold", |_| Some("second")));
        drop(first);
        assert_eq!(resolve(&stack, "bold"), vec!["second"]);
        drop(second);
        assert_eq!(resolve(&stack, "bold"), vec!["base-bold"]);
    }
}
