//! Scoped root lookup
//!
//! Parts normally receive their root directly (`dialog.trigger()`), which
//! makes an orphaned part unrepresentable. When parts are assembled
//! dynamically instead, a root is provided into a [`ContextScope`] and parts
//! look it up by type; a missing root is a [`PrimitiveError::MissingContext`].

use std::any::{Any, TypeId};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{PrimitiveError, Result};

/// A root handle that parts can look up from a scope
pub trait CompoundRoot: Clone + Send + Sync + 'static {
    /// Display name used in misuse errors, e.g. `"Dialog.Root"`
    const NAME: &'static str;
}

/// Type-keyed set of provided roots
///
/// Nested scopes start as a copy of their parent, so an inner provide
/// shadows an outer one of the same type without affecting the parent.
#[derive(Clone, Default)]
pub struct ContextScope {
    roots: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ContextScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide<R: CompoundRoot>(&mut self, root: R) {
        self.roots.insert(TypeId::of::<R>(), Arc::new(root));
    }

    /// A child scope inheriting everything provided so far
    pub fn nested(&self) -> Self {
        self.clone()
    }

    pub fn get<R: CompoundRoot>(&self) -> Option<R> {
        self.roots
            .get(&TypeId::of::<R>())
            .and_then(|root| root.downcast_ref::<R>())
            .cloned()
    }

    /// Look up a root on behalf of `part`, failing loudly when absent
    pub fn require<R: CompoundRoot>(&self, part: &'static str) -> Result<R> {
        self.get::<R>().ok_or(PrimitiveError::MissingContext {
            part,
            root: R::NAME,
        })
    }
}

impl std::fmt::Debug for ContextScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextScope")
            .field("roots", &self.roots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Root(u32);

    impl CompoundRoot for Root {
        const NAME: &'static str = "Root";
    }

    #[test]
    fn test_missing_root_message() {
        let scope = ContextScope::new();
        let err = scope.require::<Root>("Trigger").unwrap_err();
        assert_eq!(err.to_string(), "Trigger must be used within Root");
    }

    #[test]
    fn test_nested_shadowing() {
        let mut outer = ContextScope::new();
        outer.provide(Root(1));
        let mut inner = outer.nested();
        inner.provide(Root(2));

        assert_eq!(outer.require::<Root>("Trigger"), Ok(Root(1)));
        assert_eq!(inner.require::<Root>("Trigger"), Ok(Root(2)));
    }
}
