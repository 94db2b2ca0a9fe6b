use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 captures (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the route tree (known at
/// registration time) and cloning one is an atomic increment. Values are per-request
/// data taken from the request path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Parameters captured while matching a request path, in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: ParamVec,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a captured value by parameter name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate `(name, value)` pairs in the order they were captured
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Convert to a `HashMap` for callers that want keyed access.
    /// Note: this allocates; use [`Params::get`] in hot paths instead.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.inner
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[inline]
    pub(crate) fn push(&mut self, name: &Arc<str>, value: &str) {
        self.inner.push((Arc::clone(name), value.to_string()));
    }

    /// Drop captures made by a branch that failed to match
    #[inline]
    pub(crate) fn truncate(&mut self, len: usize) {
        self.inner.truncate(len);
    }
}
