//! Radix tree implementation for HTTP route matching
//!
//! One [`Tree`] holds the routes of a single request method. Static text is stored in
//! edge-compressed nodes: each edge is labelled with the longest literal shared by every
//! route beneath it, so `/users`, `/users/new` and `/uploads` share the `/u` edge.
//!
//! ## Structure
//!
//! - A `Node` owns its static children, keyed by their first character and ordered by
//!   priority (the number of routes registered beneath each child).
//! - A node has at most one wildcard child, a `Wildcard` describing a `:param` or a
//!   `*catchall`. The wildcard owns the handler for routes ending at it and a tail node for
//!   the literal text that follows a parameter.
//!
//! ## Matching
//!
//! Static children are tried before the wildcard. When a static branch fails deeper in the
//! tree the walk backtracks and tries the wildcard, and captures made by a failed branch are
//! discarded. A regex-constrained wildcard that rejects its span fails the branch the same way.
//!
//! ## Example
//!
//! ```rust
//! use cerarouter::router::{Lookup, RedirectPolicy, Tree};
//!
//! let mut tree = Tree::new(false);
//! tree.insert("/users/:id", "get_user").unwrap();
//!
//! match tree.lookup("/users/42", RedirectPolicy::none()) {
//!     Lookup::Matched { handler, params } => {
//!         assert_eq!(*handler, "get_user");
//!         assert_eq!(params.get("id"), Some("42"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use std::fmt;
use std::mem;
use std::sync::Arc;

use tracing::warn;

use super::params::Params;
use super::path::clean_path;
use super::pattern::{parse_pattern, Constraint, Piece, WildcardSpec};
use crate::error::RouterError;

/// The kinds of nodes the tree can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Literal text, ex: `/users/`
    Static,
    /// A single-segment capture, ex: `:id`
    Param,
    /// A capture of the remaining path, ex: `*filepath`
    CatchAll,
}

/// What a successful [`Tree::insert`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The pattern was new
    Added,
    /// The pattern existed and the tree is mutable; the old handler was dropped
    Replaced,
}

/// Which redirects a lookup may report after an exact match fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedirectPolicy {
    /// Try the path with its trailing slash added or removed
    pub trailing_slash: bool,
    /// Try the cleaned path, matched case-insensitively
    pub fixed_path: bool,
}

impl RedirectPolicy {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            trailing_slash: false,
            fixed_path: false,
        }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            trailing_slash: true,
            fixed_path: true,
        }
    }
}

/// Result of looking a path up in a [`Tree`]
#[derive(Debug, PartialEq)]
pub enum Lookup<'t, H> {
    /// A route matched exactly
    Matched {
        handler: &'t H,
        params: Params,
    },
    /// Nothing matched, and no enabled redirect applies
    NotFound,
    /// The path with its trailing slash toggled is registered
    RedirectTrailingSlash(String),
    /// The cleaned, case-corrected path is registered
    RedirectFixedPath(String),
    /// The cleaned, case-corrected path is registered once its trailing slash is toggled
    FixedPathWithTrailingSlash(String),
}

/// Node in the radix tree
pub(crate) struct Node<H> {
    /// Edge label. Empty only for the root and for a wildcard's tail.
    segment: String,
    kind: NodeKind,
    /// Routes registered at or beneath this node
    priority: u32,
    /// First character of each static child, parallel to `children`
    indices: Vec<char>,
    children: Vec<Node<H>>,
    wildcard: Option<Box<Wildcard<H>>>,
    handler: Option<H>,
}

/// The parameter or catch-all child of a node
pub(crate) struct Wildcard<H> {
    name: Arc<str>,
    constraint: Option<Constraint>,
    handler: Option<H>,
    /// Continuation after a parameter; its static children all begin with `/`.
    /// Carries the wildcard's kind and never has children for a catch-all.
    tail: Node<H>,
}

/// Per-insert context threaded through the recursive walk
struct InsertCtx<'a> {
    path: &'a str,
    mutable: bool,
}

fn longest_common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i)
}

fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or('/')
}

fn bind<H>(slot: &mut Option<H>, handler: H, ctx: &InsertCtx<'_>) -> Result<Insertion, RouterError> {
    if let Some(existing) = slot.as_mut() {
        if !ctx.mutable {
            return Err(RouterError::conflict(
                ctx.path,
                "a handler is already registered for this pattern",
            ));
        }
        *existing = handler;
        warn!(path = %ctx.path, "Route handler overwritten");
        return Ok(Insertion::Replaced);
    }
    *slot = Some(handler);
    Ok(Insertion::Added)
}

impl<H> Node<H> {
    fn new(segment: &str, kind: NodeKind) -> Self {
        Self {
            segment: segment.to_string(),
            kind,
            priority: 0,
            indices: Vec::new(),
            children: Vec::new(),
            wildcard: None,
            handler: None,
        }
    }

    #[inline]
    fn child_index(&self, c: char) -> Option<usize> {
        self.indices.iter().position(|&i| i == c)
    }

    /// Split this node's label at byte `at`: the node keeps the prefix and a new child
    /// takes the suffix along with everything that hung off this node.
    fn split_at(&mut self, at: usize) {
        let suffix = self.segment.split_off(at);
        let child = Node {
            indices: mem::take(&mut self.indices),
            children: mem::take(&mut self.children),
            wildcard: self.wildcard.take(),
            handler: self.handler.take(),
            priority: self.priority,
            kind: NodeKind::Static,
            segment: suffix,
        };
        self.indices = vec![first_char(&child.segment)];
        self.children = vec![child];
    }

    /// Bump the priority of child `i` and move it ahead of lower-priority siblings
    fn update_child_priority(&mut self, i: usize) {
        self.children[i].priority += 1;
        let priority = self.children[i].priority;

        let mut updated = i;
        while updated > 0 && self.children[updated - 1].priority < priority {
            self.children.swap(updated - 1, updated);
            self.indices.swap(updated - 1, updated);
            updated -= 1;
        }
    }

    /// Insert below this node. `literal` is the unconsumed static text of the current
    /// piece and `rest` the pieces after it; this node's own label is already consumed.
    fn insert(
        &mut self,
        literal: &str,
        rest: &[Piece<'_>],
        handler: H,
        ctx: &InsertCtx<'_>,
    ) -> Result<Insertion, RouterError> {
        if !literal.is_empty() {
            return self.insert_static(literal, rest, handler, ctx);
        }

        match rest.split_first() {
            None => bind(&mut self.handler, handler, ctx),
            Some((Piece::Static(text), rest)) => self.insert(text, rest, handler, ctx),
            Some((Piece::Wildcard(spec), rest)) => self.insert_wildcard(spec, rest, handler, ctx),
        }
    }

    fn insert_static(
        &mut self,
        literal: &str,
        rest: &[Piece<'_>],
        handler: H,
        ctx: &InsertCtx<'_>,
    ) -> Result<Insertion, RouterError> {
        if let Some(i) = self.child_index(first_char(literal)) {
            let child = &mut self.children[i];
            let common = longest_common_prefix(&child.segment, literal);
            if common < child.segment.len() {
                child.split_at(common);
            }
            let inserted = child.insert(&literal[common..], rest, handler, ctx)?;
            if inserted == Insertion::Added {
                self.update_child_priority(i);
            }
            return Ok(inserted);
        }

        let mut child = Node::new(literal, NodeKind::Static);
        let inserted = child.insert("", rest, handler, ctx)?;
        self.indices.push(first_char(literal));
        self.children.push(child);
        self.update_child_priority(self.children.len() - 1);
        Ok(inserted)
    }

    fn insert_wildcard(
        &mut self,
        spec: &WildcardSpec,
        rest: &[Piece<'_>],
        handler: H,
        ctx: &InsertCtx<'_>,
    ) -> Result<Insertion, RouterError> {
        match &mut self.wildcard {
            Some(existing) => {
                existing.check_compatible(spec, ctx)?;
                existing.insert(rest, handler, ctx)
            }
            None => {
                let mut wildcard = Box::new(Wildcard::new(spec));
                let inserted = wildcard.insert(rest, handler, ctx)?;
                self.wildcard = Some(wildcard);
                Ok(inserted)
            }
        }
    }

    /// Exact match of `path` against this node's label and everything beneath it
    fn find<'n>(&'n self, path: &str, params: &mut Params) -> Option<&'n H> {
        let rest = path.strip_prefix(self.segment.as_str())?;
        self.find_below(rest, params)
    }

    fn find_below<'n>(&'n self, rest: &str, params: &mut Params) -> Option<&'n H> {
        match rest.chars().next() {
            None => {
                if let Some(handler) = &self.handler {
                    return Some(handler);
                }
            }
            Some(c) => {
                if let Some(i) = self.child_index(c) {
                    if let Some(handler) = self.children[i].find(rest, params) {
                        return Some(handler);
                    }
                }
            }
        }

        self.wildcard.as_deref()?.find(rest, params)
    }

    /// Case-insensitive match that writes the canonical spelling into `out`
    fn find_fixed(&self, path: &str, out: &mut String) -> bool {
        let Some(head) = path.get(..self.segment.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(&self.segment) {
            return false;
        }

        let mark = out.len();
        out.push_str(&self.segment);
        if self.find_fixed_below(&path[self.segment.len()..], out) {
            return true;
        }
        out.truncate(mark);
        false
    }

    fn find_fixed_below(&self, rest: &str, out: &mut String) -> bool {
        match rest.chars().next() {
            None => {
                if self.handler.is_some() {
                    return true;
                }
            }
            Some(c) => {
                // `A` and `a` may both be children, so every case-folded candidate is tried
                for (i, index) in self.indices.iter().enumerate() {
                    if index.eq_ignore_ascii_case(&c) && self.children[i].find_fixed(rest, out) {
                        return true;
                    }
                }
            }
        }

        match self.wildcard.as_deref() {
            Some(wildcard) => wildcard.find_fixed(rest, out),
            None => false,
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{:?} {:?} priority={}{}",
            "",
            self.segment,
            self.kind,
            self.priority,
            if self.handler.is_some() { " [handler]" } else { "" },
            indent = depth * 2
        )?;
        for child in &self.children {
            child.fmt_tree(f, depth + 1)?;
        }
        if let Some(wildcard) = &self.wildcard {
            wildcard.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl<H: Clone> Clone for Node<H> {
    fn clone(&self) -> Self {
        Self {
            segment: self.segment.clone(),
            kind: self.kind,
            priority: self.priority,
            indices: self.indices.clone(),
            children: self.children.clone(),
            wildcard: self.wildcard.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<H> Wildcard<H> {
    fn new(spec: &WildcardSpec) -> Self {
        Self {
            name: Arc::clone(&spec.name),
            constraint: spec.constraint.clone(),
            handler: None,
            tail: Node::new("", spec.kind),
        }
    }

    #[inline]
    pub(crate) fn kind(&self) -> NodeKind {
        self.tail.kind
    }

    fn describe(&self) -> String {
        let sigil = if self.kind() == NodeKind::CatchAll { '*' } else { ':' };
        match &self.constraint {
            Some(constraint) => format!("{sigil}{}:{}", self.name, constraint.source()),
            None => format!("{sigil}{}", self.name),
        }
    }

    /// A position holds one wildcard: a second route may reuse it only verbatim
    fn check_compatible(&self, spec: &WildcardSpec, ctx: &InsertCtx<'_>) -> Result<(), RouterError> {
        if self.kind() == spec.kind && self.name == spec.name && self.constraint == spec.constraint {
            return Ok(());
        }
        Err(RouterError::conflict(
            ctx.path,
            format!(
                "wildcard '{}' conflicts with existing wildcard '{}' at the same position",
                spec,
                self.describe()
            ),
        ))
    }

    fn insert(&mut self, rest: &[Piece<'_>], handler: H, ctx: &InsertCtx<'_>) -> Result<Insertion, RouterError> {
        if rest.is_empty() {
            return bind(&mut self.handler, handler, ctx);
        }
        // the parser only emits a catch-all as the final piece
        if self.kind() == NodeKind::CatchAll {
            return Err(RouterError::invalid(ctx.path, "catch-all must be the final segment"));
        }
        let inserted = self.tail.insert("", rest, handler, ctx)?;
        if inserted == Insertion::Added {
            self.tail.priority += 1;
        }
        Ok(inserted)
    }

    #[inline]
    fn permits(&self, value: &str) -> bool {
        self.constraint.as_ref().map_or(true, |c| c.is_match(value))
    }

    /// Split `rest` into the captured span and what follows it
    fn span<'p>(&self, rest: &'p str) -> Option<(&'p str, &'p str)> {
        let end = match self.kind() {
            NodeKind::CatchAll => rest.len(),
            _ => {
                let end = rest.find('/').unwrap_or(rest.len());
                if end == 0 {
                    return None;
                }
                end
            }
        };
        let (value, after) = rest.split_at(end);
        self.permits(value).then_some((value, after))
    }

    fn find<'n>(&'n self, rest: &str, params: &mut Params) -> Option<&'n H> {
        let (value, after) = self.span(rest)?;

        let mark = params.len();
        params.push(&self.name, value);
        let found = if after.is_empty() {
            self.handler.as_ref()
        } else {
            self.tail.find_below(after, params)
        };
        if found.is_none() {
            params.truncate(mark);
        }
        found
    }

    fn find_fixed(&self, rest: &str, out: &mut String) -> bool {
        let Some((value, after)) = self.span(rest) else {
            return false;
        };

        let mark = out.len();
        out.push_str(value);
        let found = if after.is_empty() {
            self.handler.is_some()
        } else {
            self.tail.find_fixed_below(after, out)
        };
        if !found {
            out.truncate(mark);
        }
        found
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} {:?}{}",
            "",
            self.describe(),
            self.kind(),
            if self.handler.is_some() { " [handler]" } else { "" },
            indent = depth * 2
        )?;
        for child in &self.tail.children {
            child.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl<H: Clone> Clone for Wildcard<H> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            constraint: self.constraint.clone(),
            handler: self.handler.clone(),
            tail: self.tail.clone(),
        }
    }
}

/// Radix tree of the routes registered for one request method
///
/// Insertion needs `&mut self`; lookups are read-only and may run concurrently from any
/// number of threads once registration is done.
pub struct Tree<H> {
    root: Node<H>,
    /// If enabled, registering an existing pattern replaces its handler
    mutable: bool,
    len: usize,
}

impl<H> Tree<H> {
    #[must_use]
    pub fn new(mutable: bool) -> Self {
        Self {
            root: Node::new("", NodeKind::Static),
            mutable,
            len: 0,
        }
    }

    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn set_mutable(&mut self, mutable: bool) {
        self.mutable = mutable;
    }

    /// Number of distinct patterns registered
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register `handler` for `path`
    ///
    /// # Errors
    ///
    /// * [`RouterError::InvalidPathPattern`] - the pattern is malformed
    /// * [`RouterError::RouteConflict`] - the pattern is already bound on an immutable tree,
    ///   or its wildcard disagrees with one registered at the same position
    pub fn insert(&mut self, path: &str, handler: H) -> Result<Insertion, RouterError> {
        let pieces = parse_pattern(path)?;
        let ctx = InsertCtx {
            path,
            mutable: self.mutable,
        };
        let inserted = self.root.insert("", &pieces, handler, &ctx)?;
        if inserted == Insertion::Added {
            self.root.priority += 1;
            self.len += 1;
        }
        Ok(inserted)
    }

    /// Exact match only, no redirects
    #[must_use]
    pub fn find(&self, path: &str) -> Option<(&H, Params)> {
        let mut params = Params::new();
        let handler = self.root.find(path, &mut params)?;
        Some((handler, params))
    }

    /// True if `path` matches a route exactly
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Resolve `path`, falling back to the redirects enabled in `redirects`
    ///
    /// An exact match always wins. Otherwise the trailing-slash variant is tried, then the
    /// cleaned path matched case-insensitively, then that cleaned path with its trailing
    /// slash toggled.
    pub fn lookup(&self, path: &str, redirects: RedirectPolicy) -> Lookup<'_, H> {
        if let Some((handler, params)) = self.find(path) {
            return Lookup::Matched { handler, params };
        }

        if redirects.trailing_slash {
            if let Some(toggled) = toggle_trailing_slash(path) {
                if self.matches(&toggled) {
                    return Lookup::RedirectTrailingSlash(toggled);
                }
            }
        }

        if redirects.fixed_path {
            let cleaned = clean_path(path);
            let mut fixed = String::with_capacity(cleaned.len() + 1);
            if self.root.find_fixed(&cleaned, &mut fixed) {
                return Lookup::RedirectFixedPath(fixed);
            }
            if redirects.trailing_slash {
                if let Some(toggled) = toggle_trailing_slash(&cleaned) {
                    if self.root.find_fixed(&toggled, &mut fixed) {
                        return Lookup::FixedPathWithTrailingSlash(fixed);
                    }
                }
            }
        }

        Lookup::NotFound
    }
}

/// `/a/b/` -> `/a/b` and `/a/b` -> `/a/b/`. The root has no alternative spelling.
fn toggle_trailing_slash(path: &str) -> Option<String> {
    if path.len() <= 1 {
        return None;
    }
    match path.strip_suffix('/') {
        Some(stripped) => Some(stripped.to_string()),
        None => {
            let mut toggled = String::with_capacity(path.len() + 1);
            toggled.push_str(path);
            toggled.push('/');
            Some(toggled)
        }
    }
}

impl<H> Default for Tree<H> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<H: Clone> Clone for Tree<H> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            mutable: self.mutable,
            len: self.len,
        }
    }
}

impl<H> fmt::Debug for Tree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tree(mutable={}, routes={})", self.mutable, self.len)?;
        self.root.fmt_tree(f, 1)
    }
}
