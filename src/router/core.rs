//! Router core module - hot path for request routing.
//!
//! A [`Router`] keeps one radix [`Tree`] per request method. Registration mutates the trees
//! and needs `&mut self`; [`Router::dispatch`] is a read-only walk that never fails and
//! returns a [`DispatchOutcome`] describing how the request should be answered.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::method::{AllowedMethods, Method};
use super::params::Params;
use super::radix::{Insertion, Lookup, RedirectPolicy, Tree};
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::handler::BoxHandler;

/// Matches slower than this are logged as warnings
const SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(1);

/// How a request should be answered
///
/// Produced by [`Router::dispatch`]. Redirect locations are paths only; the caller is
/// responsible for carrying over the query string.
#[derive(Debug, PartialEq)]
pub enum DispatchOutcome<'r, H> {
    /// A route matched; call `handler` with the captured `params`
    Matched { handler: &'r H, params: Params },
    /// No route for this path under any method
    NotFound,
    /// The path is routed, but not for this method
    MethodNotAllowed { allowed: AllowedMethods },
    /// The path is routed with its trailing slash toggled
    RedirectTrailingSlash { location: String },
    /// The path is routed once cleaned and case-corrected
    RedirectFixedPath { location: String },
    /// OPTIONS request without an OPTIONS route: answer with the methods that are routed
    OptionsSynthesized { allowed: AllowedMethods },
}

impl<H> DispatchOutcome<'_, H> {
    /// True for [`DispatchOutcome::Matched`]
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, DispatchOutcome::Matched { .. })
    }

    /// Redirect target, if this outcome is a redirect
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            DispatchOutcome::RedirectTrailingSlash { location }
            | DispatchOutcome::RedirectFixedPath { location } => Some(location),
            _ => None,
        }
    }
}

/// Method-aware request router
///
/// Generic over the handler type; defaults to the type-erased [`BoxHandler`] used by
/// [`RouterService`](crate::service::RouterService). Routes are registered up front, after
/// which the router can be shared across threads and dispatched concurrently.
///
/// # Example
///
/// ```rust
/// use cerarouter::router::{DispatchOutcome, Router};
///
/// let mut router: Router<&str> = Router::new();
/// router.get("/users/:id", "show_user").unwrap();
/// router.post("/users", "create_user").unwrap();
///
/// match router.dispatch("GET", "/users/42") {
///     DispatchOutcome::Matched { handler, params } => {
///         assert_eq!(*handler, "show_user");
///         assert_eq!(params.get("id"), Some("42"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
///
/// assert!(matches!(
///     router.dispatch("DELETE", "/users"),
///     DispatchOutcome::MethodNotAllowed { .. }
/// ));
/// ```
#[derive(Clone)]
pub struct Router<H = BoxHandler> {
    trees: [Tree<H>; 10],
    /// Registered `(method, pattern)` pairs in registration order
    routes: Vec<(Method, Arc<str>)>,
    config: RouterConfig,
}

impl<H> Router<H> {
    /// Create a router with every policy enabled and immutable routes
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            trees: std::array::from_fn(|_| Tree::new(config.mutable)),
            routes: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The tree holding the routes of `method`
    #[must_use]
    pub fn tree(&self, method: Method) -> &Tree<H> {
        &self.trees[method.index()]
    }

    /// Number of registered `(method, pattern)` pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Register `handler` for `method` and `path`
    ///
    /// # Errors
    ///
    /// * [`RouterError::UnknownMethod`] - `method` is not one of the ten routable methods
    /// * [`RouterError::InvalidPathPattern`] - `path` is malformed
    /// * [`RouterError::RouteConflict`] - `path` clashes with a registered route
    pub fn register(&mut self, method: &str, path: &str, handler: H) -> Result<(), RouterError> {
        let method: Method = method.parse()?;
        self.insert(method, path, handler)
    }

    /// Register `handler` for an already parsed method
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn insert(&mut self, method: Method, path: &str, handler: H) -> Result<(), RouterError> {
        let inserted = self.trees[method.index()]
            .insert(path, handler)
            .inspect_err(|e| {
                warn!(method = %method, path = %path, error = %e, "Route registration failed");
            })?;

        if inserted == Insertion::Added {
            self.routes.push((method, Arc::from(path)));
        }
        info!(
            method = %method,
            path = %path,
            replaced = inserted == Insertion::Replaced,
            routes_count = self.routes.len(),
            "Route registered"
        );
        Ok(())
    }

    /// Register a GET route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn get(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Get, path, handler)
    }

    /// Register a POST route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn post(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Post, path, handler)
    }

    /// Register a HEAD route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn head(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Head, path, handler)
    }

    /// Register a PUT route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn put(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Put, path, handler)
    }

    /// Register a DELETE route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn delete(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Delete, path, handler)
    }

    /// Register a CONNECT route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn connect(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Connect, path, handler)
    }

    /// Register an OPTIONS route, which takes precedence over synthesized OPTIONS answers
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn options(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Options, path, handler)
    }

    /// Register a TRACE route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn trace(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Trace, path, handler)
    }

    /// Register a PATCH route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn patch(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Patch, path, handler)
    }

    /// Register a COPY route
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn copy(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        self.insert(Method::Copy, path, handler)
    }

    /// Resolve a request
    ///
    /// Method strings outside the ten routable methods are treated as a method with no
    /// routes: the result is `MethodNotAllowed` or `NotFound`.
    pub fn dispatch(&self, method: &str, path: &str) -> DispatchOutcome<'_, H> {
        match Method::parse(method) {
            Some(method) => self.dispatch_method(method, path),
            None => {
                debug!(method = %method, path = %path, "Dispatch for unroutable method");
                self.unmatched(None, path)
            }
        }
    }

    /// Resolve a request for an already parsed method
    ///
    /// Order of precedence: exact match, trailing-slash and fixed-path redirects (never for
    /// CONNECT or `/`), synthesized OPTIONS, method not allowed, not found.
    pub fn dispatch_method(&self, method: Method, path: &str) -> DispatchOutcome<'_, H> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let redirects = if method == Method::Connect || path == "/" {
            RedirectPolicy::none()
        } else {
            self.config.redirects()
        };

        let outcome = match self.trees[method.index()].lookup(path, redirects) {
            Lookup::Matched { handler, params } => DispatchOutcome::Matched { handler, params },
            Lookup::RedirectTrailingSlash(location) => {
                DispatchOutcome::RedirectTrailingSlash { location }
            }
            Lookup::RedirectFixedPath(location) | Lookup::FixedPathWithTrailingSlash(location) => {
                DispatchOutcome::RedirectFixedPath { location }
            }
            Lookup::NotFound => self.unmatched(Some(method), path),
        };

        let match_duration = match_start.elapsed();
        if match_duration > SLOW_MATCH_THRESHOLD {
            warn!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        }

        match &outcome {
            DispatchOutcome::Matched { params, .. } => debug!(
                method = %method,
                path = %path,
                path_params = ?params,
                duration_us = match_duration.as_micros(),
                "Route matched"
            ),
            DispatchOutcome::RedirectTrailingSlash { location }
            | DispatchOutcome::RedirectFixedPath { location } => debug!(
                method = %method,
                path = %path,
                location = %location,
                "Route redirected"
            ),
            _ => debug!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            ),
        }

        outcome
    }

    /// Outcome once the method's own tree has nothing for `path`
    fn unmatched(&self, method: Option<Method>, path: &str) -> DispatchOutcome<'_, H> {
        if method == Some(Method::Options) && self.config.handle_options {
            let allowed = self.allowed(path, Some(Method::Options));
            if !allowed.is_empty() {
                return DispatchOutcome::OptionsSynthesized { allowed };
            }
        } else if self.config.handle_method_not_allowed {
            let allowed = self.allowed(path, method);
            if !allowed.is_empty() {
                return DispatchOutcome::MethodNotAllowed { allowed };
            }
        }
        DispatchOutcome::NotFound
    }

    /// Methods, other than `exclude`, with a route matching `path` exactly
    #[must_use]
    pub fn allowed(&self, path: &str, exclude: Option<Method>) -> AllowedMethods {
        Method::ALL
            .into_iter()
            .filter(|&method| Some(method) != exclude)
            .filter(|&method| {
                let tree = &self.trees[method.index()];
                !tree.is_empty() && tree.matches(path)
            })
            .collect()
    }

    /// Registered `(method, pattern)` pairs in registration order
    pub fn routes(&self) -> impl Iterator<Item = (Method, &str)> + '_ {
        self.routes
            .iter()
            .map(|(method, path)| (*method, path.as_ref()))
    }

    /// Log the routing table
    ///
    /// Useful for debugging and verifying that routes are loaded correctly.
    pub fn dump_routes(&self) {
        info!(
            routes_count = self.routes.len(),
            config = ?self.config,
            "Routing table"
        );
        for (method, path) in &self.routes {
            info!(method = %method, path = %path, "Route");
        }
    }
}

impl<H: Clone> Router<H> {
    /// Register `handler` for all ten methods
    ///
    /// Stops at the first method that rejects the route; methods registered before it keep
    /// the handler.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn any(&mut self, path: &str, handler: H) -> Result<(), RouterError> {
        for method in Method::ALL {
            self.insert(method, path, handler.clone())?;
        }
        Ok(())
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &self.routes)
            .finish()
    }
}
