//! # Handlers
//!
//! A handler is anything that can turn a routed request into a response. The router
//! itself is generic over the handler type and never calls it; [`RouterService`] is the
//! piece that invokes the matched handler.
//!
//! Closures with the right signature are handlers:
//!
//! ```rust
//! use cerarouter::handler::{handler_fn, RouteRequest};
//! use http::Response;
//!
//! let hello = handler_fn(|req: RouteRequest<'_>| {
//!     let name = req.params.get("name").unwrap_or("world");
//!     Response::new(format!("hello, {name}").into_bytes())
//! });
//! # let _ = hello;
//! ```
//!
//! [`RouterService`]: crate::service::RouterService

use std::fmt;
use std::sync::Arc;

use crate::router::Params;

/// Request body type handed to handlers
pub type Body = Vec<u8>;

/// A request that matched a route, with the parameters captured from its path
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    pub request: &'a http::Request<Body>,
    pub params: &'a Params,
}

/// Handle a routed request and produce a response
pub trait Handler: Send + Sync {
    fn handle(&self, req: RouteRequest<'_>) -> http::Response<Body>;
}

impl<F> Handler for F
where
    F: Fn(RouteRequest<'_>) -> http::Response<Body> + Send + Sync,
{
    fn handle(&self, req: RouteRequest<'_>) -> http::Response<Body> {
        self(req)
    }
}

impl fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Shared, type-erased handler: the default handler type of a router
pub type BoxHandler = Arc<dyn Handler>;

/// Wrap a closure as a [`BoxHandler`]
pub fn handler_fn<F>(f: F) -> BoxHandler
where
    F: Fn(RouteRequest<'_>) -> http::Response<Body> + Send + Sync + 'static,
{
    Arc::new(f)
}
