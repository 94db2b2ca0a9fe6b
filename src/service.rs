//! # HTTP Service
//!
//! [`RouterService`] is the boundary between a transport and the router: it takes an
//! [`http::Request`], dispatches its method and path, and turns the outcome into an
//! [`http::Response`].
//!
//! | Outcome | Response |
//! |---------|----------|
//! | matched | whatever the handler returns |
//! | trailing-slash or fixed-path redirect | `301` for GET/HEAD, `308` otherwise, with `Location` |
//! | method not allowed | `405` with `Allow` |
//! | synthesized OPTIONS | `204` with `Allow` |
//! | not found | `404` |
//!
//! Redirect locations keep the request's query string. The not-found and
//! method-not-allowed responses can be replaced with custom handlers.
//!
//! ```rust
//! use cerarouter::handler::{handler_fn, RouteRequest};
//! use cerarouter::router::Router;
//! use cerarouter::service::RouterService;
//! use http::{Request, Response, StatusCode};
//!
//! let mut router = Router::new();
//! router
//!     .get("/hello/:name", handler_fn(|req: RouteRequest<'_>| {
//!         Response::new(req.params.get("name").unwrap_or_default().as_bytes().to_vec())
//!     }))
//!     .unwrap();
//!
//! let service = RouterService::new(router);
//! let response = service.call(Request::get("/hello/ferris").body(Vec::new()).unwrap());
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body(), b"ferris");
//!
//! let response = service.call(Request::get("/hello/ferris/?x=1").body(Vec::new()).unwrap());
//! assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
//! assert_eq!(response.headers()["location"], "/hello/ferris?x=1");
//! ```

use http::header::{HeaderValue, ALLOW, LOCATION};
use http::{Method as HttpMethod, Request, Response, StatusCode};
use tracing::{debug, warn};

use crate::handler::{Body, BoxHandler, RouteRequest};
use crate::router::{AllowedMethods, DispatchOutcome, Params, Router};
use crate::shared::SharedRouter;

/// Adapts a router of [`BoxHandler`]s to `http::Request` -> `http::Response`
#[derive(Clone, Debug)]
pub struct RouterService {
    router: SharedRouter<BoxHandler>,
    not_found: Option<BoxHandler>,
    method_not_allowed: Option<BoxHandler>,
}

impl RouterService {
    #[must_use]
    pub fn new(router: Router<BoxHandler>) -> Self {
        Self::from_shared(SharedRouter::new(router))
    }

    /// Serve from a shared router; routes published to it are visible to the next request
    #[must_use]
    pub fn from_shared(router: SharedRouter<BoxHandler>) -> Self {
        Self {
            router,
            not_found: None,
            method_not_allowed: None,
        }
    }

    /// Handler for requests no route matches, instead of a plain `404`
    #[must_use]
    pub fn not_found(mut self, handler: BoxHandler) -> Self {
        self.not_found = Some(handler);
        self
    }

    /// Handler for requests whose path is routed under other methods, instead of a plain
    /// `405`. The `Allow` header is added to its response unless it sets one.
    #[must_use]
    pub fn method_not_allowed(mut self, handler: BoxHandler) -> Self {
        self.method_not_allowed = Some(handler);
        self
    }

    #[must_use]
    pub fn router(&self) -> &SharedRouter<BoxHandler> {
        &self.router
    }

    /// Route and handle one request
    pub fn call(&self, req: Request<Body>) -> Response<Body> {
        let router = self.router.load();
        let no_params = Params::new();

        match router.dispatch(req.method().as_str(), req.uri().path()) {
            DispatchOutcome::Matched { handler, params } => handler.handle(RouteRequest {
                request: &req,
                params: &params,
            }),
            DispatchOutcome::RedirectTrailingSlash { location }
            | DispatchOutcome::RedirectFixedPath { location } => self.redirect(&req, location),
            DispatchOutcome::OptionsSynthesized { allowed } => {
                with_allow(status_response(StatusCode::NO_CONTENT), &allowed)
            }
            DispatchOutcome::MethodNotAllowed { allowed } => {
                let response = match &self.method_not_allowed {
                    Some(handler) => handler.handle(RouteRequest {
                        request: &req,
                        params: &no_params,
                    }),
                    None => status_response(StatusCode::METHOD_NOT_ALLOWED),
                };
                with_allow(response, &allowed)
            }
            DispatchOutcome::NotFound => self.respond_not_found(&req, &no_params),
        }
    }

    fn respond_not_found(&self, req: &Request<Body>, params: &Params) -> Response<Body> {
        match &self.not_found {
            Some(handler) => handler.handle(RouteRequest {
                request: req,
                params,
            }),
            None => status_response(StatusCode::NOT_FOUND),
        }
    }

    fn redirect(&self, req: &Request<Body>, mut location: String) -> Response<Body> {
        if let Some(query) = req.uri().query() {
            location.push('?');
            location.push_str(query);
        }

        // GET and HEAD may switch method on a 301; everything else needs 308 to keep it
        let status = if *req.method() == HttpMethod::GET || *req.method() == HttpMethod::HEAD {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::PERMANENT_REDIRECT
        };

        match HeaderValue::try_from(location.as_str()) {
            Ok(value) => {
                debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    location = %location,
                    status = status.as_u16(),
                    "Redirecting request"
                );
                let mut response = status_response(status);
                response.headers_mut().insert(LOCATION, value);
                response
            }
            Err(e) => {
                warn!(location = %location, error = %e, "Redirect location is not a valid header");
                self.respond_not_found(req, &Params::new())
            }
        }
    }
}

fn status_response(status: StatusCode) -> Response<Body> {
    let body = status.canonical_reason().unwrap_or_default().as_bytes().to_vec();
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

fn with_allow(mut response: Response<Body>, allowed: &AllowedMethods) -> Response<Body> {
    if response.headers().contains_key(ALLOW) {
        return response;
    }
    if let Ok(value) = HeaderValue::try_from(allowed.header_value()) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}
