//! # cerarouter
//!
//! **cerarouter** is a radix-tree HTTP request router: one compressed prefix tree per request
//! method, named parameters with optional regex constraints, trailing catch-alls, and the
//! redirect and `405`/`OPTIONS` behaviour an HTTP front end expects from a router.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`router`]** - Route patterns, the per-method radix trees and dispatch
//! - **[`handler`]** - The `Handler` capability routes are bound to
//! - **[`service`]** - `http::Request` -> `http::Response` adapter over a router
//! - **[`shared`]** - Lock-free publication of a router for live route updates
//! - **[`config`]** - Router policy flags from defaults, environment or TOML
//! - **[`logging`]** - Structured logging setup for applications embedding the router
//! - **[`error`]** - Registration errors
//!
//! ### Request Handling Flow
//!
//! ```text
//! request ──> Router::dispatch(method, path)
//!               │
//!               ├─ exact match in the method's tree ─────────────> Matched { handler, params }
//!               ├─ path with trailing slash toggled matches ─────> RedirectTrailingSlash
//!               ├─ cleaned path matches case-insensitively ──────> RedirectFixedPath
//!               ├─ OPTIONS and other methods match ──────────────> OptionsSynthesized
//!               ├─ other methods match ──────────────────────────> MethodNotAllowed
//!               └─ ──────────────────────────────────────────────> NotFound
//! ```
//!
//! ## Route Patterns
//!
//! | Pattern | Matches | Captures |
//! |---------|---------|----------|
//! | `/users` | `/users` only | |
//! | `/users/:id` | `/users/42`, not `/users/42/x` or `/users/` | `id = 42` |
//! | `/users/:id:[0-9]+` | `/users/42`, not `/users/abc` | `id = 42` |
//! | `/files/*path` | `/files/`, `/files/a/b.txt` | `path = a/b.txt` |
//!
//! Static segments beat wildcards; when a static branch dead-ends the router backtracks into
//! the wildcard at the same position.
//!
//! ## Quick Start
//!
//! ```rust
//! use cerarouter::config::RouterConfig;
//! use cerarouter::router::{DispatchOutcome, Router};
//!
//! let mut router: Router<&str> = Router::with_config(RouterConfig::from_env());
//! router.get("/", "index").unwrap();
//! router.get("/users/:id:[0-9]+", "show_user").unwrap();
//! router.get("/static/*filepath", "assets").unwrap();
//!
//! match router.dispatch("GET", "/users/7") {
//!     DispatchOutcome::Matched { handler, params } => {
//!         assert_eq!(*handler, "show_user");
//!         assert_eq!(params.get("id"), Some("7"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Runtime Considerations
//!
//! - Registration takes `&mut self`; dispatch takes `&self` and never blocks
//! - A finished [`Router`](router::Router) is `Send + Sync` when its handlers are
//! - Use [`SharedRouter`](shared::SharedRouter) to change routes while serving

pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod router;
pub mod service;
pub mod shared;

pub use config::{load_router_config, RouterConfig};
pub use error::RouterError;
pub use handler::{handler_fn, BoxHandler, Handler, RouteRequest};
pub use router::{DispatchOutcome, Method, Params, Router};
pub use service::RouterService;
pub use shared::SharedRouter;
