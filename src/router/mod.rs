//! # Router Module
//!
//! The router module provides path matching and route resolution for cerarouter. Routes are
//! stored in one radix tree per request method and matched in time proportional to the
//! length of the request path, not the number of routes.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Parsing route patterns with `:param`, `:param:regex`, `*catchall` and `*catchall:regex`
//!   segments
//! - Matching request paths, preferring static text over wildcards and backtracking when a
//!   static branch dead-ends
//! - Extracting captured parameters in path order
//! - Suggesting trailing-slash and fixed-path redirects, 405 `Allow` lists and synthesized
//!   OPTIONS answers when no route matches exactly
//!
//! ## Example
//!
//! ```rust
//! use cerarouter::router::{DispatchOutcome, Router};
//!
//! let mut router: Router<u32> = Router::new();
//! router.get("/src/*filepath", 1).unwrap();
//! router.get("/users/:id:[0-9]+", 2).unwrap();
//!
//! if let DispatchOutcome::Matched { handler, params } = router.dispatch("GET", "/src/lib/mod.rs") {
//!     assert_eq!(*handler, 1);
//!     assert_eq!(params.get("filepath"), Some("lib/mod.rs"));
//! }
//!
//! assert_eq!(router.dispatch("GET", "/users/abc"), DispatchOutcome::NotFound);
//! assert_eq!(
//!     router.dispatch("GET", "/USERS/7").location(),
//!     Some("/users/7")
//! );
//! ```
//!
//! ## Performance
//!
//! - Shared prefixes are stored once and children are ordered by how many routes they hold
//! - Captured parameters live inline (no heap) for up to eight parameters
//! - Dispatch takes `&self` and never locks

mod core;
mod method;
mod params;
mod path;
mod pattern;
mod radix;
#[cfg(test)]
mod performance_tests;

pub use core::{DispatchOutcome, Router};
pub use method::{AllowedMethods, Method};
pub use params::{ParamVec, Params, MAX_INLINE_PARAMS};
pub use path::clean_path;
pub use radix::{Insertion, Lookup, NodeKind, RedirectPolicy, Tree};
