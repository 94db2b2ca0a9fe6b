//! # Live Route Updates
//!
//! A [`Router`] is immutable while it serves traffic. [`SharedRouter`] publishes one through
//! an [`ArcSwap`] so routes can still change at runtime: an update clones the current
//! router, applies the change to the copy and swaps it in. Readers keep whatever snapshot
//! they loaded and never wait on a writer.
//!
//! ```rust
//! use cerarouter::router::{DispatchOutcome, Router};
//! use cerarouter::shared::SharedRouter;
//!
//! let shared: SharedRouter<&str> = SharedRouter::new(Router::new());
//! let before = shared.load();
//!
//! shared.register("GET", "/health", "health").unwrap();
//!
//! assert_eq!(before.dispatch("GET", "/health"), DispatchOutcome::NotFound);
//! assert!(shared.load().dispatch("GET", "/health").is_matched());
//! ```

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::RouterError;
use crate::handler::BoxHandler;
use crate::router::Router;

/// A router that can be replaced or extended while other threads dispatch against it
pub struct SharedRouter<H = BoxHandler> {
    current: Arc<ArcSwap<Router<H>>>,
}

impl<H> SharedRouter<H> {
    #[must_use]
    pub fn new(router: Router<H>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(router)),
        }
    }

    /// Snapshot of the current router
    ///
    /// The snapshot stays valid, and unchanged, for as long as it is held.
    #[must_use]
    pub fn load(&self) -> Arc<Router<H>> {
        self.current.load_full()
    }

    /// Run `f` against the current router without taking a long-lived reference to it
    pub fn with_router<R>(&self, f: impl FnOnce(&Router<H>) -> R) -> R {
        f(&self.current.load())
    }

    /// Swap in a new router, returning the one it replaced
    pub fn replace(&self, router: Router<H>) -> Arc<Router<H>> {
        let routes_count = router.len();
        let previous = self.current.swap(Arc::new(router));
        info!(
            routes_count,
            previous_routes_count = previous.len(),
            "Routing table replaced"
        );
        previous
    }
}

impl<H: Clone> SharedRouter<H> {
    /// Apply `f` to a copy of the current router and publish the result
    ///
    /// If another writer publishes first, `f` runs again on the newer router. When `f`
    /// fails nothing is published and the error is returned.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns.
    pub fn update<F>(&self, mut f: F) -> Result<(), RouterError>
    where
        F: FnMut(&mut Router<H>) -> Result<(), RouterError>,
    {
        loop {
            let current = self.current.load_full();
            let mut next = Router::clone(&current);
            f(&mut next)?;

            let routes_count = next.len();
            let previous = self.current.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&previous, &current) {
                info!(routes_count, "Routing table updated");
                return Ok(());
            }
            debug!("Routing table changed concurrently, retrying update");
        }
    }

    /// Register a route on a copy of the current router and publish it
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn register(&self, method: &str, path: &str, handler: H) -> Result<(), RouterError> {
        self.update(|router| router.register(method, path, handler.clone()))
    }
}

impl<H> Clone for SharedRouter<H> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<H> Default for SharedRouter<H> {
    fn default() -> Self {
        Self::new(Router::new())
    }
}

impl<H> From<Router<H>> for SharedRouter<H> {
    fn from(router: Router<H>) -> Self {
        Self::new(router)
    }
}

impl<H> fmt::Debug for SharedRouter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedRouter")
            .field(&*self.current.load())
            .finish()
    }
}
