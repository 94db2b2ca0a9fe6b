use std::fmt;

/// Registration-time routing error
///
/// Returned by [`Router::register`](crate::router::Router::register) and
/// [`Tree::insert`](crate::router::Tree::insert). Dispatch never produces one of
/// these: an unmatched request path is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The method is not one of the ten routable methods
    UnknownMethod {
        /// The method string as supplied by the caller
        method: String,
    },
    /// The route is ambiguous with, or duplicates, an existing route
    ///
    /// Raised for a second handler on an already bound path of an immutable tree and for
    /// two incompatible wildcards (different kind, name or constraint) at one position.
    RouteConflict {
        /// The pattern that failed to register
        path: String,
        /// What it conflicts with
        reason: String,
    },
    /// The pattern is malformed
    ///
    /// Covers a missing leading `/`, empty or duplicated wildcard names, a catch-all that is
    /// not the final segment, text sharing a segment with a wildcard and regex constraints
    /// that fail to compile.
    InvalidPathPattern {
        /// The offending pattern
        path: String,
        /// Why it was rejected
        reason: String,
    },
}

impl RouterError {
    pub(crate) fn conflict(path: &str, reason: impl Into<String>) -> Self {
        RouterError::RouteConflict {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        RouterError::InvalidPathPattern {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::UnknownMethod { method } => {
                write!(
                    f,
                    "unknown method '{}': expected one of GET, POST, HEAD, PUT, DELETE, \
                    CONNECT, OPTIONS, TRACE, PATCH, COPY",
                    method
                )
            }
            RouterError::RouteConflict { path, reason } => {
                write!(f, "route conflict for '{}': {}", path, reason)
            }
            RouterError::InvalidPathPattern { path, reason } => {
                write!(f, "invalid path pattern '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for RouterError {}
