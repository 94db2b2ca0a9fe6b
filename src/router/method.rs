use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::RouterError;

/// The ten request methods a [`Router`](super::Router) keeps a tree for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Head,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    Copy,
}

impl Method {
    /// Every routable method, in tree order
    pub const ALL: [Method; 10] = [
        Method::Get,
        Method::Post,
        Method::Head,
        Method::Put,
        Method::Delete,
        Method::Connect,
        Method::Options,
        Method::Trace,
        Method::Patch,
        Method::Copy,
    ];

    /// Index of this method's tree inside the router
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
            Method::Copy => "COPY",
        }
    }

    /// Parse a method name without allocating. Matching is exact (methods are case-sensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Method::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::parse(s).ok_or_else(|| RouterError::UnknownMethod {
            method: s.to_string(),
        })
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = RouterError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl TryFrom<Method> for http::Method {
    type Error = http::method::InvalidMethod;

    fn try_from(method: Method) -> Result<Self, Self::Error> {
        http::Method::from_bytes(method.as_str().as_bytes())
    }
}

/// Ordered set of methods that have a route for some path
///
/// Stored inline: there are only ten methods, so this never touches the heap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedMethods {
    methods: SmallVec<[Method; 10]>,
}

impl AllowedMethods {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a method, keeping tree order and ignoring duplicates
    pub fn insert(&mut self, method: Method) {
        match self.methods.binary_search(&method) {
            Ok(_) => {}
            Err(pos) => self.methods.insert(pos, method),
        }
    }

    #[must_use]
    pub fn contains(&self, method: Method) -> bool {
        self.methods.binary_search(&method).is_ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Method> + '_ {
        self.methods.iter().copied()
    }

    /// Render as an `Allow` header value, e.g. `GET, POST`
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut value = String::with_capacity(self.methods.len() * 8);
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                value.push_str(", ");
            }
            value.push_str(method.as_str());
        }
        value
    }
}

impl FromIterator<Method> for AllowedMethods {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        let mut allowed = AllowedMethods::new();
        for method in iter {
            allowed.insert(method);
        }
        allowed
    }
}

impl PartialEq<[&str]> for AllowedMethods {
    fn eq(&self, other: &[&str]) -> bool {
        self.methods.len() == other.len()
            && self
                .methods
                .iter()
                .zip(other.iter())
                .all(|(m, s)| m.as_str() == *s)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for AllowedMethods {
    fn eq(&self, other: &[&str; N]) -> bool {
        *self == other[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_methods() {
        for method in Method::ALL {
            assert_eq!(Method::parse(method.as_str()), Some(method));
            assert_eq!(method.as_str().parse::<Method>(), Ok(method));
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(Method::parse("get"), None);
        assert!(matches!(
            "PROPFIND".parse::<Method>(),
            Err(RouterError::UnknownMethod { method }) if method == "PROPFIND"
        ));
    }

    #[test]
    fn test_http_method_conversion() {
        assert_eq!(Method::try_from(&http::Method::PATCH), Ok(Method::Patch));
        let copy = http::Method::try_from(Method::Copy).unwrap();
        assert_eq!(copy.as_str(), "COPY");
        assert_eq!(Method::try_from(&copy), Ok(Method::Copy));
    }

    #[test]
    fn test_every_method_converts_to_itself() {
        for method in Method::ALL {
            let converted = http::Method::try_from(method).unwrap();
            assert_eq!(converted.as_str(), method.as_str());
            assert_eq!(Method::try_from(&converted), Ok(method));
        }
        assert_eq!(http::Method::try_from(Method::Get).unwrap(), http::Method::GET);
    }

    #[test]
    fn test_allowed_methods_are_ordered_and_deduplicated() {
        let allowed: AllowedMethods = [Method::Patch, Method::Get, Method::Patch, Method::Delete]
            .into_iter()
            .collect();
        assert_eq!(allowed.len(), 3);
        assert_eq!(allowed, ["GET", "DELETE", "PATCH"]);
        assert_eq!(allowed.header_value(), "GET, DELETE, PATCH");
        assert!(allowed.contains(Method::Delete));
        assert!(!allowed.contains(Method::Post));
    }
}
