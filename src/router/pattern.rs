//! Route pattern parsing
//!
//! A pattern is split on `/` into segments:
//!
//! - `:name` captures one non-empty segment
//! - `:name:regex` captures one segment that must fully match `regex`
//! - `*name` captures the rest of the path, slashes included; final segment only
//! - `*name:regex` as above, constrained; the regex runs to the end of the pattern
//! - anything else is literal text
//!
//! Parsing produces alternating literal and wildcard pieces, e.g.
//! `/users/:id/posts` becomes `["/users/", :id, "/posts"]`.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use super::radix::NodeKind;
use crate::error::RouterError;

/// Compiled regular expression a captured value must fully match
#[derive(Clone)]
pub(crate) struct Constraint {
    source: Arc<str>,
    regex: Regex,
}

impl Constraint {
    fn compile(path: &str, source: &str) -> Result<Self, RouterError> {
        if source.is_empty() {
            return Err(RouterError::invalid(path, "empty regex constraint"));
        }
        let regex = Regex::new(&format!("^(?:{source})$"))
            .map_err(|e| RouterError::invalid(path, format!("bad regex '{source}': {e}")))?;
        Ok(Self {
            source: Arc::from(source),
            regex,
        })
    }

    #[inline]
    pub(crate) fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

/// A parsed `:name` or `*name` segment
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WildcardSpec {
    pub kind: NodeKind,
    pub name: Arc<str>,
    pub constraint: Option<Constraint>,
}

impl fmt::Display for WildcardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sigil = if self.kind == NodeKind::CatchAll { '*' } else { ':' };
        write!(f, "{sigil}{}", self.name)?;
        if let Some(constraint) = &self.constraint {
            write!(f, ":{}", constraint.source())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Piece<'p> {
    Static(&'p str),
    Wildcard(WildcardSpec),
}

/// Split a route pattern into literal and wildcard pieces
pub(crate) fn parse_pattern(path: &str) -> Result<Vec<Piece<'_>>, RouterError> {
    if !path.starts_with('/') {
        return Err(RouterError::invalid(path, "path must begin with '/'"));
    }

    let mut pieces = Vec::new();
    let mut names: Vec<&str> = Vec::new();
    let mut literal_start = 0;
    let mut seg_start = 1;

    while seg_start <= path.len() {
        let rest = &path[seg_start..];
        let seg_end = rest.find('/').map_or(path.len(), |i| seg_start + i);

        match rest.as_bytes().first() {
            Some(b':') => {
                let (name, constraint) = split_name(&path[seg_start + 1..seg_end]);
                let spec = wildcard(path, NodeKind::Param, name, constraint, &mut names)?;
                if literal_start < seg_start {
                    pieces.push(Piece::Static(&path[literal_start..seg_start]));
                }
                pieces.push(Piece::Wildcard(spec));
                literal_start = seg_end;
            }
            Some(b'*') => {
                let (name, constraint) = split_name(&path[seg_start + 1..]);
                if name.contains('/') {
                    return Err(RouterError::invalid(
                        path,
                        format!("catch-all '*{name}' must be the final segment"),
                    ));
                }
                let spec = wildcard(path, NodeKind::CatchAll, name, constraint, &mut names)?;
                if literal_start < seg_start {
                    pieces.push(Piece::Static(&path[literal_start..seg_start]));
                }
                pieces.push(Piece::Wildcard(spec));
                return Ok(pieces);
            }
            _ => {
                let segment = &path[seg_start..seg_end];
                if segment.contains([':', '*']) {
                    return Err(RouterError::invalid(
                        path,
                        format!("wildcard must occupy a whole segment, found '{segment}'"),
                    ));
                }
            }
        }

        seg_start = seg_end + 1;
    }

    if literal_start < path.len() {
        pieces.push(Piece::Static(&path[literal_start..]));
    }
    Ok(pieces)
}

/// `name:regex` -> (`name`, Some(`regex`)); the name ends at the first `:`
fn split_name(segment: &str) -> (&str, Option<&str>) {
    match segment.split_once(':') {
        Some((name, constraint)) => (name, Some(constraint)),
        None => (segment, None),
    }
}

fn wildcard<'p>(
    path: &str,
    kind: NodeKind,
    name: &'p str,
    constraint: Option<&str>,
    seen: &mut Vec<&'p str>,
) -> Result<WildcardSpec, RouterError> {
    if name.is_empty() {
        return Err(RouterError::invalid(path, "wildcards must be named"));
    }
    if name.contains('*') {
        return Err(RouterError::invalid(
            path,
            format!("invalid character in parameter name '{name}'"),
        ));
    }
    if seen.contains(&name) {
        return Err(RouterError::invalid(
            path,
            format!("parameter '{name}' appears more than once"),
        ));
    }
    seen.push(name);

    let constraint = constraint
        .map(|source| Constraint::compile(path, source))
        .transpose()?;
    Ok(WildcardSpec {
        kind,
        name: Arc::from(name),
        constraint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(path: &str) -> Vec<String> {
        parse_pattern(path)
            .unwrap()
            .into_iter()
            .map(|piece| match piece {
                Piece::Static(s) => s.to_string(),
                Piece::Wildcard(spec) => spec.to_string(),
            })
            .collect()
    }

    fn reason(path: &str) -> String {
        match parse_pattern(path) {
            Err(RouterError::InvalidPathPattern { reason, .. }) => reason,
            other => panic!("expected InvalidPathPattern for {path}, got {other:?}"),
        }
    }

    #[test]
    fn test_static_pattern_is_one_piece() {
        assert_eq!(describe("/"), vec!["/"]);
        assert_eq!(describe("/zoo/animals/"), vec!["/zoo/animals/"]);
    }

    #[test]
    fn test_params_split_literals() {
        assert_eq!(
            describe("/users/:id/posts/:post_id"),
            vec!["/users/", ":id", "/posts/", ":post_id"]
        );
        assert_eq!(describe("/:lang/"), vec!["/", ":lang", "/"]);
    }

    #[test]
    fn test_constraints_are_kept() {
        assert_eq!(
            describe("/users/:id:[0-9]+/edit"),
            vec!["/users/", ":id:[0-9]+", "/edit"]
        );
        assert_eq!(
            describe("/assets/*file:[a-z/]+\\.png"),
            vec!["/assets/", "*file:[a-z/]+\\.png"]
        );
    }

    #[test]
    fn test_constraint_is_anchored() {
        let pieces = parse_pattern("/n/:num:[0-9]+").unwrap();
        let Piece::Wildcard(spec) = &pieces[1] else {
            panic!("expected wildcard");
        };
        let constraint = spec.constraint.as_ref().unwrap();
        assert!(constraint.is_match("123"));
        assert!(!constraint.is_match("12a"));
        assert!(!constraint.is_match("a12"));
    }

    #[test]
    fn test_rejects_malformed_patterns() {
        assert_eq!(reason(""), "path must begin with '/'");
        assert_eq!(reason("users"), "path must begin with '/'");
        assert_eq!(reason("/users/:"), "wildcards must be named");
        assert_eq!(reason("/files/*"), "wildcards must be named");
        assert_eq!(
            reason("/files/*rest/more"),
            "catch-all '*rest/more' must be the final segment"
        );
        assert_eq!(
            reason("/a/:id/b/:id"),
            "parameter 'id' appears more than once"
        );
        assert_eq!(
            reason("/report.:format"),
            "wildcard must occupy a whole segment, found 'report.:format'"
        );
        assert_eq!(reason("/n/:num:"), "empty regex constraint");
        assert!(reason("/n/:num:[0-9").starts_with("bad regex '[0-9'"));
    }
}
