use smallvec::SmallVec;

/// Canonical form of a request path
///
/// Applied iteratively until no further processing can be done:
///
/// 1. Replace multiple slashes with a single slash.
/// 2. Eliminate each `.` path name element (the current directory).
/// 3. Eliminate each inner `..` path name element (the parent directory)
///    along with the non-`..` element that precedes it.
/// 4. Eliminate `..` elements that begin a rooted path,
///    that is, replace `/..` by `/` at the beginning of a path.
///
/// The result always starts with `/`, and keeps a trailing slash if the input had one.
/// An empty path becomes `/`.
#[must_use]
pub fn clean_path(path: &str) -> String {
    let mut parts: SmallVec<[&str; 16]> = SmallVec::new();
    for element in path.split('/') {
        match element {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for part in &parts {
        cleaned.push('/');
        cleaned.push_str(part);
    }
    if cleaned.is_empty() || path.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}
