// Performance-focused tests for router scalability
//
// Thresholds are loose enough for unoptimized test builds; they catch a lookup that
// degrades to scanning every route, not small regressions.

use super::{DispatchOutcome, Method, Router};
use std::time::Instant;

fn handler_name(i: usize) -> String {
    format!("handler_{i}")
}

#[test]
fn test_router_performance_with_many_routes() {
    let mut router = Router::new();
    for i in 0..500 {
        router
            .get(&format!("/api/v1/resource{i}/:id"), handler_name(i))
            .unwrap();
    }

    let start = Instant::now();
    for _ in 0..1000 {
        let outcome = router.dispatch("GET", "/api/v1/resource250/123");
        assert!(matches!(
            outcome,
            DispatchOutcome::Matched { handler, .. } if handler == "handler_250"
        ));
    }
    let duration = start.elapsed();

    assert!(
        duration.as_millis() < 500,
        "Router performance degraded: {}ms for 1000 lookups with 500 routes",
        duration.as_millis()
    );
}

#[test]
fn test_router_worst_case_depth() {
    let mut router = Router::new();
    let mut path = String::new();
    for segment in ["a", "b", "c", "d", "e", "f"] {
        path.push('/');
        path.push_str(segment);
        router.get(&path, path.clone()).unwrap();
    }

    let start = Instant::now();
    for _ in 0..1000 {
        assert!(router.dispatch("GET", "/a/b/c/d/e/f").is_matched());
    }
    let duration = start.elapsed();

    assert!(
        duration.as_millis() < 200,
        "Deep path matching too slow: {}ms",
        duration.as_millis()
    );
}

#[test]
fn test_router_common_prefix_efficiency() {
    let mut router = Router::new();
    for (i, path) in [
        "/api/v1/users",
        "/api/v1/users/:id",
        "/api/v1/users/:id/profile",
        "/api/v1/posts",
        "/api/v1/posts/:id",
        "/api/v2/users",
        "/api/v2/posts",
    ]
    .into_iter()
    .enumerate()
    {
        router.get(path, i).unwrap();
    }

    let tree = router.tree(Method::Get);
    assert_eq!(tree.len(), 7);
    for path in [
        "/api/v1/users",
        "/api/v1/users/123",
        "/api/v1/users/123/profile",
        "/api/v1/posts",
        "/api/v2/users",
    ] {
        assert!(tree.matches(path), "{path}");
    }
}

#[test]
fn test_router_parameter_extraction_performance() {
    let mut router = Router::new();
    router
        .get(
            "/api/:version/users/:user_id/posts/:post_id/comments/:comment_id",
            "get_comment",
        )
        .unwrap();

    let start = Instant::now();
    for _ in 0..1000 {
        match router.dispatch("GET", "/api/v1/users/123/posts/456/comments/789") {
            DispatchOutcome::Matched { params, .. } => {
                assert_eq!(params.len(), 4);
                assert_eq!(params.get("comment_id"), Some("789"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    let duration = start.elapsed();

    assert!(
        duration.as_millis() < 200,
        "Parameter extraction too slow: {}ms",
        duration.as_millis()
    );
}

#[test]
fn test_not_found_stays_cheap_with_many_methods() {
    let mut router = Router::new();
    for i in 0..200 {
        router.any(&format!("/svc{i}/:id"), i).unwrap();
    }

    let start = Instant::now();
    for _ in 0..1000 {
        assert_eq!(
            router.dispatch("GET", "/missing/route"),
            DispatchOutcome::NotFound
        );
    }
    let duration = start.elapsed();

    assert!(
        duration.as_millis() < 500,
        "Unmatched dispatch too slow: {}ms",
        duration.as_millis()
    );
}
