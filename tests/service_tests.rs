use cerarouter::handler::{handler_fn, RouteRequest};
use cerarouter::router::Router;
use cerarouter::service::RouterService;
use cerarouter::shared::SharedRouter;
use http::header::{ALLOW, LOCATION};
use http::{Method, Request, Response, StatusCode};

fn echo_params() -> cerarouter::BoxHandler {
    handler_fn(|req: RouteRequest<'_>| {
        let body = req
            .params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        Response::new(body.into_bytes())
    })
}

fn text(body: &'static str) -> cerarouter::BoxHandler {
    handler_fn(move |_req: RouteRequest<'_>| Response::new(body.as_bytes().to_vec()))
}

fn service() -> RouterService {
    let mut router = Router::new();
    router.get("/pets", text("list")).unwrap();
    router.post("/pets", text("create")).unwrap();
    router.get("/pets/:id", echo_params()).unwrap();
    router.delete("/pets/:id", text("delete")).unwrap();
    router.get("/files/*path", echo_params()).unwrap();
    router.put("/docs/", text("docs")).unwrap();
    RouterService::new(router)
}

fn request(method: Method, uri: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Vec::new())
        .unwrap()
}

#[test]
fn test_matched_handler_sees_params() {
    let service = service();
    let response = service.call(request(Method::GET, "/pets/42"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"id=42");

    let response = service.call(request(Method::GET, "/files/img/cat.png?size=2"));
    assert_eq!(response.body(), b"path=img/cat.png");
}

#[test]
fn test_not_found() {
    let response = service().call(request(Method::GET, "/birds"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(ALLOW).is_none());
}

#[test]
fn test_method_not_allowed_sets_allow() {
    let response = service().call(request(Method::PATCH, "/pets/1"));
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[ALLOW], "GET, DELETE");
}

#[test]
fn test_synthesized_options() {
    let response = service().call(request(Method::OPTIONS, "/pets"));
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[ALLOW], "GET, POST");
}

#[test]
fn test_get_redirects_are_301_and_keep_query() {
    let service = service();
    let response = service.call(request(Method::GET, "/pets/?page=2"));
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[LOCATION], "/pets?page=2");

    let response = service.call(request(Method::GET, "/PETS/7"));
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[LOCATION], "/pets/7");
}

#[test]
fn test_other_method_redirects_are_308() {
    let response = service().call(request(Method::PUT, "/docs"));
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/docs/");
}

#[test]
fn test_extension_methods_are_not_routed() {
    let method = Method::from_bytes(b"PURGE").unwrap();
    let response = service().call(request(method.clone(), "/pets"));
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[ALLOW], "GET, POST");

    let response = service().call(request(method, "/nothing"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_custom_fallback_handlers() {
    let service = service()
        .not_found(handler_fn(|req: RouteRequest<'_>| {
            let mut response = Response::new(format!("no {}", req.request.uri().path()).into_bytes());
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }))
        .method_not_allowed(text("try another verb"));

    let response = service.call(request(Method::GET, "/birds"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), b"no /birds");

    let response = service.call(request(Method::PATCH, "/pets"));
    assert_eq!(response.body(), b"try another verb");
    assert_eq!(response.headers()[ALLOW], "GET, POST");
}

#[test]
fn test_service_sees_live_updates() {
    let shared: SharedRouter = SharedRouter::new(Router::new());
    let service = RouterService::from_shared(shared.clone());
    assert_eq!(
        service.call(request(Method::GET, "/late")).status(),
        StatusCode::NOT_FOUND
    );

    shared.register("GET", "/late", text("here")).unwrap();
    let response = service.call(request(Method::GET, "/late"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"here");
}
