use cerarouter::logging::{init_logging_with_config, LogConfig};
use cerarouter::router::Router;

// Installs the process-wide subscriber, so this binary holds a single test.
#[test]
fn test_global_subscriber_installs_once() {
    let bad = LogConfig {
        directives: Some("cerarouter=notalevel".to_string()),
        ..LogConfig::development()
    };
    assert!(init_logging_with_config(&bad).is_err());

    let config = LogConfig {
        directives: Some("cerarouter::router=trace".to_string()),
        ..LogConfig::production()
    };
    init_logging_with_config(&config).unwrap();

    // Router events go through the installed subscriber.
    let mut router = Router::new();
    router.get("/logged/:id", "logged").unwrap();
    assert!(router.dispatch("GET", "/logged/1").is_matched());

    let err = init_logging_with_config(&LogConfig::development()).unwrap_err();
    assert!(err.to_string().contains("Failed to initialize logging"), "{err}");
}
