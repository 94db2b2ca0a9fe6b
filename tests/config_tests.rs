use cerarouter::config::{load_router_config, RouterConfig};
use cerarouter::router::{DispatchOutcome, Router};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn test_missing_config_file_is_none() {
    let dir = tempdir().unwrap();
    let result = load_router_config(&dir.path().join("router.toml")).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_load_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "redirect_trailing_slash = false").unwrap();
    writeln!(file, "handle_options = false").unwrap();

    let config = load_router_config(file.path()).unwrap().unwrap();
    assert_eq!(
        config,
        RouterConfig {
            redirect_trailing_slash: false,
            handle_options: false,
            ..RouterConfig::default()
        }
    );
}

#[test]
fn test_malformed_config_file_names_the_path() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "mutable = = true").unwrap();

    let err = load_router_config(file.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Failed to parse router config"), "{message}");
    assert!(message.contains(&file.path().display().to_string()), "{message}");
}

#[test]
fn test_loaded_config_drives_dispatch() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "redirect_trailing_slash = false").unwrap();
    writeln!(file, "handle_method_not_allowed = false").unwrap();
    let config = load_router_config(file.path()).unwrap().unwrap();

    let mut router = Router::with_config(config);
    router.get("/a", "a").unwrap();
    assert_eq!(router.dispatch("GET", "/a/"), DispatchOutcome::NotFound);
    assert_eq!(router.dispatch("POST", "/a"), DispatchOutcome::NotFound);
    assert_eq!(
        router.dispatch("GET", "/A"),
        DispatchOutcome::RedirectFixedPath {
            location: "/a".to_string()
        }
    );
}

#[test]
fn test_mutable_flag_reaches_trees() {
    let config = RouterConfig::from_toml_str("mutable = true").unwrap();
    let router: Router<()> = Router::with_config(config);
    assert!(router.config().mutable);
    assert!(router.tree(cerarouter::Method::Get).is_mutable());
}
