use std::collections::HashMap;
use std::env::VarError;
use std::path::PathBuf;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn assert_invalid(result: Result<AppConfig, ConfigError>, expected_var: &str) {
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected_var),
        "expected InvalidEnvVar({expected_var}), got: {result:?}"
    );
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.targets_path, PathBuf::from("./config/targets.yaml"));
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, None);
    assert_eq!(cfg.headless_timeout_secs, 15);
    assert_eq!(cfg.headless_settle_ms, 10_000);
    assert!(!cfg.headless_wait_for_selector);
    assert!(cfg.chrome_path.is_none());
    assert_eq!(cfg.max_concurrent_targets, 4);
}

#[test]
fn request_timeout_override() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_REQUEST_TIMEOUT_SECS", "30");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, Some(30));
}

#[test]
fn request_timeout_zero_disables_timeout() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_REQUEST_TIMEOUT_SECS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, None);
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_REQUEST_TIMEOUT_SECS", "soon");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "HTMLEXP_REQUEST_TIMEOUT_SECS",
    );
}

#[test]
fn headless_timeout_must_be_positive() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_HEADLESS_TIMEOUT_SECS", "0");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "HTMLEXP_HEADLESS_TIMEOUT_SECS",
    );
}

#[test]
fn headless_settle_must_be_shorter_than_timeout() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_HEADLESS_TIMEOUT_SECS", "5");
    map.insert("HTMLEXP_HEADLESS_SETTLE_MS", "5000");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "HTMLEXP_HEADLESS_SETTLE_MS",
    );
}

#[test]
fn headless_overrides() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_HEADLESS_TIMEOUT_SECS", "30");
    map.insert("HTMLEXP_HEADLESS_SETTLE_MS", "2500");
    map.insert("HTMLEXP_HEADLESS_WAIT_FOR_SELECTOR", "true");
    map.insert("HTMLEXP_CHROME_PATH", "/usr/bin/chromium");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.headless_timeout_secs, 30);
    assert_eq!(cfg.headless_settle_ms, 2500);
    assert!(cfg.headless_wait_for_selector);
    assert_eq!(cfg.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
}

#[test]
fn wait_for_selector_invalid() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_HEADLESS_WAIT_FOR_SELECTOR", "maybe");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "HTMLEXP_HEADLESS_WAIT_FOR_SELECTOR",
    );
}

#[test]
fn blank_chrome_path_is_ignored() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_CHROME_PATH", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.chrome_path.is_none());
}

#[test]
fn max_concurrent_targets_zero_clamps_to_one() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_MAX_CONCURRENT_TARGETS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_concurrent_targets, 1);
}

#[test]
fn max_concurrent_targets_invalid() {
    let mut map = HashMap::new();
    map.insert("HTMLEXP_MAX_CONCURRENT_TARGETS", "lots");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "HTMLEXP_MAX_CONCURRENT_TARGETS",
    );
}
