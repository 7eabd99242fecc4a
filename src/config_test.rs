use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn defaults_when_nothing_set() {
    let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config.api_url, "http://127.0.0.1:8000/api");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.editor, EditorConfig::default());
}

#[test]
fn overrides_are_applied() {
    let config = AppConfig::from_lookup(lookup_from(&[
        ("SEATING_API_URL", "https://plan.example.com/api/"),
        ("SEATING_REQUEST_TIMEOUT_SECS", "5"),
        ("SEATING_RESIZE_DEBOUNCE_MS", "400"),
        ("SEATING_SAVED_FLASH_MS", "2000"),
        ("SEATING_DISCARD_STALE", "true"),
    ]))
    .unwrap();
    assert_eq!(config.api_url, "https://plan.example.com/api");
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.editor.resize_debounce_ms, 400);
    assert_eq!(config.editor.saved_flash_ms, 2000);
    assert_eq!(config.editor.stale_policy, StalePolicy::DiscardStale);
    assert_eq!(config.editor.settle_delay_ms, EditorConfig::default().settle_delay_ms);
}

#[test]
fn invalid_number_is_an_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("SEATING_CONNECT_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidValue { key: "SEATING_CONNECT_TIMEOUT_SECS", value: "soon".into() });
}

#[test]
fn invalid_flag_is_an_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("SEATING_DISCARD_STALE", "maybe")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key: "SEATING_DISCARD_STALE", .. }));
}

#[test]
fn non_http_url_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("SEATING_API_URL", "ftp://host/api")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidApiUrl("ftp://host/api".into()));
}

#[test]
fn with_api_url_overrides_and_trims() {
    let config = AppConfig::from_lookup(lookup_from(&[])).unwrap().with_api_url("http://localhost:9000/").unwrap();
    assert_eq!(config.api_url, "http://localhost:9000");
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse(&lookup_from(&[]), "__MISSING__", 42).unwrap();
    assert_eq!(val, 42);
}

#[test]
fn env_parse_trims_whitespace() {
    let val: i64 = env_parse(&lookup_from(&[("N", " 99 ")]), "N", 0).unwrap();
    assert_eq!(val, 99);
}

#[test]
fn parse_flag_variants() {
    assert_eq!(parse_flag("TRUE"), Some(true));
    assert_eq!(parse_flag("0"), Some(false));
    assert_eq!(parse_flag("perhaps"), None);
}
