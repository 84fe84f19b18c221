use super::*;

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__SVG_MANAGER_TEST_MISSING__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__SVG_MANAGER_TEST_VALID__", "99") };
    let val: u32 = env_parse("__SVG_MANAGER_TEST_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__SVG_MANAGER_TEST_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__SVG_MANAGER_TEST_INVALID__", "lots") };
    let val: usize = env_parse("__SVG_MANAGER_TEST_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__SVG_MANAGER_TEST_INVALID__") };
}

#[test]
fn default_matches_constants() {
    let config = StoreConfig::default();
    assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    assert_eq!(config.max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(config.max_import_bytes, DEFAULT_IMPORT_MAX_BYTES);
    assert!(!config.is_in_memory());
}

#[test]
fn in_memory_config_is_detected() {
    assert!(StoreConfig::in_memory().is_in_memory());
    let shared = StoreConfig { database_url: "sqlite:file:icons?mode=memory&cache=shared".into(), ..StoreConfig::default() };
    assert!(shared.is_in_memory());
}
