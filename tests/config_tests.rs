use std::env;
use std::sync::Mutex;

use time_manager_bot::config::Config;

// Mutex to ensure config tests run sequentially to avoid environment variable conflicts
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for var in [
        "TELEGRAM_BOT_TOKEN",
        "DATABASE_URL",
        "HTTP_PORT",
        "WEBAPP_URL_BASE",
        "RATE_LIMIT_MAX_REQUESTS",
        "RATE_LIMIT_WINDOW_SECS",
    ] {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("WEBAPP_URL_BASE", "https://app.example.com/");
    env::set_var("RATE_LIMIT_MAX_REQUESTS", "10");
    env::set_var("RATE_LIMIT_WINDOW_SECS", "30");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);
    // Trailing slash is stripped so URL joining stays predictable.
    assert_eq!(config.webapp_url_base.as_deref(), Some("https://app.example.com"));
    assert_eq!(config.rate_limit_max_requests, 10);
    assert_eq!(config.rate_limit_window_secs, 30);

    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.database_url, "sqlite:./data/timemanager.db");
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.webapp_url_base, None);
    assert_eq!(config.rate_limit_max_requests, 30);
    assert_eq!(config.rate_limit_window_secs, 60);

    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    assert!(Config::from_env().is_err());
}

#[test]
fn test_config_blank_token_rejected() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "   ");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_config_invalid_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "token");
    env::set_var("HTTP_PORT", "not-a-port");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_config_invalid_rate_limit() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "token");
    env::set_var("RATE_LIMIT_MAX_REQUESTS", "lots");
    assert!(Config::from_env().is_err());

    clear_env();
}
