use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    pub webapp_url_base: Option<String>,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/timemanager.db".to_string());
        let database_url = if database_url.trim().is_empty() {
            "sqlite:./data/timemanager.db".to_string()
        } else {
            database_url
        };

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let webapp_url_base = env::var("WEBAPP_URL_BASE")
            .ok()
            .map(|base| base.trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty());

        let rate_limit_max_requests = env::var("RATE_LIMIT_MAX_REQUESTS")
            .unwrap_or_else(|_| "30".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid RATE_LIMIT_MAX_REQUESTS"))?;

        let rate_limit_window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid RATE_LIMIT_WINDOW_SECS"))?;

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            webapp_url_base,
            rate_limit_max_requests,
            rate_limit_window_secs,
        })
    }
}
