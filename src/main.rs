//! # Time Manager Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, and runs
//! the Telegram bot and the web API server concurrently.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use time_manager_bot::bot::handlers::BotHandler;
use time_manager_bot::config::Config;
use time_manager_bot::database::connection::DatabaseManager;
use time_manager_bot::database::store::EventStore;
use time_manager_bot::security::auth::InitDataVerifier;
use time_manager_bot::security::rate_limit::SlidingWindowLimiter;
use time_manager_bot::services::api::{ApiService, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "time_manager_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Time Manager Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}",
        config.database_url, config.http_port
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db = Arc::new(db_manager);
    let store = EventStore::new(db.pool.clone());
    info!("Database initialized successfully");

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(store.clone(), config.webapp_url_base.clone());
    info!("Telegram bot initialized successfully");

    // Wire up the API: rate limiter in front, then signature verification,
    // then the store.
    let state = AppState {
        db: db.clone(),
        store,
        limiter: Arc::new(SlidingWindowLimiter::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )),
        authenticator: Arc::new(InitDataVerifier::new(&config.telegram_bot_token)),
    };
    let api = ApiService::new(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    info!("API server starting on port {}", config.http_port);

    // Run both the bot and the API server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let api_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, api.router).await {
            tracing::error!("API server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = api_task => {
            if let Err(e) = result {
                tracing::error!("API task error: {}", e);
            }
        }
    }

    info!("Application stopped");
    Ok(())
}
