//! # Time Manager Bot
//!
//! A Telegram bot plus web API for storing named dates ("events") and
//! showing countdowns to them.
//!
//! ## Features
//! - Dual-calendar date input: Gregorian or Jalali, any digit script,
//!   normalized to one canonical Gregorian form before anything is stored
//! - Signed web-app requests verified against Telegram's HMAC scheme
//! - Sliding-window rate limiting with bounded memory
//! - Per-user event storage with atomic single-row mutations (SQLite)

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and the event store
pub mod database;
/// Request authentication and rate limiting
pub mod security;
/// HTTP API for the web app
pub mod services;
/// Date normalization, calendar conversion, and input validation
pub mod utils;
