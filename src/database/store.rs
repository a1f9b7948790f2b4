//! Per-user event storage.
//!
//! Every mutation is a single-row insert or delete, never a
//! read-modify-write of a user's whole event set, so concurrent requests
//! from the same user (double submissions included) cannot lose updates.
//! Atomicity is delegated entirely to the database; the store takes no
//! locks of its own.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use crate::database::models::{Event, EventId, User, UserUpsert};
use crate::utils::dates::CanonicalDate;

/// Store failures are transient from the caller's perspective: the
/// single-row mutations either applied fully or not at all, so a retry is
/// always safe. No retry is performed here; that belongs to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Looks up a user record, creating it if this is the user's first
    /// interaction. The tag tells callers whether a write happened.
    pub async fn get_or_create_user(&self, user_id: &str) -> Result<UserUpsert, StoreError> {
        let now = Utc::now().to_rfc3339();
        let inserted = sqlx::query("INSERT OR IGNORE INTO users (id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(&now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let user = sqlx::query_as::<_, User>("SELECT id, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        debug!(user_id, created = inserted == 1, "user lookup");
        Ok(if inserted == 1 {
            UserUpsert::Created(user)
        } else {
            UserUpsert::Existing(user)
        })
    }

    /// Stores a new event for `user_id` and returns its generated id.
    ///
    /// Identity and date are already validated by the time a request gets
    /// here, so the only failure mode is the database itself. A first-time
    /// user's record is created implicitly.
    pub async fn create_event(
        &self,
        user_id: &str,
        title: &str,
        date: &CanonicalDate,
    ) -> Result<EventId, StoreError> {
        let event_id = EventId::generate();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT OR IGNORE INTO users (id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "INSERT INTO events (user_id, id, title, date, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(event_id.as_str())
        .bind(title)
        .bind(date.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(user_id, event_id = %event_id, "event created");
        Ok(event_id)
    }

    /// Removes one event. Idempotent: deleting an id that does not exist
    /// (or was already deleted) is not an error.
    pub async fn delete_event(&self, user_id: &str, event_id: &EventId) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM events WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(event_id.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!(user_id, event_id = %event_id, deleted, "event delete");
        Ok(())
    }

    /// All events for a user, keyed by event id. Unknown users get an empty
    /// map. No iteration order is guaranteed.
    pub async fn list_events(&self, user_id: &str) -> Result<HashMap<EventId, Event>, StoreError> {
        let rows = sqlx::query_as::<_, Event>(
            "SELECT id, user_id, title, date, created_at FROM events WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|event| (EventId::new(event.id.clone()), event))
            .collect())
    }
}
