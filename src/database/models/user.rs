use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One end-user identity, keyed by the opaque numeric id Telegram assigns.
/// Created lazily on first interaction and never deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub created_at: String,
}

/// Outcome of a get-or-create lookup, tagged so callers can tell whether
/// the read had a write side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserUpsert {
    Existing(User),
    Created(User),
}

impl UserUpsert {
    pub fn record(&self) -> &User {
        match self {
            UserUpsert::Existing(user) | UserUpsert::Created(user) => user,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, UserUpsert::Created(_))
    }
}
