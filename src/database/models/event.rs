use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Identifier of a stored event, unique within the owning user's event map.
///
/// Ids are generated once at creation and never reused; deleting and
/// re-adding an event produces a fresh id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Fresh collision-resistant id: `evt_` plus 8 random hex characters.
    pub(crate) fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("evt_{}", &hex[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored date. `date` is always the canonical Gregorian `DD.MM.YYYY`
/// form regardless of the calendar the user typed in; no Jalali date is
/// ever persisted. There is no update operation: edits are delete+add.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub date: String,
    pub created_at: String,
}
