use anyhow::{anyhow, Result};

/// Validates a user-supplied event title and returns it trimmed.
///
/// Titles are stored as-is beyond trimming; only length and emptiness are
/// enforced here.
pub fn validate_event_title(title: &str) -> Result<String> {
    let title = title.trim();

    if title.is_empty() {
        return Err(anyhow!("Title cannot be empty"));
    }

    if title.chars().count() > 100 {
        return Err(anyhow!("Title cannot be longer than 100 characters"));
    }

    Ok(title.to_string())
}

/// Validates an event key as received on the delete endpoint.
///
/// Keys are generated server-side (`evt_` plus a hex suffix), so anything
/// outside that shape is rejected before touching the store.
pub fn validate_event_key(key: &str) -> Result<()> {
    let key = key.trim();

    if key.is_empty() {
        return Err(anyhow!("Event key cannot be empty"));
    }

    if key.len() > 50 {
        return Err(anyhow!("Event key cannot be longer than 50 characters"));
    }

    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(anyhow!("Event key contains invalid characters"));
    }

    Ok(())
}
