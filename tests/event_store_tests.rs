use anyhow::Result;
use tempfile::{tempdir, TempDir};

use time_manager_bot::database::connection::DatabaseManager;
use time_manager_bot::database::models::EventId;
use time_manager_bot::database::store::EventStore;
use time_manager_bot::utils::dates::normalize;

async fn setup_test_store() -> Result<(EventStore, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((EventStore::new(db_manager.pool.clone()), temp_dir))
}

#[tokio::test]
async fn test_event_lifecycle() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let date = normalize("2026.12.30").map_err(|e| anyhow::anyhow!(e))?;

    let event_id = store.create_event("u1", "Exam", &date).await?;
    assert!(event_id.as_str().starts_with("evt_"));

    let events = store.list_events("u1").await?;
    assert_eq!(events.len(), 1);
    let event = events.get(&event_id).map(Clone::clone);
    let event = event.ok_or_else(|| anyhow::anyhow!("created event not listed"))?;
    assert_eq!(event.title, "Exam");
    assert_eq!(event.date, "30.12.2026");

    store.delete_event("u1", &event_id).await?;
    assert!(store.list_events("u1").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_delete_is_idempotent() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let date = normalize("2026.12.30").map_err(|e| anyhow::anyhow!(e))?;

    let event_id = store.create_event("u1", "Exam", &date).await?;
    store.delete_event("u1", &event_id).await?;
    // Second delete of the same id is not an error.
    store.delete_event("u1", &event_id).await?;
    assert!(store.list_events("u1").await?.is_empty());

    // Deleting an id that never existed is also fine.
    store
        .delete_event("u1", &EventId::new("evt_00000000"))
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_unknown_user_lists_empty() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    assert!(store.list_events("nobody").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_creates_both_land() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let date_a = normalize("2026.12.30").map_err(|e| anyhow::anyhow!(e))?;
    let date_b = normalize("1405.10.20").map_err(|e| anyhow::anyhow!(e))?;

    let store_a = store.clone();
    let store_b = store.clone();
    let (id_a, id_b) = tokio::join!(
        store_a.create_event("u1", "Exam", &date_a),
        store_b.create_event("u1", "Trip", &date_b),
    );
    let (id_a, id_b) = (id_a?, id_b?);
    assert_ne!(id_a, id_b);

    let events = store.list_events("u1").await?;
    assert_eq!(events.len(), 2);
    assert!(events.contains_key(&id_a));
    assert!(events.contains_key(&id_b));

    Ok(())
}

#[tokio::test]
async fn test_concurrent_add_and_delete_of_different_ids() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let date = normalize("2026.12.30").map_err(|e| anyhow::anyhow!(e))?;

    let existing = store.create_event("u1", "Old", &date).await?;

    let store_a = store.clone();
    let store_b = store.clone();
    let existing_clone = existing.clone();
    let (created, deleted) = tokio::join!(
        store_a.create_event("u1", "New", &date),
        store_b.delete_event("u1", &existing_clone),
    );
    let created = created?;
    deleted?;

    let events = store.list_events("u1").await?;
    assert_eq!(events.len(), 1);
    assert!(events.contains_key(&created));
    assert!(!events.contains_key(&existing));

    Ok(())
}

#[tokio::test]
async fn test_get_or_create_user_tagging() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;

    let first = store.get_or_create_user("u1").await?;
    assert!(first.was_created());
    assert_eq!(first.record().id, "u1");

    let second = store.get_or_create_user("u1").await?;
    assert!(!second.was_created());
    assert_eq!(second.record().created_at, first.record().created_at);

    Ok(())
}

#[tokio::test]
async fn test_create_implicitly_registers_user() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let date = normalize("2026.12.30").map_err(|e| anyhow::anyhow!(e))?;

    store.create_event("fresh-user", "Exam", &date).await?;

    // The user record now exists, so the lookup reports Existing.
    let upsert = store.get_or_create_user("fresh-user").await?;
    assert!(!upsert.was_created());

    Ok(())
}

#[tokio::test]
async fn test_users_do_not_see_each_others_events() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let date = normalize("2026.12.30").map_err(|e| anyhow::anyhow!(e))?;

    let id_a = store.create_event("u1", "Mine", &date).await?;
    store.create_event("u2", "Theirs", &date).await?;

    let events = store.list_events("u1").await?;
    assert_eq!(events.len(), 1);
    assert!(events.contains_key(&id_a));

    // Deleting with the wrong owner is a no-op.
    store.delete_event("u2", &id_a).await?;
    assert_eq!(store.list_events("u1").await?.len(), 1);

    Ok(())
}
