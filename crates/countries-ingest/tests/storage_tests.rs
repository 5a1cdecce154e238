//! Storage tests against a PostgreSQL container

mod common;

use anyhow::Result;
use common::{init_tracing, sample_row, start_database};
use countries_ingest::storage::CountryStorage;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_ensure_schema_is_idempotent() -> Result<()> {
    init_tracing();
    let db = start_database().await?;
    let storage = CountryStorage::new(db.pool.clone());

    storage.ensure_schema().await?;
    storage.ensure_schema().await?;

    let constraint: Option<String> = sqlx::query_scalar(
        "SELECT conname::text FROM pg_constraint WHERE conname = 'unique_country_profile'",
    )
    .fetch_optional(&db.pool)
    .await?;
    assert_eq!(constraint.as_deref(), Some("unique_country_profile"));

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_rows_round_trip() -> Result<()> {
    init_tracing();
    let db = start_database().await?;
    let storage = CountryStorage::new(db.pool.clone());

    let mut rows = vec![sample_row("Atlantis", 120.5), sample_row("Lemuria", 80.0)];
    rows[1].country_name = None;
    rows[1].independent = None;
    rows[1].start_of_week = None;

    let stats = storage.load(&rows).await?;
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.inserted, 2);

    assert_eq!(storage.fetch_all().await?, rows);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_second_load_is_noop_for_existing_keys() -> Result<()> {
    init_tracing();
    let db = start_database().await?;
    let storage = CountryStorage::new(db.pool.clone());

    let rows = vec![sample_row("Atlantis", 120.5), sample_row("Lemuria", 80.0)];
    storage.load(&rows).await?;

    // same natural key, different non-key columns: first write wins
    let mut changed = rows[0].clone();
    changed.population = 42;
    changed.capitals = "Poseidonia".to_string();
    let new_row = sample_row("Mu", 10.0);

    let stats = storage.load(&[changed, new_row.clone()]).await?;
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.inserted, 1);

    let stored = storage.fetch_all().await?;
    assert_eq!(stored, vec![rows[0].clone(), rows[1].clone(), new_row]);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_duplicates_within_one_load_keep_first() -> Result<()> {
    init_tracing();
    let db = start_database().await?;
    let storage = CountryStorage::new(db.pool.clone()).with_chunk_size(2);

    let first = sample_row("Atlantis", 120.5);
    let mut duplicate = first.clone();
    duplicate.languages = "Atlantean".to_string();
    // different area means a different natural key
    let other = sample_row("Atlantis", 121.0);

    let stats = storage
        .load(&[first.clone(), duplicate, other.clone(), sample_row("Mu", 10.0)])
        .await?;
    assert_eq!(stats.submitted, 4);
    assert_eq!(stats.inserted, 3);

    let stored = storage.fetch_all().await?;
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0], first);
    assert_eq!(stored[1], other);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_insert_rows_without_rows() -> Result<()> {
    let db = start_database().await?;
    let storage = CountryStorage::new(db.pool.clone());

    storage.ensure_schema().await?;
    let stats = storage.insert_rows(&[]).await?;

    assert_eq!(stats.submitted, 0);
    assert_eq!(stats.inserted, 0);
    assert!(storage.fetch_all().await?.is_empty());

    Ok(())
}
