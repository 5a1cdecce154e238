//! Pipeline tests
//!
//! The fail-fast cases need only a mock API. The end-to-end cases also start
//! a PostgreSQL container and run serially.

mod common;

use anyhow::Result;
use common::{
    init_tracing, mount_fields, primary_response, secondary_response, start_database, test_config,
    unreachable_database, PRIMARY_FIELDS, SECONDARY_FIELDS,
};
use countries_ingest::pipeline::CountriesPipeline;
use countries_ingest::storage::CountryStorage;
use countries_ingest::IngestError;
use serde_json::json;
use serial_test::serial;
use tracing::info;
use wiremock::{MockServer, ResponseTemplate};

async fn healthy_api() -> MockServer {
    let server = MockServer::start().await;
    mount_fields(&server, PRIMARY_FIELDS, ResponseTemplate::new(200).set_body_json(primary_response())).await;
    mount_fields(&server, SECONDARY_FIELDS, ResponseTemplate::new(200).set_body_json(secondary_response())).await;
    server
}

#[tokio::test]
async fn test_fetch_failure_stops_before_connecting() {
    init_tracing();
    let server = MockServer::start().await;
    mount_fields(&server, PRIMARY_FIELDS, ResponseTemplate::new(200).set_body_json(primary_response())).await;
    mount_fields(&server, SECONDARY_FIELDS, ResponseTemplate::new(503)).await;

    // Any connection attempt against this database would surface as Connectivity
    let pipeline = CountriesPipeline::new(test_config(&server, unreachable_database()));
    let err = pipeline.run().await.unwrap_err();

    match err {
        IngestError::DataUnavailable { cause } => assert!(cause.is_some()),
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_response_is_distinguished_from_failure() {
    let server = MockServer::start().await;
    mount_fields(&server, PRIMARY_FIELDS, ResponseTemplate::new(200).set_body_json(json!([]))).await;
    mount_fields(&server, SECONDARY_FIELDS, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let pipeline = CountriesPipeline::new(test_config(&server, unreachable_database()));
    let err = pipeline.run().await.unwrap_err();

    assert!(err.is_empty_response(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_unreachable_database_is_connectivity_error() {
    let server = healthy_api().await;

    let pipeline = CountriesPipeline::new(test_config(&server, unreachable_database()));
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, IngestError::Connectivity(_)), "unexpected error: {err}");
}

#[tokio::test]
#[serial]
async fn test_pipeline_loads_countries() -> Result<()> {
    init_tracing();
    let db = start_database().await?;
    let server = healthy_api().await;

    let result = CountriesPipeline::new(test_config(&server, db.config.clone())).run().await?;

    info!(?result, "Pipeline finished");
    assert_eq!(result.fetched, 3);
    assert_eq!(result.load.submitted, 3);
    assert_eq!(result.load.inserted, 3);

    let rows = CountryStorage::new(db.pool.clone()).fetch_all().await?;
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].country_name.as_deref(), Some("Iceland"));
    assert_eq!(rows[0].idd_codes, "+354");
    assert_eq!(rows[0].population, 366425);

    assert_eq!(rows[1].country_name.as_deref(), Some("Aland"));
    assert_eq!(rows[1].capitals, "Unknown");
    assert_eq!(rows[1].subregion, None);
    assert_eq!(rows[1].area, 1580.0);

    assert_eq!(rows[2].languages, "Arabic, French");
    assert_eq!(rows[2].continents, "Africa");

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_rerun_reports_submitted_but_inserts_nothing() -> Result<()> {
    init_tracing();
    let db = start_database().await?;
    let server = healthy_api().await;

    let first = CountriesPipeline::new(test_config(&server, db.config.clone())).run().await?;
    let second = CountriesPipeline::new(test_config(&server, db.config.clone())).run().await?;

    assert_eq!(first.load.inserted, 3);
    // the reported count is rows attempted, not rows written
    assert_eq!(second.load.submitted, 3);
    assert_eq!(second.load.inserted, 0);
    assert_eq!(second.load.skipped(), 3);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM public.countries")
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(count, 3);

    Ok(())
}
