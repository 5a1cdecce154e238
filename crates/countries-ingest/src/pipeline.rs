//! Country ingestion pipeline
//!
//! Runs the job end to end: fetch both partial responses, merge, flatten,
//! load. Each step either succeeds or aborts the run.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::{Config, DatabaseConfig};
use crate::error::{IngestError, Result};
use crate::fetch::CountriesClient;
use crate::models::MergedCountryRecord;
use crate::storage::{CountryStorage, LoadStats};
use crate::transform::transform_all;

/// Statistics about one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineResult {
    /// Merged country records received from the API
    pub fetched: usize,
    pub load: LoadStats,
}

/// Country ingestion pipeline
pub struct CountriesPipeline {
    config: Config,
}

impl CountriesPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full ingestion pipeline
    ///
    /// Steps:
    /// 1. Fetch and merge both partial responses
    /// 2. Stop with [`IngestError::DataUnavailable`] if nothing came back
    /// 3. Connect to PostgreSQL
    /// 4. Ensure the table, transform and insert every record, commit
    ///
    /// The connection pool is closed whether or not step 4 succeeds.
    pub async fn run(&self) -> Result<PipelineResult> {
        info!("Phase 1: Fetching country data");
        let countries = self.fetch().await?;

        info!("Phase 2: Connecting to database");
        let pool = connect(&self.config.database).await?;
        info!(
            host = %self.config.database.host,
            database = %self.config.database.dbname,
            "Connected to database"
        );

        info!("Phase 3: Loading countries");
        let loaded = load(&pool, &countries).await;

        pool.close().await;
        info!("Database connection closed");

        Ok(PipelineResult {
            fetched: countries.len(),
            load: loaded?,
        })
    }

    async fn fetch(&self) -> Result<Vec<MergedCountryRecord>> {
        let client = CountriesClient::new(&self.config.api)
            .map_err(|e| IngestError::DataUnavailable { cause: Some(e) })?;

        let countries = client
            .fetch_country_data()
            .await
            .map_err(|e| IngestError::DataUnavailable { cause: Some(e) })?;

        if countries.is_empty() {
            return Err(IngestError::DataUnavailable { cause: None });
        }

        info!(count = countries.len(), "Fetched country data");
        Ok(countries)
    }
}

/// Open a single-connection pool to the configured database
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(config.connect_timeout())
        .connect_with(config.connect_options())
        .await
        .map_err(IngestError::Connectivity)
}

async fn load(pool: &PgPool, countries: &[MergedCountryRecord]) -> Result<LoadStats> {
    let rows = transform_all(countries);
    let stats = CountryStorage::new(pool.clone()).load(&rows).await?;
    Ok(stats)
}
