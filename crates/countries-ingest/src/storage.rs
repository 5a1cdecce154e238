//! Storage layer for country rows
//!
//! Rows land in `public.countries`. The `unique_country_profile` constraint
//! deduplicates on the natural key; a row whose key already exists is
//! skipped, never updated, so the first write wins across runs.

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info};

use crate::models::CountryRow;

/// PostgreSQL accepts at most this many bind parameters per statement
const MAX_BIND_PARAMS: usize = 65_535;

/// Rows per INSERT statement
pub const DEFAULT_CHUNK_SIZE: usize = MAX_BIND_PARAMS / CountryRow::COLUMN_COUNT;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS public.countries (
        id SERIAL PRIMARY KEY,
        country_name TEXT,
        official_name TEXT,
        native_names TEXT,
        currency_codes TEXT,
        currency_names TEXT,
        currency_symbols TEXT,
        idd_codes TEXT,
        capitals TEXT,
        region TEXT,
        subregion TEXT,
        languages TEXT,
        area REAL,
        population BIGINT,
        continents TEXT,
        independent BOOLEAN,
        un_member BOOLEAN,
        start_of_week TEXT,
        CONSTRAINT unique_country_profile UNIQUE (
            country_name,
            official_name,
            region,
            area,
            continents
        )
    )
"#;

const INSERT_PREFIX_SQL: &str = r#"
    INSERT INTO public.countries (
        country_name, official_name, native_names,
        currency_codes, currency_names, currency_symbols,
        idd_codes, capitals, region, subregion, languages,
        area, population, continents,
        independent, un_member, start_of_week
    )
"#;

const SELECT_ALL_SQL: &str = r#"
    SELECT
        country_name, official_name, native_names,
        currency_codes, currency_names, currency_symbols,
        idd_codes, capitals, region, subregion, languages,
        area, population, continents,
        independent, un_member, start_of_week
    FROM public.countries
    ORDER BY id
"#;

/// Outcome of one load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// Rows sent to the database
    pub submitted: usize,
    /// Rows actually written; conflicting rows are not counted
    pub inserted: u64,
}

impl LoadStats {
    /// Rows dropped by the uniqueness constraint
    pub fn skipped(&self) -> u64 {
        (self.submitted as u64).saturating_sub(self.inserted)
    }
}

/// Storage handler for `public.countries`
pub struct CountryStorage {
    db: PgPool,
    chunk_size: usize,
}

impl CountryStorage {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the number of rows per INSERT statement (clamped to 1..=DEFAULT_CHUNK_SIZE)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, DEFAULT_CHUNK_SIZE);
        self
    }

    /// Ensure the schema and insert every row in one transaction
    ///
    /// Nothing is persisted unless every statement succeeds; the transaction
    /// rolls back when dropped uncommitted.
    pub async fn load(&self, rows: &[CountryRow]) -> Result<LoadStats, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        ensure_schema_tx(&mut tx).await?;
        let stats = self.insert_rows_tx(&mut tx, rows).await?;

        tx.commit().await?;

        info!(
            submitted = stats.submitted,
            inserted = stats.inserted,
            skipped = stats.skipped(),
            "Committed country rows"
        );

        Ok(stats)
    }

    /// Create `public.countries` and its uniqueness constraint if absent
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;
        ensure_schema_tx(&mut tx).await?;
        tx.commit().await
    }

    /// Insert rows, skipping any whose natural key already exists
    pub async fn insert_rows(&self, rows: &[CountryRow]) -> Result<LoadStats, sqlx::Error> {
        let mut tx = self.db.begin().await?;
        let stats = self.insert_rows_tx(&mut tx, rows).await?;
        tx.commit().await?;
        Ok(stats)
    }

    /// Read every stored row back in insertion order
    pub async fn fetch_all(&self) -> Result<Vec<CountryRow>, sqlx::Error> {
        sqlx::query_as::<_, CountryRow>(SELECT_ALL_SQL)
            .fetch_all(&self.db)
            .await
    }

    async fn insert_rows_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rows: &[CountryRow],
    ) -> Result<LoadStats, sqlx::Error> {
        let mut stats = LoadStats::default();
        if rows.is_empty() {
            return Ok(stats);
        }

        let total_chunks = rows.len().div_ceil(self.chunk_size);

        for (chunk_idx, chunk) in rows.chunks(self.chunk_size).enumerate() {
            debug!(
                "Inserting countries chunk {} / {} ({} rows)",
                chunk_idx + 1,
                total_chunks,
                chunk.len()
            );

            let result = insert_chunk(tx, chunk).await?;
            stats.submitted += chunk.len();
            stats.inserted += result;
        }

        info!("Inserted {} countries", stats.submitted);

        Ok(stats)
    }
}

async fn ensure_schema_tx(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_TABLE_SQL).execute(&mut **tx).await?;
    info!("Table 'countries' ready with uniqueness constraint");
    Ok(())
}

async fn insert_chunk(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[CountryRow],
) -> Result<u64, sqlx::Error> {
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(INSERT_PREFIX_SQL);

    query_builder.push_values(rows, |mut b, row| {
        b.push_bind(&row.country_name)
            .push_bind(&row.official_name)
            .push_bind(&row.native_names)
            .push_bind(&row.currency_codes)
            .push_bind(&row.currency_names)
            .push_bind(&row.currency_symbols)
            .push_bind(&row.idd_codes)
            .push_bind(&row.capitals)
            .push_bind(&row.region)
            .push_bind(&row.subregion)
            .push_bind(&row.languages)
            .push_bind(row.area)
            .push_bind(row.population)
            .push_bind(&row.continents)
            .push_bind(row.independent)
            .push_bind(row.un_member)
            .push_bind(&row.start_of_week);
    });

    query_builder.push(" ON CONFLICT ON CONSTRAINT unique_country_profile DO NOTHING");

    let result = query_builder.build().execute(&mut **tx).await?;
    Ok(result.rows_affected())
}
