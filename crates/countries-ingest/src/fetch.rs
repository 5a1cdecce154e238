//! REST Countries API client
//!
//! The API limits how many fields one request may select, so the data is
//! fetched as two partial responses and merged afterwards. Both requests
//! must succeed; there is no partial success.

use futures::try_join;
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::merge::MergeStrategy;
use crate::models::{MergedCountryRecord, RawCountryRecord};

/// Why a fetch produced no data
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Request for fields '{fields}' failed")]
    Request {
        fields: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response for fields '{fields}' is not a list of country objects")]
    Decode {
        fields: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Client for the two-part country query
pub struct CountriesClient {
    client: Client,
    base_url: String,
    primary_fields: String,
    secondary_fields: String,
    strategy: MergeStrategy,
}

impl CountriesClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;

        let (primary_fields, secondary_fields) = config.field_subsets();

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            primary_fields,
            secondary_fields,
            strategy: config.merge_strategy.clone(),
        })
    }

    /// Fetch one field subset as a list of records
    pub async fn fetch_partial(&self, fields: &str) -> Result<Vec<RawCountryRecord>, FetchError> {
        info!(url = %self.base_url, fields = %fields, "Requesting country data");

        let request_error = |source| FetchError::Request {
            fields: fields.to_string(),
            source,
        };

        let body = self
            .client
            .get(&self.base_url)
            .query(&[("fields", fields)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(request_error)?
            .bytes()
            .await
            .map_err(request_error)?;

        let records: Vec<RawCountryRecord> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                fields: fields.to_string(),
                source,
            })?;

        info!(fields = %fields, count = records.len(), "Received country records");
        Ok(records)
    }

    /// Fetch both field subsets
    ///
    /// The requests run concurrently; if either fails the whole fetch fails.
    pub async fn fetch_partials(
        &self,
    ) -> Result<(Vec<RawCountryRecord>, Vec<RawCountryRecord>), FetchError> {
        try_join!(
            self.fetch_partial(&self.primary_fields),
            self.fetch_partial(&self.secondary_fields)
        )
    }

    /// Fetch both field subsets and merge them into one record per country
    pub async fn fetch_country_data(&self) -> Result<Vec<MergedCountryRecord>, FetchError> {
        let (primary, secondary) = self.fetch_partials().await.inspect_err(|e| {
            error!(error = ?e, "Failed to fetch country data");
        })?;

        let merged = self.strategy.merge(primary, secondary);
        info!(count = merged.len(), strategy = %self.strategy, "Merged country records");

        Ok(merged)
    }
}
