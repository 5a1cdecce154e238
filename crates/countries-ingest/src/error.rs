//! Error types for the ingestion pipeline
//!
//! Each variant marks the step at which a run stopped. No step is retried.

use countries_common::CountriesError;
use thiserror::Error;

use crate::fetch::FetchError;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The API produced no countries, either because a request failed
    /// (`cause` is set) or because it legitimately returned none
    #[error("No country data returned from API. Cannot proceed.{}", describe_cause(.cause))]
    DataUnavailable {
        #[source]
        cause: Option<FetchError>,
    },

    /// The database could not be reached
    #[error("Failed to connect to PostgreSQL. Check your credentials or server status.")]
    Connectivity(#[source] sqlx::Error),

    /// Schema creation, insert or commit failed
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Config(#[from] CountriesError),
}

impl IngestError {
    /// True when the API was reachable but returned an empty list
    pub fn is_empty_response(&self) -> bool {
        matches!(self, IngestError::DataUnavailable { cause: None })
    }
}

// A fetch failure is reported through `source()`, so only the empty case
// adds text here.
fn describe_cause(cause: &Option<FetchError>) -> &'static str {
    match cause {
        Some(_) => "",
        None => " The API returned an empty list.",
    }
}
