//! Countries Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads country reference data from the REST Countries API into the
//! `public.countries` table of a PostgreSQL database.
//!
//! # Pipeline
//!
//! - **fetch**: two requests with disjoint `fields` subsets
//! - **merge**: pair the partial records and combine them
//! - **transform**: flatten each record into a [`models::CountryRow`]
//! - **storage**: create the table if needed and bulk insert, skipping rows
//!   whose natural key is already present
//!
//! # Example
//!
//! ```no_run
//! use countries_ingest::{config::Config, pipeline::CountriesPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let result = CountriesPipeline::new(config).run().await?;
//!     println!("Inserted {} countries", result.load.submitted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod transform;

pub use error::{IngestError, Result};
