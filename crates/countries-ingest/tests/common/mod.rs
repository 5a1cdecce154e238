//! Shared helpers for integration tests

#![allow(dead_code)]

use anyhow::Result;
use countries_ingest::config::{ApiConfig, Config, DatabaseConfig};
use countries_ingest::models::CountryRow;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const API_PATH: &str = "/v3.1/all";
pub const PRIMARY_FIELDS: &str =
    "name,independent,unMember,startOfWeek,currencies,idd,capital,region,subregion,languages";
pub const SECONDARY_FIELDS: &str = "area,population,continents";

/// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,countries_ingest=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A PostgreSQL container with the settings needed to reach it
pub struct TestDatabase {
    // dropped last, stops the container
    _container: ContainerAsync<Postgres>,
    pub config: DatabaseConfig,
    pub pool: PgPool,
}

pub async fn start_database() -> Result<TestDatabase> {
    let container = Postgres::default().with_tag("16-alpine").start().await?;

    let host = container.get_host().await?.to_string();
    let port = container.get_host_port_ipv4(5432).await?;

    let config = DatabaseConfig {
        host,
        port,
        dbname: "postgres".to_string(),
        user: "postgres".to_string(),
        password: "postgres".to_string(),
        connect_timeout_secs: 30,
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(config.connect_options())
        .await?;

    Ok(TestDatabase {
        _container: container,
        config,
        pool,
    })
}

/// Database settings that can never connect
pub fn unreachable_database() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        connect_timeout_secs: 2,
        ..DatabaseConfig::default()
    }
}

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}{}", server.uri(), API_PATH),
        ..ApiConfig::default()
    }
}

pub fn test_config(server: &MockServer, database: DatabaseConfig) -> Config {
    Config {
        api: api_config(server),
        database,
    }
}

/// Mount a response for one field subset
pub async fn mount_fields(server: &MockServer, fields: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("fields", fields))
        .respond_with(response)
        .mount(server)
        .await;
}

/// First field subset for three countries
pub fn primary_response() -> Value {
    json!([
        {
            "name": {
                "common": "Iceland",
                "official": "Iceland",
                "nativeName": {"isl": {"official": "Ísland", "common": "Ísland"}}
            },
            "independent": true,
            "unMember": true,
            "startOfWeek": "monday",
            "currencies": {"ISK": {"name": "Icelandic króna", "symbol": "kr"}},
            "idd": {"root": "+3", "suffixes": ["54"]},
            "capital": ["Reykjavik"],
            "region": "Europe",
            "subregion": "Northern Europe",
            "languages": {"isl": "Icelandic"}
        },
        {
            "name": {"common": "Aland", "official": "Aland Islands"},
            "currencies": {},
            "idd": {},
            "capital": [],
            "region": "Europe"
        },
        {
            "name": {"common": "Chad", "official": "Republic of Chad"},
            "independent": true,
            "unMember": true,
            "startOfWeek": "monday",
            "currencies": {"XAF": {"name": "Central African CFA franc", "symbol": "Fr"}},
            "idd": {"root": "+2", "suffixes": ["35"]},
            "capital": ["N'Djamena"],
            "region": "Africa",
            "subregion": "Middle Africa",
            "languages": {"ara": "Arabic", "fra": "French"}
        }
    ])
}

/// Second field subset, in the same order as [`primary_response`]
pub fn secondary_response() -> Value {
    json!([
        {"area": 103000.0, "population": 366425, "continents": ["Europe"]},
        {"area": 1580.0, "population": 0, "continents": ["Europe"]},
        {"area": 1284000.0, "population": 16425859, "continents": ["Africa"]}
    ])
}

pub fn sample_row(name: &str, area: f32) -> CountryRow {
    CountryRow {
        country_name: Some(name.to_string()),
        official_name: Some(format!("Republic of {}", name)),
        native_names: name.to_string(),
        currency_codes: "EUR, USD".to_string(),
        currency_names: "Euro, United States dollar".to_string(),
        currency_symbols: "€, $".to_string(),
        idd_codes: "+1340, +1670".to_string(),
        capitals: "Unknown".to_string(),
        region: Some("Europe".to_string()),
        subregion: None,
        languages: "English".to_string(),
        area,
        population: 1_000_000,
        continents: "Europe".to_string(),
        independent: Some(false),
        un_member: None,
        start_of_week: Some("monday".to_string()),
    }
}
