//! Configuration management
//!
//! Settings come from the environment (optionally seeded from a `.env` file)
//! with the defaults below. Every database option can be overridden on its
//! own.

use std::time::Duration;

use countries_common::{CountriesError, Result};
use sqlx::postgres::PgConnectOptions;

use crate::merge::MergeStrategy;

// ============================================================================
// API Configuration Constants
// ============================================================================

/// REST Countries endpoint returning every country.
pub const DEFAULT_API_URL: &str = "https://restcountries.com/v3.1/all";

/// First field subset. The API rejects overly long `fields` lists, so the
/// wanted fields are split across two requests.
pub const DEFAULT_PRIMARY_FIELDS: &str =
    "name,independent,unMember,startOfWeek,currencies,idd,capital,region,subregion,languages";

/// Second field subset, disjoint from the first.
pub const DEFAULT_SECONDARY_FIELDS: &str = "area,population,continents";

// ============================================================================
// Database Configuration Constants
// ============================================================================

pub const DEFAULT_DATABASE_HOST: &str = "localhost";
pub const DEFAULT_DATABASE_PORT: u16 = 5432;
pub const DEFAULT_DATABASE_NAME: &str = "countries_db";
pub const DEFAULT_DATABASE_USER: &str = "postgres";
pub const DEFAULT_DATABASE_PASSWORD: &str = "postgres";

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Ingestion configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
}

/// Remote API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub primary_fields: Vec<String>,
    pub secondary_fields: Vec<String>,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    pub merge_strategy: MergeStrategy,
}

/// PostgreSQL connection configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub connect_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            api: ApiConfig {
                base_url: lookup("COUNTRIES_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                primary_fields: split_fields(
                    &lookup("COUNTRIES_FIELDS_PRIMARY")
                        .unwrap_or_else(|| DEFAULT_PRIMARY_FIELDS.to_string()),
                ),
                secondary_fields: split_fields(
                    &lookup("COUNTRIES_FIELDS_SECONDARY")
                        .unwrap_or_else(|| DEFAULT_SECONDARY_FIELDS.to_string()),
                ),
                timeout_secs: parse_var(&lookup, "COUNTRIES_API_TIMEOUT_SECS")?,
                merge_strategy: lookup("COUNTRIES_MERGE_STRATEGY")
                    .map(|s| s.parse::<MergeStrategy>())
                    .transpose()?
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                host: lookup("PGHOST").unwrap_or_else(|| DEFAULT_DATABASE_HOST.to_string()),
                port: parse_var(&lookup, "PGPORT")?.unwrap_or(DEFAULT_DATABASE_PORT),
                dbname: lookup("PGDATABASE").unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
                user: lookup("PGUSER").unwrap_or_else(|| DEFAULT_DATABASE_USER.to_string()),
                password: lookup("PGPASSWORD")
                    .unwrap_or_else(|| DEFAULT_DATABASE_PASSWORD.to_string()),
                connect_timeout_secs: parse_var(&lookup, "DATABASE_CONNECT_TIMEOUT")?
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(CountriesError::config("API URL cannot be empty"));
        }

        if self.api.primary_fields.is_empty() || self.api.secondary_fields.is_empty() {
            return Err(CountriesError::config("Both API field subsets must name at least one field"));
        }

        if self.database.port == 0 {
            return Err(CountriesError::config("Database port must be greater than 0"));
        }

        if self.database.dbname.is_empty() {
            return Err(CountriesError::config("Database name cannot be empty"));
        }

        if self.database.user.is_empty() {
            return Err(CountriesError::config("Database user cannot be empty"));
        }

        Ok(())
    }
}

impl ApiConfig {
    /// `fields` query values for the two requests
    ///
    /// A key-based merge needs the key in both responses, so it is appended
    /// to either subset that lacks it.
    pub fn field_subsets(&self) -> (String, String) {
        let with_key = |fields: &[String]| {
            let mut fields = fields.to_vec();
            if let MergeStrategy::ByKey(key) = &self.merge_strategy {
                if !fields.iter().any(|f| f == key) {
                    fields.push(key.clone());
                }
            }
            fields.join(",")
        };

        (with_key(&self.primary_fields), with_key(&self.secondary_fields))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            primary_fields: split_fields(DEFAULT_PRIMARY_FIELDS),
            secondary_fields: split_fields(DEFAULT_SECONDARY_FIELDS),
            timeout_secs: None,
            merge_strategy: MergeStrategy::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user)
            .password(&self.password)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DATABASE_HOST.to_string(),
            port: DEFAULT_DATABASE_PORT,
            dbname: DEFAULT_DATABASE_NAME.to_string(),
            user: DEFAULT_DATABASE_USER.to_string(),
            password: DEFAULT_DATABASE_PASSWORD.to_string(),
            connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
        }
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| CountriesError::config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
