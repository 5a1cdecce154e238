//! Country data models

use serde_json::{Map, Value};

/// One object from a REST Countries response, holding one field subset
pub type RawCountryRecord = Map<String, Value>;

/// Union of the two partial records describing the same country
pub type MergedCountryRecord = Map<String, Value>;

/// A country flattened to the columns of `public.countries`
///
/// Field order matches the table's column order.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CountryRow {
    pub country_name: Option<String>,
    pub official_name: Option<String>,
    /// Common native names, comma separated
    pub native_names: String,
    pub currency_codes: String,
    pub currency_names: String,
    pub currency_symbols: String,
    /// International dialling codes, root and suffix concatenated
    pub idd_codes: String,
    /// Capital cities, or "Unknown" when the country lists none
    pub capitals: String,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub languages: String,
    /// Area in km², stored as `REAL`
    pub area: f32,
    pub population: i64,
    pub continents: String,
    pub independent: Option<bool>,
    pub un_member: Option<bool>,
    pub start_of_week: Option<String>,
}

/// Columns covered by the `unique_country_profile` constraint
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalKey<'a> {
    pub country_name: Option<&'a str>,
    pub official_name: Option<&'a str>,
    pub region: Option<&'a str>,
    pub area: f32,
    pub continents: &'a str,
}

impl CountryRow {
    /// Number of columns written per row
    pub const COLUMN_COUNT: usize = 17;

    /// The deduplication key of this row
    pub fn natural_key(&self) -> NaturalKey<'_> {
        NaturalKey {
            country_name: self.country_name.as_deref(),
            official_name: self.official_name.as_deref(),
            region: self.region.as_deref(),
            area: self.area,
            continents: &self.continents,
        }
    }
}
