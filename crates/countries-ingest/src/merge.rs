//! Merging of the two partial API responses
//!
//! The API is queried twice with disjoint field subsets; each pair of partial
//! records describing one country is combined into a single record. When a
//! key appears in both, the value from the second record wins.

use std::collections::HashMap;

use countries_common::CountriesError;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{MergedCountryRecord, RawCountryRecord};

/// How partial records from the two responses are paired
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Pair by index. Assumes both responses list countries in the same
    /// order; nothing checks that they do.
    #[default]
    Positional,
    /// Pair by the value of a top-level field present in both responses
    ByKey(String),
}

impl MergeStrategy {
    pub fn merge(
        &self,
        primary: Vec<RawCountryRecord>,
        secondary: Vec<RawCountryRecord>,
    ) -> Vec<MergedCountryRecord> {
        match self {
            MergeStrategy::Positional => merge_positional(primary, secondary),
            MergeStrategy::ByKey(key) => merge_by_key(primary, secondary, key),
        }
    }
}

impl std::str::FromStr for MergeStrategy {
    type Err = CountriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("positional") {
            return Ok(MergeStrategy::Positional);
        }

        match s.split_once(':') {
            Some((kind, key)) if kind.eq_ignore_ascii_case("key") && !key.trim().is_empty() => {
                Ok(MergeStrategy::ByKey(key.trim().to_string()))
            },
            _ => Err(CountriesError::parse(format!(
                "Invalid merge strategy '{}': expected 'positional' or 'key:<field>'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStrategy::Positional => write!(f, "positional"),
            MergeStrategy::ByKey(key) => write!(f, "key:{}", key),
        }
    }
}

/// Pair records at the same index and merge each pair
///
/// Output length is the shorter input's length; trailing records of the
/// longer list are dropped.
pub fn merge_positional(
    primary: Vec<RawCountryRecord>,
    secondary: Vec<RawCountryRecord>,
) -> Vec<MergedCountryRecord> {
    if primary.len() != secondary.len() {
        warn!(
            primary = primary.len(),
            secondary = secondary.len(),
            "Partial responses differ in length, unmatched records are dropped"
        );
    }

    primary
        .into_iter()
        .zip(secondary)
        .map(|(first, second)| merge_pair(first, second))
        .collect()
}

/// Pair records sharing the same value for `key` and merge each pair
///
/// Output follows the primary list's order. Primary records without a
/// partner (or without the key) are dropped.
pub fn merge_by_key(
    primary: Vec<RawCountryRecord>,
    secondary: Vec<RawCountryRecord>,
    key: &str,
) -> Vec<MergedCountryRecord> {
    let mut by_key: HashMap<String, RawCountryRecord> = secondary
        .into_iter()
        .filter_map(|record| key_of(&record, key).map(|k| (k, record)))
        .collect();

    let total = primary.len();
    let merged: Vec<_> = primary
        .into_iter()
        .filter_map(|record| {
            let partner = key_of(&record, key).and_then(|k| by_key.remove(&k))?;
            Some(merge_pair(record, partner))
        })
        .collect();

    if merged.len() < total {
        warn!(
            key = key,
            matched = merged.len(),
            total = total,
            "Some records had no partner and were dropped"
        );
    }

    merged
}

/// Shallow union of two records, `second` winning on key collision
pub fn merge_pair(mut first: RawCountryRecord, second: RawCountryRecord) -> MergedCountryRecord {
    for (field, value) in second {
        if first.contains_key(&field) {
            debug!(field = %field, "Field present in both partial records, keeping second");
        }
        first.insert(field, value);
    }
    first
}

fn key_of(record: &RawCountryRecord, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
