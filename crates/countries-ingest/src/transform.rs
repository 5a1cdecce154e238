//! Flattening of merged country records into table rows
//!
//! [`transform_country`] is total: every field has a default, and a value of
//! an unexpected JSON type is treated as missing. Multi-valued fields are
//! joined with `", "` in the order the API returned them.
//!
//! | Column | Source | When missing |
//! |--------|--------|--------------|
//! | `country_name`, `official_name` | `name.common`, `name.official` | `None` |
//! | `native_names` | `name.nativeName.*.common` | `""` |
//! | `currency_codes` | keys of `currencies` | `""` |
//! | `currency_names`, `currency_symbols` | `currencies.*.name`, `currencies.*.symbol` | `""` |
//! | `idd_codes` | `idd.root` + each of `idd.suffixes` | `""` |
//! | `capitals` | `capital` | `"Unknown"` |
//! | `region`, `subregion` | same name | `None` |
//! | `languages` | values of `languages` | `""` |
//! | `area`, `population` | same name | `0` |
//! | `continents` | `continents` | `""` |
//! | `independent`, `un_member`, `start_of_week` | `independent`, `unMember`, `startOfWeek` | `None` |

use serde_json::{Map, Value};

use crate::models::{CountryRow, MergedCountryRecord};

/// Placeholder for a country that lists no capital
pub const UNKNOWN_CAPITAL: &str = "Unknown";

const SEPARATOR: &str = ", ";

/// Transform one merged record into a row of `public.countries`
pub fn transform_country(country: &MergedCountryRecord) -> CountryRow {
    let name = object(country, "name");
    let currencies = object(country, "currencies");

    CountryRow {
        country_name: string(name, "common"),
        official_name: string(name, "official"),
        native_names: join(
            object(name, "nativeName")
                .values()
                .map(|native| sub_field(native, "common")),
        ),
        currency_codes: join(currencies.keys().map(String::as_str)),
        currency_names: join(currencies.values().map(|c| sub_field(c, "name"))),
        currency_symbols: join(currencies.values().map(|c| sub_field(c, "symbol"))),
        idd_codes: idd_codes(object(country, "idd")),
        capitals: capitals(country),
        region: string(country, "region"),
        subregion: string(country, "subregion"),
        languages: join(object(country, "languages").values().filter_map(Value::as_str)),
        area: country.get("area").and_then(Value::as_f64).unwrap_or(0.0) as f32,
        population: country.get("population").and_then(integer).unwrap_or(0),
        continents: join(strings(country, "continents")),
        independent: country.get("independent").and_then(Value::as_bool),
        un_member: country.get("unMember").and_then(Value::as_bool),
        start_of_week: string(country, "startOfWeek"),
    }
}

/// Transform every merged record, preserving order
pub fn transform_all(countries: &[MergedCountryRecord]) -> Vec<CountryRow> {
    countries.iter().map(transform_country).collect()
}

/// Root concatenated with each suffix; empty unless at least one suffix exists
fn idd_codes(idd: &Map<String, Value>) -> String {
    let suffixes: Vec<&str> = strings(idd, "suffixes").collect();
    if suffixes.is_empty() {
        return String::new();
    }

    let root = idd.get("root").and_then(Value::as_str).unwrap_or("");
    suffixes
        .iter()
        .map(|suffix| format!("{}{}", root, suffix))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Joined capitals when the list is non-empty, otherwise the placeholder
fn capitals(country: &MergedCountryRecord) -> String {
    match country.get("capital") {
        Some(Value::Array(list)) if !list.is_empty() => {
            join(list.iter().filter_map(Value::as_str))
        },
        _ => UNKNOWN_CAPITAL.to_string(),
    }
}

fn empty_object() -> &'static Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

fn object<'a>(parent: &'a Map<String, Value>, key: &str) -> &'a Map<String, Value> {
    parent
        .get(key)
        .and_then(Value::as_object)
        .unwrap_or(empty_object())
}

fn string(parent: &Map<String, Value>, key: &str) -> Option<String> {
    parent.get(key).and_then(Value::as_str).map(str::to_string)
}

fn strings<'a>(parent: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a str> {
    parent
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// A string sub-field of a collection entry, `""` when the entry lacks it
fn sub_field<'a>(entry: &'a Value, key: &str) -> &'a str {
    entry.get(key).and_then(Value::as_str).unwrap_or("")
}

fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

fn join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(SEPARATOR)
}
