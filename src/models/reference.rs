//! Static lookup tables: region reference data, localized month names and
//! feed population corrections.
//!
//! All of these can be replaced through configuration; the defaults match
//! the German-language wiki page and the ECDC feed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reference data for one administrative region.
///
/// `region` uses the normalized spelling produced by the tidy step
/// (no internal whitespace, no dashes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRef {
    pub region: String,
    pub code: String,
    pub population: i64,
}

impl RegionRef {
    pub fn new(region: &str, code: &str, population: i64) -> Self {
        Self {
            region: region.to_string(),
            code: code.to_string(),
            population,
        }
    }
}

const GERMAN_STATES: &[(&str, &str, i64)] = &[
    ("NordrheinWestfalen", "NW", 17_933_000),
    ("Bayern", "BY", 13_077_000),
    ("BadenWürttemberg", "BW", 11_070_000),
    ("Niedersachsen", "NI", 7_982_000),
    ("Hessen", "HE", 6_266_000),
    ("RheinlandPfalz", "RP", 4_085_000),
    ("Sachsen", "SN", 4_078_000),
    ("Berlin", "BE", 3_645_000),
    ("SchleswigHolstein", "SH", 2_897_000),
    ("Brandenburg", "BB", 2_512_000),
    ("SachsenAnhalt", "ST", 2_208_000),
    ("Thüringen", "TH", 2_143_000),
    ("Hamburg", "HH", 1_841_000),
    ("MecklenburgVorpommern", "MV", 1_610_000),
    ("Saarland", "SL", 991_000),
    ("Bremen", "HB", 683_000),
];

/// The 16 German federal states.
pub fn default_regions() -> Vec<RegionRef> {
    GERMAN_STATES
        .iter()
        .map(|(region, code, population)| RegionRef::new(region, code, *population))
        .collect()
}

/// Region names on the page that differ from the reference spelling.
/// Applied before whitespace is stripped.
pub fn default_region_aliases() -> HashMap<String, String> {
    HashMap::from([("Freie Hansestadt Bremen".to_string(), "Bremen".to_string())])
}

/// Population corrections by feed `code`, for territories whose published
/// figure is wrong or missing.
pub const POPULATION_OVERRIDES: &[(&str, i64)] = &[
    ("AI", 15_094),
    ("ER", 4_475_000),
    ("FK", 2_840),
    ("BQ", 25_157),
    ("BLM", 9_131),
    ("CZ", 10_650_000),
    ("SH", 5_633),
    ("EH", 500_000),
    ("JPG11668", 0),
];

const GERMAN_MONTHS: [&[&str]; 12] = [
    &["Jan", "Jän"],
    &["Feb"],
    &["Mär"],
    &["Apr"],
    &["Mai"],
    &["Juni", "Jun"],
    &["Juli", "Jul"],
    &["Aug"],
    &["Sep"],
    &["Okt"],
    &["Nov"],
    &["Dez"],
];

/// Month-name to month-number table for the page's language.
///
/// Entry `i` lists every token accepted for month `i + 1`. Matching is
/// exact; a token in no entry is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthTable(Vec<Vec<String>>);

impl MonthTable {
    /// Build a table from 12 token lists. Returns `None` for any other length.
    pub fn new(months: Vec<Vec<String>>) -> Option<Self> {
        (months.len() == 12).then_some(Self(months))
    }

    /// Month number (1-12) for a token.
    pub fn lookup(&self, token: &str) -> Option<u32> {
        self.0
            .iter()
            .position(|tokens| tokens.iter().any(|t| t == token))
            .map(|i| i as u32 + 1)
    }

    /// Every accepted token with its month number.
    pub fn tokens(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().enumerate().flat_map(|(i, tokens)| {
            tokens.iter().map(move |t| (t.as_str(), i as u32 + 1))
        })
    }

    pub fn is_valid(&self) -> bool {
        self.0.len() == 12
    }
}

impl Default for MonthTable {
    fn default() -> Self {
        Self(
            GERMAN_MONTHS
                .iter()
                .map(|tokens| tokens.iter().map(|t| t.to_string()).collect())
                .collect(),
        )
    }
}
