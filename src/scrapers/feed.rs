//! JSON feed of per-country daily case/death records.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{HttpClient, ScrapeError};
use crate::models::{FeedRecord, FeedTable, POPULATION_OVERRIDES};

/// Top-level feed document.
#[derive(Debug, Deserialize)]
struct FeedDocument {
    records: Vec<Value>,
}

/// A feed record as published. Accepts both the upstream field names and
/// the serving names. Numeric fields are kept raw until coercion.
#[derive(Debug, Deserialize)]
struct RawFeedRecord {
    #[serde(alias = "dateRep")]
    date: String,
    #[serde(default)]
    day: Value,
    #[serde(default)]
    month: Value,
    #[serde(default)]
    year: Value,
    #[serde(default)]
    cases: Value,
    #[serde(default)]
    deaths: Value,
    #[serde(alias = "countriesAndTerritories")]
    country: String,
    #[serde(default, alias = "geoId")]
    code: Option<String>,
    #[serde(default, alias = "popData2019")]
    population: Value,
    #[serde(default, alias = "continentExp")]
    continent: Option<String>,
}

/// Fetch the feed and build the cumulative table.
pub async fn load_feed(client: &HttpClient, url: &str) -> Result<FeedTable, ScrapeError> {
    let document: FeedDocument = client.get_json(url).await?;
    build_table(document)
}

/// Parse a feed document into a sorted table with running totals.
pub fn parse_feed(body: &str) -> Result<FeedTable, ScrapeError> {
    build_table(serde_json::from_str(body)?)
}

fn build_table(document: FeedDocument) -> Result<FeedTable, ScrapeError> {
    debug!("Feed returned {} records", document.records.len());

    let records = document
        .records
        .into_iter()
        .enumerate()
        .map(|(index, value)| prepare_record(index, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedTable::new(records))
}

fn prepare_record(index: usize, value: Value) -> Result<FeedRecord, ScrapeError> {
    let raw: RawFeedRecord =
        serde_json::from_value(value).map_err(|e| ScrapeError::MalformedFeedRecord {
            index,
            reason: e.to_string(),
        })?;

    let date = parse_feed_date(&raw.date).ok_or_else(|| ScrapeError::MalformedFeedRecord {
        index,
        reason: format!("unrecognized date {:?}", raw.date),
    })?;

    let code = raw.code.unwrap_or_default();
    let population = population_override(&code).or_else(|| to_number(&raw.population));

    Ok(FeedRecord {
        index,
        date,
        day: to_number(&raw.day),
        month: to_number(&raw.month),
        year: to_number(&raw.year),
        cases: to_number(&raw.cases),
        deaths: to_number(&raw.deaths),
        country: raw.country,
        code,
        population,
        continent: raw.continent,
        cases_cum: None,
        deaths_cum: None,
    })
}

/// Feed dates are `DD/MM/YYYY`; ISO dates are passed through.
fn parse_feed_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn population_override(code: &str) -> Option<i64> {
    POPULATION_OVERRIDES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, population)| *population)
}

/// Coerce a JSON value to an integer. Anything that is not a whole number,
/// or a string holding one, becomes `None`.
fn to_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_number)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    }
}

fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}
