//! Wide-to-long reshaping of a scraped table with period deltas.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::super::config::WikiConfig;
use super::super::error::ScrapeError;
use crate::models::{HeaderRow, LongRecord, MonthTable, WideTable};

/// Parenthetical annotations such as `(+12)` or `(korr.)`.
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

fn remove_annotations(text: &str) -> String {
    ANNOTATION.replace_all(text, "").into_owned()
}

/// Convert a `day month-name year` date to `YYYY-MM-DD`.
///
/// Periods are ignored, the day is zero-padded and the month token must
/// match an entry of `months` exactly.
pub fn format_date(date: &str, months: &MonthTable) -> Result<String, ScrapeError> {
    let cleaned = date.replace('.', "");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();

    let [day, month, year] = parts.as_slice() else {
        return Err(ScrapeError::MalformedDate(date.to_string()));
    };

    let month = months
        .lookup(month)
        .ok_or_else(|| ScrapeError::MalformedDate(date.to_string()))?;
    if day.is_empty() || !day.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScrapeError::MalformedDate(date.to_string()));
    }

    Ok(format!("{}-{:02}-{:0>2}", year, month, day))
}

/// Cumulative count from cell text: annotations and whitespace removed,
/// empty cells read as zero.
fn parse_count(raw: &str) -> Option<i64> {
    let digits: String = remove_annotations(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

/// Map a page region name to the reference spelling.
fn normalize_region(name: &str, aliases: &HashMap<String, String>) -> String {
    let name = remove_annotations(name);
    let name = aliases
        .get(name.trim())
        .map(String::as_str)
        .unwrap_or(name.as_str());
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Reshape a wide table into one record per (region, date).
///
/// Output is grouped by region in header order. Within a region, records
/// follow row order, which must be chronological; if it is not, the region
/// is sorted by date before deltas are taken. The first delta of every
/// region is 0.
pub fn prepare_data(
    table: &WideTable,
    config: &WikiConfig,
) -> Result<Vec<LongRecord>, ScrapeError> {
    let periods = table
        .rows
        .iter()
        .map(|row| -> Result<(String, String), ScrapeError> {
            let week = remove_annotations(row.get(HeaderRow::WEEK).unwrap_or_default());
            let date = format_date(row.get(HeaderRow::DATE).unwrap_or_default(), &config.months)?;
            Ok((week, date))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(periods.len() * table.header.regions().len());

    for column in table.header.regions() {
        let region = normalize_region(column, &config.region_aliases);

        let mut series = table
            .rows
            .iter()
            .zip(&periods)
            .map(|(row, (week, date))| -> Result<LongRecord, ScrapeError> {
                let raw = row.get(column).unwrap_or_default();
                let cumulative = parse_count(raw).ok_or_else(|| ScrapeError::MalformedCount {
                    region: region.clone(),
                    date: date.clone(),
                    value: raw.to_string(),
                })?;
                Ok(LongRecord {
                    week: week.trim().to_string(),
                    date: date.clone(),
                    region: region.clone(),
                    cumulative,
                    delta: 0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        derive_deltas(&mut series);
        records.append(&mut series);
    }

    debug!(
        "Prepared {} {} records for {} regions",
        records.len(),
        table.kind,
        table.header.regions().len()
    );
    Ok(records)
}

/// Fill `delta` with the first difference of `cumulative` for one region.
fn derive_deltas(series: &mut [LongRecord]) {
    if series.windows(2).any(|w| w[0].date > w[1].date) {
        if let Some(first) = series.first() {
            warn!("Rows for {} are not chronological; sorting by date", first.region);
        }
        series.sort_by(|a, b| a.date.cmp(&b.date));
    }

    let mut previous: Option<i64> = None;
    for record in series.iter_mut() {
        record.delta = previous.map_or(0, |p| record.cumulative - p);
        if record.delta < 0 {
            debug!(
                "{} on {}: cumulative count decreased by {}",
                record.region, record.date, -record.delta
            );
        }
        previous = Some(record.cumulative);
    }
}
