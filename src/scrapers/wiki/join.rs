//! Joining cases, deaths and region reference data.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use super::super::config::WikiConfig;
use super::super::error::ScrapeError;
use crate::models::{JoinedRecord, LongRecord, RegionRef};

/// Split an ISO date into (year, month, day).
fn split_date(date: &str) -> Result<(i32, u32, u32), ScrapeError> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ScrapeError::MalformedDate(date.to_string()))?;
    Ok((parsed.year(), parsed.month(), parsed.day()))
}

/// Left-join deaths and reference data onto cases.
///
/// Every cases record yields exactly one output row, in cases order. A
/// (date, region) missing from `deaths` gets zero deaths. A region missing
/// from the reference table gets no code and zero population, with a
/// warning, unless `strict_regions` is set, in which case it is an error.
pub fn join_data(
    cases: &[LongRecord],
    deaths: &[LongRecord],
    config: &WikiConfig,
) -> Result<Vec<JoinedRecord>, ScrapeError> {
    let mut deaths_by_key: HashMap<(&str, &str), &LongRecord> = HashMap::new();
    for record in deaths {
        deaths_by_key
            .entry((record.date.as_str(), record.region.as_str()))
            .or_insert(record);
    }

    let references: HashMap<&str, &RegionRef> = config
        .regions
        .iter()
        .map(|r| (r.region.as_str(), r))
        .collect();

    let mut unmatched: BTreeSet<&str> = BTreeSet::new();
    let mut joined = Vec::with_capacity(cases.len());

    for (index, case) in cases.iter().enumerate() {
        let (year, month, day) = split_date(&case.date)?;
        let death = deaths_by_key.get(&(case.date.as_str(), case.region.as_str()));

        let reference = references.get(case.region.as_str());
        if reference.is_none() {
            if config.strict_regions {
                return Err(ScrapeError::UnmatchedReference(case.region.clone()));
            }
            unmatched.insert(case.region.as_str());
        }

        joined.push(JoinedRecord {
            index,
            date: case.date.clone(),
            year,
            month,
            day,
            country: config.country.clone(),
            region: case.region.clone(),
            code: reference.map(|r| r.code.clone()),
            cases: case.delta,
            cases_cum: case.cumulative,
            deaths: death.map_or(0, |d| d.delta),
            deaths_cum: death.map_or(0, |d| d.cumulative),
            population: reference.map_or(0, |r| r.population),
        });
    }

    for region in &unmatched {
        warn!(
            "Region {:?} has no reference entry; code left empty and population set to 0",
            region
        );
    }

    debug!("Joined {} regional records", joined.len());
    Ok(joined)
}
