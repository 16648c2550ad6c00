//! Per-country daily records from the JSON feed.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::TableRow;

/// One row of the feed after renaming and coercion.
///
/// Numeric fields are `None` when the upstream value was missing or not a
/// number. `cases_cum`/`deaths_cum` are filled in by [`FeedTable::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedRecord {
    #[serde(skip)]
    pub index: usize,
    pub date: String,
    pub day: Option<i64>,
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub cases: Option<i64>,
    pub deaths: Option<i64>,
    pub country: String,
    pub code: String,
    pub population: Option<i64>,
    pub continent: Option<String>,
    pub cases_cum: Option<i64>,
    pub deaths_cum: Option<i64>,
}

impl TableRow for FeedRecord {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "day",
        "month",
        "year",
        "cases",
        "deaths",
        "country",
        "code",
        "population",
        "continent",
        "cases_cum",
        "deaths_cum",
    ];

    fn index(&self) -> usize {
        self.index
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.date.clone()),
            Value::from(self.day),
            Value::from(self.month),
            Value::from(self.year),
            Value::from(self.cases),
            Value::from(self.deaths),
            Value::from(self.country.clone()),
            Value::from(self.code.clone()),
            Value::from(self.population),
            Value::from(self.continent.clone()),
            Value::from(self.cases_cum),
            Value::from(self.deaths_cum),
        ]
    }
}

/// Feed records ordered by (country, date) with per-country running totals.
#[derive(Debug, Clone, Default)]
pub struct FeedTable {
    records: Vec<FeedRecord>,
}

impl FeedTable {
    /// Sort records by (country, date) and compute cumulative sums.
    ///
    /// The running total restarts at every country boundary. Missing counts
    /// leave the cumulative value absent for that row but do not reset the
    /// total, so later rows keep accumulating. A total that overflows `i64`
    /// stays absent for the rest of that country.
    pub fn new(mut records: Vec<FeedRecord>) -> Self {
        records.sort_by(|a, b| a.country.cmp(&b.country).then_with(|| a.date.cmp(&b.date)));

        let mut current_country: Option<String> = None;
        let (mut cases_total, mut deaths_total) = (Some(0i64), Some(0i64));

        for record in &mut records {
            if current_country.as_deref() != Some(record.country.as_str()) {
                current_country = Some(record.country.clone());
                cases_total = Some(0);
                deaths_total = Some(0);
            }

            let cases_cum = accumulate(&mut cases_total, record.cases, record, "cases");
            let deaths_cum = accumulate(&mut deaths_total, record.deaths, record, "deaths");
            record.cases_cum = cases_cum;
            record.deaths_cum = deaths_cum;
        }

        Self { records }
    }

    pub fn records(&self) -> &[FeedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching the filter, in table order.
    pub fn filter(&self, filter: &FeedFilter) -> Vec<&FeedRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }
}

/// Add `count` to `total`, returning the new total for this row.
fn accumulate(
    total: &mut Option<i64>,
    count: Option<i64>,
    record: &FeedRecord,
    column: &str,
) -> Option<i64> {
    let count = count?;
    let running = (*total)?;
    *total = running.checked_add(count);
    if total.is_none() {
        warn!(
            "{} total for {} overflows on {}; dropping the cumulative series",
            column, record.country, record.date
        );
    }
    *total
}

/// Row selection requested by an API caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    Country(String),
    Code(String),
}

impl FeedFilter {
    /// Build a filter from the request keys. `country` wins over `code`;
    /// the literal `All` country and `ALL` code select every row.
    pub fn from_request(country: Option<&str>, code: Option<&str>) -> Option<Self> {
        match (country, code) {
            (Some("All"), _) => Some(Self::All),
            (Some(country), _) => Some(Self::Country(country.to_string())),
            (None, Some("ALL")) => Some(Self::All),
            (None, Some(code)) => Some(Self::Code(code.to_string())),
            (None, None) => None,
        }
    }

    pub fn matches(&self, record: &FeedRecord) -> bool {
        match self {
            Self::All => true,
            Self::Country(country) => record.country == *country,
            Self::Code(code) => record.code == *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, country: &str, date: &str, cases: Option<i64>) -> FeedRecord {
        FeedRecord {
            index,
            date: date.to_string(),
            day: None,
            month: None,
            year: None,
            cases,
            deaths: Some(0),
            country: country.to_string(),
            code: country[..2].to_uppercase(),
            population: None,
            continent: None,
            cases_cum: None,
            deaths_cum: None,
        }
    }

    #[test]
    fn test_cumulative_resets_per_country() {
        let table = FeedTable::new(vec![
            record(0, "Italy", "2020-03-02", Some(5)),
            record(1, "Austria", "2020-03-01", Some(3)),
            record(2, "Italy", "2020-03-01", Some(10)),
            record(3, "Austria", "2020-03-02", Some(4)),
        ]);

        let summary: Vec<_> = table
            .records()
            .iter()
            .map(|r| (r.country.as_str(), r.cases_cum))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Austria", Some(3)),
                ("Austria", Some(7)),
                ("Italy", Some(10)),
                ("Italy", Some(15)),
            ]
        );
    }

    #[test]
    fn test_missing_counts_do_not_reset_total() {
        let table = FeedTable::new(vec![
            record(0, "Italy", "2020-03-01", Some(10)),
            record(1, "Italy", "2020-03-02", None),
            record(2, "Italy", "2020-03-03", Some(2)),
        ]);

        let cum: Vec<_> = table.records().iter().map(|r| r.cases_cum).collect();
        assert_eq!(cum, vec![Some(10), None, Some(12)]);
    }

    #[test]
    fn test_overflowing_total_becomes_absent() {
        let table = FeedTable::new(vec![
            record(0, "Italy", "2020-03-01", Some(i64::MAX)),
            record(1, "Italy", "2020-03-02", Some(1)),
            record(2, "Italy", "2020-03-03", Some(1)),
            record(3, "Malta", "2020-03-01", Some(2)),
        ]);

        let cum: Vec<_> = table.records().iter().map(|r| r.cases_cum).collect();
        assert_eq!(cum, vec![Some(i64::MAX), None, None, Some(2)]);
    }

    #[test]
    fn test_sort_keeps_source_index() {
        let table = FeedTable::new(vec![
            record(0, "Italy", "2020-03-02", Some(1)),
            record(1, "Italy", "2020-03-01", Some(1)),
        ]);

        let indices: Vec<_> = table.records().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 0]);
    }

    #[test]
    fn test_filter_from_request() {
        assert_eq!(FeedFilter::from_request(Some("All"), None), Some(FeedFilter::All));
        assert_eq!(FeedFilter::from_request(None, Some("ALL")), Some(FeedFilter::All));
        assert_eq!(
            FeedFilter::from_request(Some("Italy"), Some("AT")),
            Some(FeedFilter::Country("Italy".to_string()))
        );
        assert_eq!(
            FeedFilter::from_request(None, Some("IT")),
            Some(FeedFilter::Code("IT".to_string()))
        );
        assert_eq!(FeedFilter::from_request(None, None), None);
    }

    #[test]
    fn test_filter_rows() {
        let table = FeedTable::new(vec![
            record(0, "Italy", "2020-03-01", Some(1)),
            record(1, "Austria", "2020-03-01", Some(1)),
        ]);

        let italy = table.filter(&FeedFilter::Country("Italy".to_string()));
        assert_eq!(italy.len(), 1);
        assert_eq!(italy[0].country, "Italy");

        let by_code = table.filter(&FeedFilter::Code("AU".to_string()));
        assert_eq!(by_code.len(), 1);
        assert_eq!(table.filter(&FeedFilter::All).len(), 2);
    }

    #[test]
    fn test_values_match_columns() {
        let r = record(0, "Italy", "2020-03-01", Some(1));
        assert_eq!(r.values().len(), FeedRecord::COLUMNS.len());
    }
}
