//! Regional (wiki) tables at each stage of the pipeline.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::TableRow;

/// Which count a wiki table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Cases,
    Incidence,
    Deaths,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cases => "cases",
            Self::Incidence => "incidence",
            Self::Deaths => "deaths",
        }
    }

    /// Position of the kind's table among the page's tables.
    pub fn table_index(&self) -> usize {
        match self {
            Self::Cases => 0,
            Self::Incidence => 1,
            Self::Deaths => 2,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column names of a wiki table.
///
/// The first two and last three positions always carry sentinel names; only
/// the region columns in between come from the page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow(Vec<String>);

impl HeaderRow {
    pub const WEEK: &'static str = "week";
    pub const DATE: &'static str = "date";
    pub const TOTAL: &'static str = "total";
    pub const INCREMENT: &'static str = "increment";
    pub const REMARK: &'static str = "remark";

    /// Leading plus trailing sentinel columns.
    pub const SENTINELS: usize = 5;

    /// Assign sentinel names by position. Needs at least the five sentinel
    /// positions; returns `None` otherwise.
    pub fn from_scraped(mut names: Vec<String>) -> Option<Self> {
        let n = names.len();
        if n < Self::SENTINELS {
            return None;
        }
        names[0] = Self::WEEK.to_string();
        names[1] = Self::DATE.to_string();
        names[n - 3] = Self::TOTAL.to_string();
        names[n - 2] = Self::INCREMENT.to_string();
        names[n - 1] = Self::REMARK.to_string();
        Some(Self(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of cells in a well-formed data row.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Region column names, in page order.
    pub fn regions(&self) -> &[String] {
        &self.0[2..self.0.len() - 3]
    }
}

/// One data row: cell text keyed by column name, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A scraped table in wide form: one column per region, one row per week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideTable {
    pub kind: DataKind,
    pub header: HeaderRow,
    pub rows: Vec<RawRow>,
}

/// One (region, date) observation of a single kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRecord {
    pub week: String,
    pub date: String,
    pub region: String,
    /// Cumulative count as published.
    pub cumulative: i64,
    /// Change since the region's previous date; 0 for its first date.
    /// Negative when the published cumulative count was corrected downward.
    pub delta: i64,
}

/// Final regional output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedRecord {
    #[serde(skip)]
    pub index: usize,
    pub date: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub country: String,
    pub region: String,
    pub code: Option<String>,
    pub cases: i64,
    pub cases_cum: i64,
    pub deaths: i64,
    pub deaths_cum: i64,
    pub population: i64,
}

impl TableRow for JoinedRecord {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "year",
        "month",
        "day",
        "country",
        "region",
        "code",
        "cases",
        "cases_cum",
        "deaths",
        "deaths_cum",
        "population",
    ];

    fn index(&self) -> usize {
        self.index
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.date.clone()),
            Value::from(self.year),
            Value::from(self.month),
            Value::from(self.day),
            Value::from(self.country.clone()),
            Value::from(self.region.clone()),
            Value::from(self.code.clone()),
            Value::from(self.cases),
            Value::from(self.cases_cum),
            Value::from(self.deaths),
            Value::from(self.deaths_cum),
            Value::from(self.population),
        ]
    }
}
