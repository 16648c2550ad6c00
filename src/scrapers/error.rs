//! Errors raised while fetching and reshaping upstream data.

use std::fmt;

use thiserror::Error;

/// Step of the positional page traversal that found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// No `<caption>` anywhere in the document.
    Caption,
    /// The caption has no parent element (its table).
    CaptionTable,
    /// The caption's table has no parent element (its wrapper).
    TableWrapper,
    /// No `<tr>` follows the wrapper.
    HeaderRow,
    /// The header row contains no `<th>` cells.
    HeaderCells,
    /// The document has fewer tables than the given index requires.
    DataTable(usize),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caption => f.write_str("table caption"),
            Self::CaptionTable => f.write_str("captioned table"),
            Self::TableWrapper => f.write_str("table wrapper"),
            Self::HeaderRow => f.write_str("header row"),
            Self::HeaderCells => f.write_str("header cells"),
            Self::DataTable(index) => write!(f, "data table #{}", index),
        }
    }
}

/// Errors that can occur while loading either source.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Page structure not found: missing {anchor}")]
    StructureNotFound { anchor: Anchor },

    #[error("Header has {0} columns, need at least 5")]
    ShortHeader(usize),

    #[error("Malformed {table} row {row}: {cells} cells, expected {expected}")]
    MalformedRow {
        table: &'static str,
        row: usize,
        cells: usize,
        expected: usize,
    },

    #[error("First {table} row has no week cell to carry forward")]
    MissingWeek { table: &'static str },

    #[error("Malformed date: {0:?}")]
    MalformedDate(String),

    #[error("Malformed count {value:?} for region {region} on {date}")]
    MalformedCount {
        region: String,
        date: String,
        value: String,
    },

    #[error("Malformed feed record #{index}: {reason}")]
    MalformedFeedRecord { index: usize, reason: String },

    #[error("Region {0:?} has no reference entry")]
    UnmatchedReference(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Upstream {url} returned status {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub(crate) fn missing(anchor: Anchor) -> Self {
        Self::StructureNotFound { anchor }
    }

    /// True for failures reaching the upstream, as opposed to failures
    /// interpreting what it returned.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::UpstreamStatus { .. } | Self::Http(_)
        )
    }
}
