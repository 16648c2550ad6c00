//! Turning header and row cells into named records.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::super::error::ScrapeError;
use crate::models::{DataKind, HeaderRow, RawRow, WideTable};

static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Sequences deleted outright: line breaks, dashes used as "no data" and
/// thousands separators.
const REMOVED: &[&str] = &["\n", "–", "--", "-", "—", "."];

/// Hidden sort keys end with this marker; the visible text follows it.
const SORT_KEY_MARKER: char = '♠';

/// Clean cell or header text the way the page marks it up.
///
/// Non-breaking spaces become spaces, footnote markers `(a)`..`(z)` and the
/// [`REMOVED`] sequences are deleted, and any hidden sort-key prefix (text up
/// to the last `♠`) is dropped.
pub fn format_text(text: &str) -> String {
    let mut text = text.replace('\u{a0}', " ");
    for pattern in REMOVED {
        text = text.replace(pattern, "");
    }
    for letter in 'a'..='z' {
        text = text.replace(&format!("({})", letter), "");
    }
    remove_sort_key(&text).trim().to_string()
}

fn remove_sort_key(text: &str) -> &str {
    match text.rfind(SORT_KEY_MARKER) {
        Some(i) => &text[i + SORT_KEY_MARKER.len_utf8()..],
        None => text,
    }
}

/// Name of one header cell: a nested link's title if there is one (titles
/// are stable where link text is abbreviated), else the cell text.
fn header_name(cell: ElementRef<'_>) -> String {
    let title = cell
        .select(&LINK)
        .next()
        .and_then(|link| link.value().attr("title"));

    match title {
        Some(title) => format_text(title),
        None => format_text(&cell.text().collect::<String>()),
    }
}

/// Column names for a table, with sentinel names assigned by position.
pub fn get_names(headers: &[ElementRef<'_>]) -> Result<HeaderRow, ScrapeError> {
    let names = headers.iter().map(|cell| header_name(*cell)).collect();
    HeaderRow::from_scraped(names).ok_or(ScrapeError::ShortHeader(headers.len()))
}

/// Records for the data rows of a table.
///
/// The first and last rows (header and totals) are skipped. See
/// [`build_rows`] for how ragged rows are handled.
pub fn get_data(
    rows: &[ElementRef<'_>],
    header: &HeaderRow,
    kind: DataKind,
) -> Result<WideTable, ScrapeError> {
    let body = match rows {
        [_, body @ .., _] => body,
        _ => &[],
    };

    let cells = body
        .iter()
        .map(|row| {
            row.select(&DATA_CELL)
                .map(|cell| format_text(&cell.text().collect::<String>()))
                .collect()
        })
        .collect();

    build_rows(cells, header, kind)
}

/// Zip row cells with column names.
///
/// A row with one cell fewer than the header is missing its leading week
/// cell (the page spans it over several rows); the week of the previous row
/// is carried forward into it. The first row must be complete. Any other
/// width is rejected.
pub fn build_rows(
    rows: Vec<Vec<String>>,
    header: &HeaderRow,
    kind: DataKind,
) -> Result<WideTable, ScrapeError> {
    let width = header.width();

    let (_, records) = rows.into_iter().enumerate().try_fold(
        (None::<String>, Vec::new()),
        |(last_week, mut records), (i, mut cells)| -> Result<_, ScrapeError> {
            let week = if cells.len() == width {
                cells[0].clone()
            } else if cells.len() + 1 == width {
                let week = last_week.ok_or(ScrapeError::MissingWeek {
                    table: kind.as_str(),
                })?;
                cells.insert(0, week.clone());
                week
            } else {
                return Err(ScrapeError::MalformedRow {
                    table: kind.as_str(),
                    row: i + 1,
                    cells: cells.len(),
                    expected: width,
                });
            };

            records.push(RawRow::new(
                header.names().iter().cloned().zip(cells).collect(),
            ));
            Ok((Some(week), records))
        },
    )?;

    Ok(WideTable {
        kind,
        header: header.clone(),
        rows: records,
    })
}
