//! Positional lookup of the header row and data tables on the wiki page.
//!
//! The page has no stable ids, so everything is found by position:
//!
//! 1. the first `<caption>` in the document,
//! 2. its parent (the captioned table),
//! 3. that table's parent (the wrapper),
//! 4. the first `<tr>` at or after the wrapper in document order,
//! 5. the `<th>` cells of that row.
//!
//! Data tables are the document's `<table>` elements by index. Each step
//! that comes up empty fails with the [`Anchor`] it was looking for.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::super::error::{Anchor, ScrapeError};
use crate::models::DataKind;

static CAPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("caption").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());

/// Header cells of the captioned table.
pub fn extract_header(document: &Html) -> Result<Vec<ElementRef<'_>>, ScrapeError> {
    let caption = document
        .select(&CAPTION)
        .next()
        .ok_or(ScrapeError::missing(Anchor::Caption))?;
    let table = parent_element(caption).ok_or(ScrapeError::missing(Anchor::CaptionTable))?;
    let wrapper = parent_element(table).ok_or(ScrapeError::missing(Anchor::TableWrapper))?;
    let row = next_element_named(document, wrapper, "tr")
        .ok_or(ScrapeError::missing(Anchor::HeaderRow))?;

    let cells: Vec<_> = row.select(&HEADER_CELL).collect();
    if cells.is_empty() {
        return Err(ScrapeError::missing(Anchor::HeaderCells));
    }
    Ok(cells)
}

/// Rows of the table holding `kind`, skipping rows that carry a `class`
/// attribute (formatting and subtotal rows).
pub fn extract_table(document: &Html, kind: DataKind) -> Result<Vec<ElementRef<'_>>, ScrapeError> {
    let index = kind.table_index();
    let table = document
        .select(&TABLE)
        .nth(index)
        .ok_or(ScrapeError::missing(Anchor::DataTable(index)))?;

    Ok(table
        .select(&ROW)
        .filter(|row| row.value().attr("class").is_none())
        .collect())
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// First element named `name` at or after `start` in document order,
/// including `start`'s own descendants.
fn next_element_named<'a>(
    document: &'a Html,
    start: ElementRef<'a>,
    name: &str,
) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != start.id())
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == name)
}
