//! Regional case/death tables scraped from a wiki page.
//!
//! Pipeline: [`extract`] locates the header row and data tables,
//! [`records`] names the cells, [`tidy`] reshapes each table to long form
//! with deltas, and [`join`] merges cases, deaths and reference data.

pub mod extract;
pub mod join;
pub mod records;
pub mod tidy;

use scraper::Html;
use tracing::debug;

use super::config::WikiConfig;
use super::{HttpClient, ScrapeError};
use crate::models::{DataKind, JoinedRecord, WideTable};

/// Fetch the page and build the joined regional table.
pub async fn load_regions(
    client: &HttpClient,
    url: &str,
    config: &WikiConfig,
) -> Result<Vec<JoinedRecord>, ScrapeError> {
    let body = client.get_text(url).await?;
    build_regional_table(&body, config)
}

/// Scrape the wide table for one kind from a parsed page.
pub fn scrape_table(document: &Html, kind: DataKind) -> Result<WideTable, ScrapeError> {
    let header = records::get_names(&extract::extract_header(document)?)?;
    let rows = extract::extract_table(document, kind)?;
    let table = records::get_data(&rows, &header, kind)?;
    debug!("Scraped {} {} rows", table.rows.len(), kind);
    Ok(table)
}

/// Run the whole pipeline on page HTML.
pub fn build_regional_table(
    html: &str,
    config: &WikiConfig,
) -> Result<Vec<JoinedRecord>, ScrapeError> {
    let document = Html::parse_document(html);

    let cases = scrape_table(&document, DataKind::Cases)?;
    let deaths = scrape_table(&document, DataKind::Deaths)?;

    let cases = tidy::prepare_data(&cases, config)?;
    let deaths = tidy::prepare_data(&deaths, config)?;

    join::join_data(&cases, &deaths, config)
}
