//! One-shot `feed` and `regions` commands.

use console::style;

use crate::config::Settings;
use crate::models::{FeedFilter, JoinedRecord};
use crate::scrapers::DataSource;
use crate::server::OutputShape;

fn parse_shape(name: &str) -> anyhow::Result<OutputShape> {
    OutputShape::parse(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown output type {:?} (expected list, dict, series, split, records or index)",
            name
        )
    })
}

/// Fetch the feed, filter it and print the shaped JSON.
///
/// With neither `country` nor `code` every row is printed.
pub async fn cmd_feed(
    settings: &Settings,
    country: Option<&str>,
    code: Option<&str>,
    shape: &str,
) -> anyhow::Result<()> {
    let shape = parse_shape(shape)?;
    let filter = FeedFilter::from_request(country, code).unwrap_or(FeedFilter::All);

    eprintln!(
        "{} Fetching {}",
        style("→").cyan(),
        style(&settings.feed_url).dim()
    );
    let table = settings.upstream()?.feed().await?;
    let rows = table.filter(&filter);
    eprintln!(
        "  {} {} of {} records",
        style("✓").green(),
        rows.len(),
        table.len()
    );

    println!("{}", serde_json::to_string_pretty(&shape.render(&rows))?);
    Ok(())
}

/// Scrape the regional tables and print the shaped JSON.
pub async fn cmd_regions(settings: &Settings, shape: &str) -> anyhow::Result<()> {
    let shape = parse_shape(shape)?;

    eprintln!(
        "{} Scraping {}",
        style("→").cyan(),
        style(&settings.wiki_url).dim()
    );
    let records = settings.upstream()?.regions().await?;
    eprintln!("  {} {} regional records", style("✓").green(), records.len());

    let rows: Vec<&JoinedRecord> = records.iter().collect();
    println!("{}", serde_json::to_string_pretty(&shape.render(&rows))?);
    Ok(())
}
