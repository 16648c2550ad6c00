//! Data models for the feed and regional pipelines.

mod feed;
mod reference;
mod regional;
mod table;

pub use feed::{FeedFilter, FeedRecord, FeedTable};
pub use reference::{
    default_region_aliases, default_regions, MonthTable, RegionRef, POPULATION_OVERRIDES,
};
pub use regional::{DataKind, HeaderRow, JoinedRecord, LongRecord, RawRow, WideTable};
pub use table::TableRow;
