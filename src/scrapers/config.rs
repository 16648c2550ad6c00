//! Regional scraper configuration.
//!
//! The lookup tables here default to the German-language page; replacing
//! them retargets the pipeline at another country's page with the same
//! table layout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{default_region_aliases, default_regions, MonthTable, RegionRef};

/// Settings for the wiki pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Constant `country` value of every output row.
    pub country: String,
    /// Localized month tokens used in the date column.
    pub months: MonthTable,
    /// Code and population per normalized region name.
    pub regions: Vec<RegionRef>,
    /// Page spellings mapped to reference spellings, applied before
    /// whitespace is stripped from region names.
    pub region_aliases: HashMap<String, String>,
    /// Fail instead of zero-filling when a region has no reference entry.
    pub strict_regions: bool,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            country: "Germany".to_string(),
            months: MonthTable::default(),
            regions: default_regions(),
            region_aliases: default_region_aliases(),
            strict_regions: false,
        }
    }
}

impl WikiConfig {
    /// Check the lookup tables are usable.
    pub fn validate(&self) -> Result<(), String> {
        if !self.months.is_valid() {
            return Err("wiki.months must have exactly 12 entries".to_string());
        }
        if self.country.is_empty() {
            return Err("wiki.country must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: WikiConfig = toml::from_str(
            r#"
            country = "Austria"
            strict_regions = true
            "#,
        )
        .unwrap();

        assert_eq!(config.country, "Austria");
        assert!(config.strict_regions);
        assert_eq!(config.regions.len(), 16);
        assert_eq!(config.months.lookup("Dez"), Some(12));
    }

    #[test]
    fn test_months_must_cover_year() {
        let config: WikiConfig = toml::from_str(r#"months = [["Jan"], ["Feb"]]"#).unwrap();
        assert!(config.validate().is_err());
        assert!(WikiConfig::default().validate().is_ok());
    }
}
