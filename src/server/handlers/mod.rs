//! HTTP request handlers for the web server.

mod covid;

// Re-export handlers for use by the router
pub use covid::{covid, covid_regions, health, CovidParams};
