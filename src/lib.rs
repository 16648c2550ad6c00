//! covidscrape - COVID-19 case statistics scraper and JSON API.
//!
//! Loads a per-country daily case feed and scrapes per-state tables from a
//! wiki page, reshaping both into tidy tables served over HTTP.

pub mod cli;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod server;
