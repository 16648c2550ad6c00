//! Upstream sources: the JSON feed and the regional wiki page.

pub mod config;
mod error;
pub mod feed;
mod http_client;
pub mod wiki;

pub use config::WikiConfig;
pub use error::{Anchor, ScrapeError};
pub use http_client::{resolve_user_agent, HttpClient, USER_AGENT};

use async_trait::async_trait;

use crate::models::{FeedTable, JoinedRecord};

/// Where the server gets its tables from. Every call fetches fresh data.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Per-country feed table.
    async fn feed(&self) -> Result<FeedTable, ScrapeError>;

    /// Joined regional table.
    async fn regions(&self) -> Result<Vec<JoinedRecord>, ScrapeError>;
}

/// Live upstream endpoints.
pub struct UpstreamSource {
    client: HttpClient,
    feed_url: String,
    wiki_url: String,
    wiki: WikiConfig,
}

impl UpstreamSource {
    pub fn new(client: HttpClient, feed_url: String, wiki_url: String, wiki: WikiConfig) -> Self {
        Self {
            client,
            feed_url,
            wiki_url,
            wiki,
        }
    }
}

#[async_trait]
impl DataSource for UpstreamSource {
    async fn feed(&self) -> Result<FeedTable, ScrapeError> {
        feed::load_feed(&self.client, &self.feed_url).await
    }

    async fn regions(&self) -> Result<Vec<JoinedRecord>, ScrapeError> {
        wiki::load_regions(&self.client, &self.wiki_url, &self.wiki).await
    }
}
