//! HTTP client for the public game API.

use crate::config::SourceConfig;
use crate::parse::{parse_detail, parse_roster};
use async_trait::async_trait;
use reqwest::Client;
use rostersync_sync::{RosterSource, SyncError, SyncResult};
use rostersync_types::{DetailRecord, Entity};
use tracing::debug;

/// `RosterSource` backed by the `players.xml` and `playerData.xml` endpoints.
pub struct XmlApiSource {
    config: SourceConfig,
    client: Client,
}

impl XmlApiSource {
    /// Creates a source with its own HTTP client.
    pub fn new(config: SourceConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Creates a source that reuses an existing HTTP client.
    pub fn with_client(config: SourceConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> SyncResult<String> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Network(format!("{url} returned HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SyncError::Network(format!("failed to read body of {url}: {e}")))
    }
}

#[async_trait]
impl RosterSource for XmlApiSource {
    fn source_name(&self) -> &'static str {
        "ogame-xml"
    }

    async fn roster(&self, universe: u32) -> SyncResult<Vec<Entity>> {
        let url = format!("{}/players.xml", self.config.base_url_for(universe));
        let body = self.fetch(&url, &[]).await?;
        parse_roster(&body)
    }

    async fn detail(&self, universe: u32, entity: &Entity) -> SyncResult<DetailRecord> {
        let url = format!("{}/playerData.xml", self.config.base_url_for(universe));
        let body = self.fetch(&url, &[("id", entity.id.as_str())]).await?;
        parse_detail(&body)
    }
}
