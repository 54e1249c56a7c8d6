//! Remote source configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default community code of the public API host.
pub const DEFAULT_COMMUNITY: &str = "en";

/// Configuration for [`XmlApiSource`](crate::XmlApiSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Overrides the API base URL (e.g. a mirror or a test server). When
    /// unset the public host of the universe is used.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Community code in the public host name.
    #[serde(default = "default_community")]
    pub community: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_community() -> String {
    DEFAULT_COMMUNITY.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            community: default_community(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    /// Returns the API base URL for a universe, without a trailing slash.
    pub fn base_url_for(&self, universe: u32) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://s{}-{}.ogame.gameforge.com/api",
                universe, self.community
            ),
        }
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
