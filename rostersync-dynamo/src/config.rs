//! DynamoDB connection settings.

use serde::{Deserialize, Serialize};

/// Overrides applied on top of the ambient AWS configuration.
///
/// Credentials always come from the standard provider chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamoConfig {
    /// Region override. Falls back to the SDK's region resolution.
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override (e.g. DynamoDB Local).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}
