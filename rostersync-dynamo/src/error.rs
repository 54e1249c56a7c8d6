//! DynamoDB adapter error types.

use aws_sdk_dynamodb::error::BuildError;
use rostersync_sync::SyncError;
use thiserror::Error;

/// Result type for DynamoDB adapter operations.
pub type DynamoResult<T> = Result<T, DynamoError>;

/// Errors raised while talking to DynamoDB or mapping its items.
#[derive(Debug, Error)]
pub enum DynamoError {
    #[error("cannot connect to DynamoDB: {0}")]
    Connect(String),

    #[error("DynamoDB request failed: {0}")]
    Request(String),

    #[error("invalid DynamoDB request: {0}")]
    Build(#[from] BuildError),

    #[error("item is not a JSON object")]
    NotAnObject,

    #[error("unsupported attribute value: {0}")]
    Unsupported(&'static str),

    #[error("invalid number attribute {0:?}")]
    Number(String),

    #[error("item has no usable key: {0}")]
    Key(#[from] serde_json::Error),
}

impl From<DynamoError> for SyncError {
    fn from(err: DynamoError) -> Self {
        match err {
            DynamoError::Connect(_) => SyncError::Config(err.to_string()),
            DynamoError::Request(_) => SyncError::Transport(err.to_string()),
            DynamoError::Build(_) | DynamoError::NotAnObject | DynamoError::Key(_) => {
                SyncError::Validation(err.to_string())
            }
            DynamoError::Unsupported(_) | DynamoError::Number(_) => {
                SyncError::Decode(err.to_string())
            }
        }
    }
}
