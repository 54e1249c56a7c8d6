//! DynamoDB batch store for rostersync.
//!
//! Implements [`rostersync_sync::BatchStore`] on top of `BatchWriteItem`
//! and `BatchGetItem`. DynamoDB caps those calls at 25 write requests and
//! 100 keys; the engine's default batch limits match.

pub mod convert;
mod config;
mod error;
mod store;

pub use config::DynamoConfig;
pub use error::{DynamoError, DynamoResult};
pub use store::DynamoStore;
