//! DynamoDB `BatchStore` implementation.
//!
//! Uses `BatchWriteItem` for puts and deletes and `BatchGetItem` for reads.
//! Items DynamoDB hands back as unprocessed are mapped to neutral write
//! requests and keys; the engine decides what to do with them.

use crate::config::DynamoConfig;
use crate::convert::{item_to_json, item_to_key, json_to_item, key_to_item};
use crate::error::{DynamoError, DynamoResult};
use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    DeleteRequest, KeysAndAttributes, PutRequest, WriteRequest as DynamoWriteRequest,
};
use rostersync_sync::{BatchStore, GetBatch, SyncResult, WriteRequest};
use rostersync_types::RecordKey;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

/// A `BatchStore` backed by a DynamoDB table.
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
}

impl fmt::Debug for DynamoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamoStore").finish_non_exhaustive()
    }
}

impl DynamoStore {
    /// Builds a client from the ambient AWS configuration plus overrides.
    ///
    /// Region and credentials are resolved here, once, so a store that can
    /// never be reached fails as a configuration error before a pass starts.
    pub async fn connect(config: &DynamoConfig) -> SyncResult<Self> {
        let sdk_config = aws_config::from_env().load().await;

        if config.region.is_none() && sdk_config.region().is_none() {
            return Err(DynamoError::Connect("no AWS region configured".into()).into());
        }
        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| DynamoError::Connect("no AWS credentials provider".into()))?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| {
                DynamoError::Connect(format!("credentials: {}", DisplayErrorContext(e)))
            })?;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region.clone()));
        }
        // e.g. DynamoDB Local
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        info!(
            "DynamoDB store initialized (region: {}, endpoint: {})",
            config.region.as_deref().unwrap_or("default"),
            config.endpoint_url.as_deref().unwrap_or("default")
        );
        Ok(Self::from_client(Client::from_conf(builder.build())))
    }

    /// Wraps a pre-built client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn write(
        &self,
        table: &str,
        requests: Vec<DynamoWriteRequest>,
    ) -> DynamoResult<Vec<WriteRequest>> {
        let output = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(|e| DynamoError::Request(format!("batch write: {}", DisplayErrorContext(e))))?;

        let leftover = output
            .unprocessed_items
            .and_then(|mut tables| tables.remove(table))
            .unwrap_or_default();
        leftover.into_iter().map(from_dynamo_write).collect()
    }

    async fn read(&self, table: &str, keys: &[RecordKey]) -> DynamoResult<GetBatch> {
        let request = KeysAndAttributes::builder()
            .set_keys(Some(keys.iter().map(key_to_item).collect()))
            .build()?;

        let output = self
            .client
            .batch_get_item()
            .request_items(table, request)
            .send()
            .await
            .map_err(|e| DynamoError::Request(format!("batch get: {}", DisplayErrorContext(e))))?;

        let items = output
            .responses
            .and_then(|mut tables| tables.remove(table))
            .unwrap_or_default()
            .iter()
            .map(item_to_json)
            .collect::<DynamoResult<Vec<_>>>()?;

        let unprocessed_keys = match output
            .unprocessed_keys
            .and_then(|mut tables| tables.remove(table))
        {
            Some(pending) => pending
                .keys
                .iter()
                .map(item_to_key)
                .collect::<DynamoResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(GetBatch {
            items,
            unprocessed_keys,
        })
    }
}

fn put_request(item: &Value) -> DynamoResult<DynamoWriteRequest> {
    let put = PutRequest::builder()
        .set_item(Some(json_to_item(item)?))
        .build()?;
    Ok(DynamoWriteRequest::builder().put_request(put).build())
}

fn delete_request(key: &RecordKey) -> DynamoResult<DynamoWriteRequest> {
    let delete = DeleteRequest::builder()
        .set_key(Some(key_to_item(key)))
        .build()?;
    Ok(DynamoWriteRequest::builder().delete_request(delete).build())
}

fn from_dynamo_write(request: DynamoWriteRequest) -> DynamoResult<WriteRequest> {
    if let Some(put) = request.put_request {
        return Ok(WriteRequest::Put(item_to_json(&put.item)?));
    }
    if let Some(delete) = request.delete_request {
        return Ok(WriteRequest::Delete(item_to_key(&delete.key)?));
    }
    Err(DynamoError::Unsupported("empty write request"))
}

fn log_leftover(op: &str, table: &str, leftover: usize, size: usize) {
    if leftover > 0 {
        warn!(
            "DynamoDB {} on {} left {} of {} items unprocessed",
            op, table, leftover, size
        );
    } else {
        debug!("DynamoDB {} on {}: {} items", op, table, size);
    }
}

#[async_trait]
impl BatchStore for DynamoStore {
    fn provider_name(&self) -> &'static str {
        "DynamoDB"
    }

    async fn put_batch(&self, table: &str, items: &[Value]) -> SyncResult<Vec<WriteRequest>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let requests = items
            .iter()
            .map(put_request)
            .collect::<DynamoResult<Vec<_>>>()?;
        let leftover = self.write(table, requests).await?;
        log_leftover("put", table, leftover.len(), items.len());
        Ok(leftover)
    }

    async fn delete_batch(
        &self,
        table: &str,
        keys: &[RecordKey],
    ) -> SyncResult<Vec<WriteRequest>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let requests = keys
            .iter()
            .map(delete_request)
            .collect::<DynamoResult<Vec<_>>>()?;
        let leftover = self.write(table, requests).await?;
        log_leftover("delete", table, leftover.len(), keys.len());
        Ok(leftover)
    }

    async fn get_batch(&self, table: &str, keys: &[RecordKey]) -> SyncResult<GetBatch> {
        if keys.is_empty() {
            return Ok(GetBatch::default());
        }
        let batch = self.read(table, keys).await?;
        log_leftover("get", table, batch.unprocessed_keys.len(), keys.len());
        Ok(batch)
    }
}
