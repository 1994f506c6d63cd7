//! DynamoDB storage adapter.
//!
//! Orchestrates the key codec, index deriver, resilient executor, and
//! paginator into the `StorageAdapter` operations. The adapter holds no
//! mutable state: every call encodes its own keys and makes its own
//! backend round trips, so all operations are independently safe to
//! invoke concurrently. Same-key writes race at the backend's
//! last-writer-wins granularity; serializing them is the caller's job.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use chrono::Utc;

use showcase_core::storage::{
    derive_index_keys, sanitize, stamp_timestamps, to_physical_record, Document, EntityKey,
    KeyPrefix, ListPlan, PhysicalKey, Result, SecondaryIndex, StorageAdapter, StorageError,
    CREATED_AT_FIELD,
};

use crate::config::StorageConfig;

use super::conversions::{document_to_item, item_to_document};
use super::error::map_sdk_error;
use super::pagination::{drain, Item, ReadPlan};
use super::retry::{execute_with_retry, RetryPolicy};

/// DynamoDB batch-write limit per request.
const DELETE_BATCH_SIZE: usize = 25;

/// Single-table DynamoDB adapter.
pub struct DynamoDbAdapter {
    client: Client,
    table_name: String,
    retry: RetryPolicy,
}

impl DynamoDbAdapter {
    /// Creates an adapter with an externally-constructed client.
    ///
    /// The client is injected (typically cloned out of a
    /// [`super::ClientFactory`]) so tests can build independent adapter
    /// instances deterministically.
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            table_name: config.table_name.clone(),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// Creates an adapter from environment configuration.
    ///
    /// Uses the AWS SDK default credential chain and
    /// [`StorageConfig::from_env`].
    pub async fn from_env() -> Self {
        let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&aws), &StorageConfig::from_env())
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Reads the existing `createdAt` for a key, if the item exists.
    async fn load_created_at(&self, physical: &PhysicalKey) -> Result<Option<String>> {
        let builder = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(physical.pk.clone()))
            .key("SK", AttributeValue::S(physical.sk.clone()))
            .projection_expression(CREATED_AT_FIELD);

        let output = execute_with_retry("GetItem", self.retry, || {
            let builder = builder.clone();
            async move { builder.send().await.map_err(|e| map_sdk_error("GetItem", e)) }
        })
        .await?;

        Ok(output.item.and_then(|item| {
            item.get(CREATED_AT_FIELD)
                .and_then(|attr| attr.as_s().ok().cloned())
        }))
    }

    /// Sanitizes a page of raw items into caller-facing documents.
    fn sanitize_items(items: Vec<Item>) -> Result<Vec<Document>> {
        items
            .iter()
            .map(|item| {
                let mut doc = item_to_document(item)?;
                sanitize(&mut doc);
                Ok(doc)
            })
            .collect()
    }
}

#[async_trait]
impl StorageAdapter for DynamoDbAdapter {
    async fn get(&self, key: &str) -> Result<Option<Document>> {
        let physical = EntityKey::parse(key)?.encode();

        let builder = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(physical.pk))
            .key("SK", AttributeValue::S(physical.sk));

        let output = execute_with_retry("GetItem", self.retry, || {
            let builder = builder.clone();
            async move { builder.send().await.map_err(|e| map_sdk_error("GetItem", e)) }
        })
        .await?;

        match output.item {
            Some(item) => {
                let mut doc = item_to_document(&item)?;
                sanitize(&mut doc);
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Document) -> Result<()> {
        let entity_key = EntityKey::parse(key)?;
        let physical = entity_key.encode();

        // Upsert: createdAt is assigned once and carried forward on every
        // later write of the same key.
        let existing_created_at = self.load_created_at(&physical).await?;

        let mut doc = value;
        stamp_timestamps(&mut doc, existing_created_at, Utc::now());
        let index_keys = derive_index_keys(&entity_key, &doc);
        let record = to_physical_record(&entity_key, doc, &index_keys);
        let item = document_to_item(&record)?;

        let builder = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item));

        execute_with_retry("PutItem", self.retry, || {
            let builder = builder.clone();
            async move { builder.send().await.map_err(|e| map_sdk_error("PutItem", e)) }
        })
        .await?;

        tracing::debug!(key, entity_type = entity_key.entity_type(), "item stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let physical = EntityKey::parse(key)?.encode();

        let builder = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(physical.pk))
            .key("SK", AttributeValue::S(physical.sk));

        execute_with_retry("DeleteItem", self.retry, || {
            let builder = builder.clone();
            async move {
                builder
                    .send()
                    .await
                    .map_err(|e| map_sdk_error("DeleteItem", e))
            }
        })
        .await?;

        Ok(())
    }

    async fn clear(&self) -> Result<u64> {
        let plan = ReadPlan::Scan {
            pk_prefix: None,
            sk_exact: None,
            keys_only: true,
        };
        let mut pending = drain(&self.client, &self.table_name, self.retry, &plan).await?;
        let mut deleted: u64 = 0;

        while !pending.is_empty() {
            let split = pending.len().min(DELETE_BATCH_SIZE);
            let batch: Vec<Item> = pending.drain(..split).collect();
            let batch_len = batch.len();

            let requests = batch
                .into_iter()
                .map(|keys| {
                    let delete = DeleteRequest::builder()
                        .set_key(Some(keys))
                        .build()
                        .map_err(|e| StorageError::Backend {
                            code: "InvalidRequest".to_string(),
                            message: e.to_string(),
                        })?;
                    Ok(WriteRequest::builder().delete_request(delete).build())
                })
                .collect::<Result<Vec<_>>>()?;

            let client = self.client.clone();
            let table = self.table_name.clone();
            let output = execute_with_retry("BatchWriteItem", self.retry, || {
                let request = client
                    .batch_write_item()
                    .request_items(table.clone(), requests.clone());
                async move {
                    request
                        .send()
                        .await
                        .map_err(|e| map_sdk_error("BatchWriteItem", e))
                }
            })
            .await?;

            // Throttled deletes come back as unprocessed; re-queue them so
            // the drain converges.
            let unprocessed = output
                .unprocessed_items
                .unwrap_or_default()
                .remove(&self.table_name)
                .unwrap_or_default();
            deleted += (batch_len - unprocessed.len()) as u64;
            for request in unprocessed {
                if let Some(delete) = request.delete_request {
                    pending.push(delete.key);
                }
            }
        }

        tracing::info!(table = %self.table_name, deleted, "table cleared");
        Ok(deleted)
    }

    async fn get_all(&self, prefix: &str) -> Result<Vec<Document>> {
        let plan = match KeyPrefix::parse(prefix)?.plan() {
            ListPlan::Query { pk, sk_prefix } => ReadPlan::Query {
                index: None,
                partition_key: pk,
                sort_key_prefix: Some(sk_prefix),
            },
            ListPlan::Scan { pk_prefix, sk_exact } => ReadPlan::Scan {
                pk_prefix: Some(pk_prefix),
                sk_exact: Some(sk_exact),
                keys_only: false,
            },
        };

        let items = drain(&self.client, &self.table_name, self.retry, &plan).await?;
        Self::sanitize_items(items)
    }

    async fn query_gsi(
        &self,
        index_name: &str,
        partition_key: &str,
        sort_key_prefix: Option<&str>,
    ) -> Result<Vec<Document>> {
        let index = SecondaryIndex::from_name(index_name).ok_or_else(|| {
            StorageError::InvalidQuery(format!("unknown secondary index '{index_name}'"))
        })?;

        let plan = ReadPlan::Query {
            index: Some(index),
            partition_key: partition_key.to_string(),
            sort_key_prefix: sort_key_prefix.map(str::to_string),
        };

        let items = drain(&self.client, &self.table_name, self.retry, &plan).await?;
        Self::sanitize_items(items)
    }
}
