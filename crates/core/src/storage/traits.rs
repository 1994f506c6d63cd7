use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::{Result, StorageError};
use super::record::Document;

/// The storage contract consumed by the domain services.
///
/// Keys are logical colon-delimited strings (`"project:evt_1:proj_1"`);
/// values are flat JSON documents. Implementations must never leak
/// physical key fields back to callers, and `set` is an upsert: callers
/// cannot distinguish create from update except through the preserved
/// `createdAt` field.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Point read. Returns `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Document>>;

    /// Upsert. Assigns `createdAt` on first write, preserves it afterwards,
    /// and refreshes `updatedAt` on every write.
    async fn set(&self, key: &str, value: Document) -> Result<()>;

    /// Hard delete. Idempotent: removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Destructive bulk delete of every item in the table. Intended for
    /// test/maintenance use only. Returns the number of items deleted.
    async fn clear(&self) -> Result<u64>;

    /// Lists every item matching a trailing-colon prefix, e.g. `"event:"`
    /// or `"project:evt_1:"`. Drives pagination to exhaustion and returns
    /// one materialized collection.
    async fn get_all(&self, prefix: &str) -> Result<Vec<Document>>;

    /// Queries a named secondary index by partition key and optional
    /// sort-key prefix.
    async fn query_gsi(
        &self,
        index_name: &str,
        partition_key: &str,
        sort_key_prefix: Option<&str>,
    ) -> Result<Vec<Document>>;
}

/// Typed convenience layer over [`StorageAdapter`].
///
/// Blanket-implemented so domain services can keep working with typed
/// structs while the adapter stays schemaless underneath.
#[async_trait]
pub trait StorageAdapterExt: StorageAdapter {
    async fn get_as<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(doc) => serde_json::from_value(Value::Object(doc))
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set_from<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        match value {
            Value::Object(doc) => self.set(key, doc).await,
            other => Err(StorageError::Serialization(format!(
                "storage values must serialize to JSON objects, got {other}"
            ))),
        }
    }

    async fn get_all_as<T>(&self, prefix: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get_all(prefix)
            .await?
            .into_iter()
            .map(|doc| {
                serde_json::from_value(Value::Object(doc))
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect()
    }
}

impl<S: StorageAdapter + ?Sized> StorageAdapterExt for S {}
