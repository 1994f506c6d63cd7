//! In-memory storage adapter.
//!
//! Implements the same single-table semantics as the DynamoDB backend
//! (same key codec, index derivation, record shape, sanitization) over a
//! `BTreeMap` keyed by the physical `(PK, SK)` pair. Used by the contract
//! tests; data is lost when the adapter is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use showcase_core::storage::{
    derive_index_keys, sanitize, stamp_timestamps, to_physical_record, Document, EntityKey,
    KeyPrefix, ListPlan, Result, SecondaryIndex, StorageAdapter, StorageError, CREATED_AT_FIELD,
};

/// In-memory single-table adapter.
///
/// Stores full physical records, internal key fields included, so reads
/// exercise the same sanitization path as the real backend. Thread-safe
/// via `Arc<RwLock<_>>`; clones share the table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdapter {
    items: Arc<RwLock<BTreeMap<(String, String), Document>>>,
}

impl InMemoryAdapter {
    /// Creates a new empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    fn string_field(doc: &Document, field: &str) -> Option<String> {
        doc.get(field).and_then(Value::as_str).map(str::to_string)
    }
}

#[async_trait]
impl StorageAdapter for InMemoryAdapter {
    async fn get(&self, key: &str) -> Result<Option<Document>> {
        let physical = EntityKey::parse(key)?.encode();
        let items = self.items.read().await;
        Ok(items.get(&(physical.pk, physical.sk)).cloned().map(|mut doc| {
            sanitize(&mut doc);
            doc
        }))
    }

    async fn set(&self, key: &str, value: Document) -> Result<()> {
        let entity_key = EntityKey::parse(key)?;
        let physical = entity_key.encode();
        let mut items = self.items.write().await;

        let existing_created_at = items
            .get(&(physical.pk.clone(), physical.sk.clone()))
            .and_then(|doc| Self::string_field(doc, CREATED_AT_FIELD));

        let mut doc = value;
        stamp_timestamps(&mut doc, existing_created_at, Utc::now());
        let index_keys = derive_index_keys(&entity_key, &doc);
        let record = to_physical_record(&entity_key, doc, &index_keys);

        items.insert((physical.pk, physical.sk), record);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let physical = EntityKey::parse(key)?.encode();
        self.items.write().await.remove(&(physical.pk, physical.sk));
        Ok(())
    }

    async fn clear(&self) -> Result<u64> {
        let mut items = self.items.write().await;
        let deleted = items.len() as u64;
        items.clear();
        Ok(deleted)
    }

    async fn get_all(&self, prefix: &str) -> Result<Vec<Document>> {
        let plan = KeyPrefix::parse(prefix)?.plan();
        let items = self.items.read().await;

        // BTreeMap iteration keeps results ordered by (PK, SK).
        let matched = items.iter().filter(|((pk, sk), _)| match &plan {
            ListPlan::Scan { pk_prefix, sk_exact } => {
                pk.starts_with(pk_prefix.as_str()) && sk == sk_exact
            }
            ListPlan::Query { pk: want, sk_prefix } => {
                pk == want && sk.starts_with(sk_prefix.as_str())
            }
        });

        Ok(matched
            .map(|(_, doc)| {
                let mut doc = doc.clone();
                sanitize(&mut doc);
                doc
            })
            .collect())
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

        let items = self.items.read().await;
        let mut matched: Vec<(String, Document)> = items
            .values()
            .filter_map(|doc| {
                let pk = Self::string_field(doc, index.pk_field())?;
                let sk = Self::string_field(doc, index.sk_field())?;
                if pk != partition_key {
                    return None;
                }
                if let Some(prefix) = sort_key_prefix {
                    if !sk.starts_with(prefix) {
                        return None;
                    }
                }
                Some((sk, doc.clone()))
            })
            .collect();

        // Index queries return items in sort-key order, like the backend.
        matched.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(matched
            .into_iter()
            .map(|(_, mut doc)| {
                sanitize(&mut doc);
                doc
            })
            .collect())
    }
}
