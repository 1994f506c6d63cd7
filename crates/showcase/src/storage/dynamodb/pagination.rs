//! Query/scan paginator.
//!
//! Drives a backend list-style read to completion across continuation
//! tokens and returns one materialized collection of raw items. The page
//! loop passes the previous page's `last_evaluated_key` as the next page's
//! `exclusive_start_key` and terminates when the backend stops returning
//! one; each page fetch goes through the resilient executor. Callers never
//! see the token mechanism.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use showcase_core::storage::{Result, SecondaryIndex, PK_FIELD, SK_FIELD};

use super::error::map_sdk_error;
use super::retry::{execute_with_retry, RetryPolicy};

pub(crate) type Item = HashMap<String, AttributeValue>;

/// How a multi-page read is issued against the table.
#[derive(Debug, Clone)]
pub(crate) enum ReadPlan {
    /// Partition-scoped query, optionally against a named secondary index:
    /// `pk_field = :pk [AND begins_with(sk_field, :sk)]`.
    Query {
        index: Option<SecondaryIndex>,
        partition_key: String,
        sort_key_prefix: Option<String>,
    },
    /// Filtered full-table scan. `keys_only` projects just the primary key
    /// pair (used by `clear`).
    Scan {
        pk_prefix: Option<String>,
        sk_exact: Option<String>,
        keys_only: bool,
    },
}

/// Runs the plan to exhaustion, accumulating every page's items.
pub(crate) async fn drain(
    client: &Client,
    table: &str,
    policy: RetryPolicy,
    plan: &ReadPlan,
) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut cursor: Option<Item> = None;
    let mut pages: u32 = 0;

    loop {
        let (page_items, next) = match plan {
            ReadPlan::Query { .. } => fetch_query_page(client, table, policy, plan, cursor).await?,
            ReadPlan::Scan { .. } => fetch_scan_page(client, table, policy, plan, cursor).await?,
        };
        pages += 1;
        items.extend(page_items);
        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::debug!(table, pages, items = items.len(), "paginated read drained");
    Ok(items)
}

async fn fetch_query_page(
    client: &Client,
    table: &str,
    policy: RetryPolicy,
    plan: &ReadPlan,
    cursor: Option<Item>,
) -> Result<(Vec<Item>, Option<Item>)> {
    let ReadPlan::Query {
        index,
        partition_key,
        sort_key_prefix,
    } = plan
    else {
        unreachable!("fetch_query_page called with a scan plan");
    };

    let (pk_field, sk_field) = match index {
        Some(index) => (index.pk_field(), index.sk_field()),
        None => (PK_FIELD, SK_FIELD),
    };

    let mut builder = client
        .query()
        .table_name(table)
        .set_index_name(index.map(|i| i.name().to_string()))
        .expression_attribute_values(":pk", AttributeValue::S(partition_key.clone()))
        .set_exclusive_start_key(cursor);

    builder = match sort_key_prefix {
        Some(prefix) => builder
            .key_condition_expression(format!(
                "{pk_field} = :pk AND begins_with({sk_field}, :sk)"
            ))
            .expression_attribute_values(":sk", AttributeValue::S(prefix.clone())),
        None => builder.key_condition_expression(format!("{pk_field} = :pk")),
    };

    let output = execute_with_retry("Query", policy, || {
        let builder = builder.clone();
        async move { builder.send().await.map_err(|e| map_sdk_error("Query", e)) }
    })
    .await?;

    Ok((
        output.items.unwrap_or_default(),
        output.last_evaluated_key.filter(|key| !key.is_empty()),
    ))
}

async fn fetch_scan_page(
    client: &Client,
    table: &str,
    policy: RetryPolicy,
    plan: &ReadPlan,
    cursor: Option<Item>,
) -> Result<(Vec<Item>, Option<Item>)> {
    let ReadPlan::Scan {
        pk_prefix,
        sk_exact,
        keys_only,
    } = plan
    else {
        unreachable!("fetch_scan_page called with a query plan");
    };

    let mut builder = client
        .scan()
        .table_name(table)
        .set_exclusive_start_key(cursor);

    let mut conditions = Vec::new();
    if let Some(prefix) = pk_prefix {
        conditions.push(format!("begins_with({PK_FIELD}, :pk_prefix)"));
        builder = builder.expression_attribute_values(
            ":pk_prefix",
            AttributeValue::S(prefix.clone()),
        );
    }
    if let Some(sk) = sk_exact {
        conditions.push(format!("{SK_FIELD} = :sk"));
        builder = builder.expression_attribute_values(":sk", AttributeValue::S(sk.clone()));
    }
    if !conditions.is_empty() {
        builder = builder.filter_expression(conditions.join(" AND "));
    }
    if *keys_only {
        builder = builder.projection_expression(format!("{PK_FIELD}, {SK_FIELD}"));
    }

    let output = execute_with_retry("Scan", policy, || {
        let builder = builder.clone();
        async move { builder.send().await.map_err(|e| map_sdk_error("Scan", e)) }
    })
    .await?;

    Ok((
        output.items.unwrap_or_default(),
        output.last_evaluated_key.filter(|key| !key.is_empty()),
    ))
}
