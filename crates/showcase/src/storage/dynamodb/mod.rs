//! DynamoDB storage backend implementation.
//!
//! Implements `showcase_core::storage::StorageAdapter` over a single
//! wide-column table using `aws-sdk-dynamodb`.

mod adapter;
mod client;
mod conversions;
mod error;
mod pagination;
mod retry;

pub use adapter::DynamoDbAdapter;
pub use client::ClientFactory;
