//! Storage backend implementations.
//!
//! Concrete implementations of `showcase_core::storage::StorageAdapter`,
//! selected via feature flags:
//!
//! - `dynamodb`: AWS DynamoDB backend using `aws-sdk-dynamodb`
//! - `inmemory`: in-memory backend with identical single-table semantics,
//!   used by the contract tests

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::{ClientFactory, DynamoDbAdapter};

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryAdapter;
