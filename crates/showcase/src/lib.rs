//! Storage backends for the showcase single-table design.
//!
//! The contract lives in `showcase_core::storage`; this crate provides the
//! DynamoDB implementation (feature `dynamodb`) and an in-memory
//! implementation with the same semantics for tests (feature `inmemory`).

pub mod config;
pub mod storage;

pub use config::StorageConfig;
