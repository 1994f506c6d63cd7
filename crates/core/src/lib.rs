//! Core storage contracts for the showcase project.
//!
//! This crate defines the backend-independent pieces of the single-table
//! storage design: the logical key codec, the secondary-index derivation
//! rules, the physical record shape, and the `StorageAdapter` trait that
//! concrete backends implement.

pub mod storage;
