//! In-memory storage backend implementation.

mod adapter;

pub use adapter::InMemoryAdapter;
