//! Backend-independent storage contracts.
//!
//! The storage layer encodes four entity types (events, projects, prize
//! awards, users) into a single wide-column table using composite
//! partition/sort keys. This module holds everything a backend needs that
//! does not touch I/O: the key codec, the listing-prefix grammar, the
//! sparse secondary-index derivation, the physical record shape, the error
//! taxonomy, and the `StorageAdapter` trait itself.

mod error;
mod index;
mod keys;
mod prefix;
mod record;
mod traits;

pub use error::{Result, StorageError};
pub use index::{derive_index_keys, IndexKey, SecondaryIndex};
pub use keys::{EntityKey, PhysicalKey};
pub use prefix::{KeyPrefix, ListPlan};
pub use record::{
    sanitize, stamp_timestamps, to_physical_record, Document, CREATED_AT_FIELD,
    ENTITY_TYPE_FIELD, PK_FIELD, RESERVED_FIELDS, SK_FIELD, UPDATED_AT_FIELD,
};
pub use traits::{StorageAdapter, StorageAdapterExt};
