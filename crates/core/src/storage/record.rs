//! Physical record shape.
//!
//! Every stored item carries the composite primary key, zero or more
//! derived secondary-index key pairs, an `entityType` tag, server-assigned
//! timestamps, and the caller's domain attributes flattened at the top
//! level. The key and tag fields are internal: every read path strips them
//! before data is handed back.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::index::IndexKey;
use super::keys::EntityKey;

/// A schemaless stored value: a flat JSON object.
pub type Document = serde_json::Map<String, Value>;

// ============================================================================
// Field names
// ============================================================================

pub const PK_FIELD: &str = "PK";
pub const SK_FIELD: &str = "SK";
pub const GSI1_PK_FIELD: &str = "GSI1PK";
pub const GSI1_SK_FIELD: &str = "GSI1SK";
pub const GSI2_PK_FIELD: &str = "GSI2PK";
pub const GSI2_SK_FIELD: &str = "GSI2SK";
pub const ENTITY_TYPE_FIELD: &str = "entityType";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Internal fields never returned to callers.
pub const RESERVED_FIELDS: [&str; 7] = [
    PK_FIELD,
    SK_FIELD,
    GSI1_PK_FIELD,
    GSI1_SK_FIELD,
    GSI2_PK_FIELD,
    GSI2_SK_FIELD,
    ENTITY_TYPE_FIELD,
];

// ============================================================================
// Record assembly
// ============================================================================

/// Removes every internal key field from a document read back from storage.
pub fn sanitize(doc: &mut Document) {
    for field in RESERVED_FIELDS {
        doc.remove(field);
    }
}

/// Stamps `createdAt`/`updatedAt` on a document about to be persisted.
///
/// `createdAt` is immutable once set: an update carries the existing value
/// forward and only refreshes `updatedAt`. Timestamps are RFC 3339 with
/// millisecond precision so they compare chronologically as strings.
pub fn stamp_timestamps(
    doc: &mut Document,
    existing_created_at: Option<String>,
    now: DateTime<Utc>,
) {
    let now = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let created_at = existing_created_at.unwrap_or_else(|| now.clone());
    doc.insert(CREATED_AT_FIELD.to_string(), Value::String(created_at));
    doc.insert(UPDATED_AT_FIELD.to_string(), Value::String(now));
}

/// Builds the full physical record: domain attributes plus primary key,
/// derived index keys, and the entity-type tag.
pub fn to_physical_record(key: &EntityKey, mut doc: Document, index_keys: &[IndexKey]) -> Document {
    let physical = key.encode();
    doc.insert(PK_FIELD.to_string(), Value::String(physical.pk));
    doc.insert(SK_FIELD.to_string(), Value::String(physical.sk));
    for index_key in index_keys {
        doc.insert(
            index_key.index.pk_field().to_string(),
            Value::String(index_key.pk.clone()),
        );
        doc.insert(
            index_key.index.sk_field().to_string(),
            Value::String(index_key.sk.clone()),
        );
    }
    doc.insert(
        ENTITY_TYPE_FIELD.to_string(),
        Value::String(key.entity_type().to_string()),
    );
    doc
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::index::derive_index_keys;
    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_sanitize_strips_every_reserved_field() {
        let mut record = doc(json!({
            "PK": "EVENT#evt_1",
            "SK": "METADATA",
            "GSI1PK": "ORGANIZER#org_1",
            "GSI1SK": "EVENT#evt_1",
            "GSI2PK": "ROLE#organizer",
            "GSI2SK": "USER#user_1",
            "entityType": "EVENT",
            "name": "HackMIT",
            "createdAt": "2025-01-01T00:00:00.000Z",
        }));

        sanitize(&mut record);

        for field in RESERVED_FIELDS {
            assert!(!record.contains_key(field), "{field} should be stripped");
        }
        assert_eq!(record["name"], json!("HackMIT"));
        assert_eq!(record["createdAt"], json!("2025-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_first_write_assigns_both_timestamps() {
        let mut record = doc(json!({"name": "HackMIT"}));
        let now = "2025-06-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();

        stamp_timestamps(&mut record, None, now);

        assert_eq!(record["createdAt"], json!("2025-06-01T12:00:00.000Z"));
        assert_eq!(record["updatedAt"], json!("2025-06-01T12:00:00.000Z"));
    }

    #[test]
    fn test_update_preserves_created_at() {
        let mut record = doc(json!({"name": "HackMIT 2.0"}));
        let later = "2025-06-02T12:00:00Z".parse::<DateTime<Utc>>().unwrap();

        stamp_timestamps(
            &mut record,
            Some("2025-06-01T12:00:00.000Z".to_string()),
            later,
        );

        assert_eq!(record["createdAt"], json!("2025-06-01T12:00:00.000Z"));
        assert_eq!(record["updatedAt"], json!("2025-06-02T12:00:00.000Z"));
    }

    #[test]
    fn test_physical_record_carries_keys_and_tag() {
        let key = EntityKey::parse("project:evt_1:proj_1").unwrap();
        let attrs = doc(json!({"title": "Solar Tracker", "hackerId": "hacker_9"}));
        let index_keys = derive_index_keys(&key, &attrs);

        let record = to_physical_record(&key, attrs, &index_keys);

        assert_eq!(record["PK"], json!("EVENT#evt_1"));
        assert_eq!(record["SK"], json!("PROJECT#proj_1"));
        assert_eq!(record["GSI1PK"], json!("HACKER#hacker_9"));
        assert_eq!(record["GSI1SK"], json!("PROJECT#proj_1"));
        assert_eq!(record["entityType"], json!("PROJECT"));
        assert_eq!(record["title"], json!("Solar Tracker"));
        assert!(!record.contains_key("GSI2PK"));
    }
}
