//! Sparse secondary-index key derivation.
//!
//! Computed at write time, immediately before persistence. An index key
//! pair is present if and only if every attribute it depends on is present
//! on the item; entities lacking those attributes are simply absent from
//! that index. GSI1 is multiplexed across four access patterns (events by
//! organizer, projects by hacker, awards by project, users by email);
//! GSI2 serves users by role.

use serde_json::Value;

use super::keys::{
    EntityKey, EMAIL_PREFIX, EVENT_PREFIX, HACKER_PREFIX, ORGANIZER_PREFIX,
    PRIZE_AWARD_PREFIX, PROJECT_PREFIX, ROLE_PREFIX, USER_PREFIX,
};
use super::record::{
    Document, GSI1_PK_FIELD, GSI1_SK_FIELD, GSI2_PK_FIELD, GSI2_SK_FIELD,
};

/// The closed set of secondary indexes on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryIndex {
    Gsi1,
    Gsi2,
}

impl SecondaryIndex {
    /// Resolves an index by its backend name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GSI1" => Some(SecondaryIndex::Gsi1),
            "GSI2" => Some(SecondaryIndex::Gsi2),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SecondaryIndex::Gsi1 => "GSI1",
            SecondaryIndex::Gsi2 => "GSI2",
        }
    }

    pub fn pk_field(&self) -> &'static str {
        match self {
            SecondaryIndex::Gsi1 => GSI1_PK_FIELD,
            SecondaryIndex::Gsi2 => GSI2_PK_FIELD,
        }
    }

    pub fn sk_field(&self) -> &'static str {
        match self {
            SecondaryIndex::Gsi1 => GSI1_SK_FIELD,
            SecondaryIndex::Gsi2 => GSI2_SK_FIELD,
        }
    }
}

/// One derived alternate-access-pattern key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub index: SecondaryIndex,
    pub pk: String,
    pub sk: String,
}

/// Derives every applicable index key pair for an item.
///
/// The entity shape comes from the already-decoded key, not from a stored
/// discriminator. Rules:
///
/// - Event + `organizerId` → GSI1 `ORGANIZER#{organizerId}` / `EVENT#{id}`
/// - Project + `hackerId` → GSI1 `HACKER#{hackerId}` / `PROJECT#{id}`
/// - PrizeAward + `projectId` + `prizeId` → GSI1 `PROJECT#{projectId}` /
///   `PRIZE-AWARD#{prizeId}`
/// - User + `email` → GSI1 `EMAIL#{email}` / `USER#{id}`
/// - User + `role` → GSI2 `ROLE#{role}` / `USER#{id}` (independent of email)
pub fn derive_index_keys(key: &EntityKey, doc: &Document) -> Vec<IndexKey> {
    let mut keys = Vec::new();

    match key {
        EntityKey::Event { event_id } => {
            if let Some(organizer_id) = present(doc, "organizerId") {
                keys.push(IndexKey {
                    index: SecondaryIndex::Gsi1,
                    pk: format!("{ORGANIZER_PREFIX}{organizer_id}"),
                    sk: format!("{EVENT_PREFIX}{event_id}"),
                });
            }
        }
        EntityKey::Project { project_id, .. } => {
            if let Some(hacker_id) = present(doc, "hackerId") {
                keys.push(IndexKey {
                    index: SecondaryIndex::Gsi1,
                    pk: format!("{HACKER_PREFIX}{hacker_id}"),
                    sk: format!("{PROJECT_PREFIX}{project_id}"),
                });
            }
        }
        EntityKey::PrizeAward { .. } => {
            if let (Some(project_id), Some(prize_id)) =
                (present(doc, "projectId"), present(doc, "prizeId"))
            {
                keys.push(IndexKey {
                    index: SecondaryIndex::Gsi1,
                    pk: format!("{PROJECT_PREFIX}{project_id}"),
                    sk: format!("{PRIZE_AWARD_PREFIX}{prize_id}"),
                });
            }
        }
        EntityKey::User { user_id } => {
            if let Some(email) = present(doc, "email") {
                keys.push(IndexKey {
                    index: SecondaryIndex::Gsi1,
                    pk: format!("{EMAIL_PREFIX}{email}"),
                    sk: format!("{USER_PREFIX}{user_id}"),
                });
            }
            if let Some(role) = present(doc, "role") {
                keys.push(IndexKey {
                    index: SecondaryIndex::Gsi2,
                    pk: format!("{ROLE_PREFIX}{role}"),
                    sk: format!("{USER_PREFIX}{user_id}"),
                });
            }
        }
    }

    keys
}

/// A source attribute counts as present when it is a non-empty string.
fn present<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_event_with_organizer() {
        let key = EntityKey::parse("event:evt_1").unwrap();
        let keys = derive_index_keys(&key, &doc(json!({"organizerId": "org_1"})));

        assert_eq!(
            keys,
            vec![IndexKey {
                index: SecondaryIndex::Gsi1,
                pk: "ORGANIZER#org_1".to_string(),
                sk: "EVENT#evt_1".to_string(),
            }]
        );
    }

    #[test]
    fn test_event_without_organizer_yields_nothing() {
        let key = EntityKey::parse("event:evt_1").unwrap();
        assert!(derive_index_keys(&key, &doc(json!({"name": "HackMIT"}))).is_empty());
    }

    #[test]
    fn test_project_with_hacker() {
        let key = EntityKey::parse("project:evt_1:proj_1").unwrap();
        let keys = derive_index_keys(&key, &doc(json!({"hackerId": "hacker_9"})));

        assert_eq!(keys[0].pk, "HACKER#hacker_9");
        assert_eq!(keys[0].sk, "PROJECT#proj_1");
    }

    #[test]
    fn test_prize_award_needs_both_attributes() {
        let key = EntityKey::parse("prize-award:evt_1:prize_1:proj_1").unwrap();

        let both = derive_index_keys(
            &key,
            &doc(json!({"projectId": "proj_1", "prizeId": "prize_1"})),
        );
        assert_eq!(
            both,
            vec![IndexKey {
                index: SecondaryIndex::Gsi1,
                pk: "PROJECT#proj_1".to_string(),
                sk: "PRIZE-AWARD#prize_1".to_string(),
            }]
        );

        assert!(derive_index_keys(&key, &doc(json!({"projectId": "proj_1"}))).is_empty());
        assert!(derive_index_keys(&key, &doc(json!({"prizeId": "prize_1"}))).is_empty());
    }

    #[test]
    fn test_user_rules_are_independent() {
        let key = EntityKey::parse("user:user_101").unwrap();

        // Role only: GSI2 entry and no GSI1 entry at all.
        let role_only = derive_index_keys(&key, &doc(json!({"role": "organizer"})));
        assert_eq!(
            role_only,
            vec![IndexKey {
                index: SecondaryIndex::Gsi2,
                pk: "ROLE#organizer".to_string(),
                sk: "USER#user_101".to_string(),
            }]
        );

        let email_only = derive_index_keys(&key, &doc(json!({"email": "a@b.c"})));
        assert_eq!(email_only.len(), 1);
        assert_eq!(email_only[0].index, SecondaryIndex::Gsi1);
        assert_eq!(email_only[0].pk, "EMAIL#a@b.c");

        let both = derive_index_keys(
            &key,
            &doc(json!({"email": "a@b.c", "role": "organizer"})),
        );
        assert_eq!(both.len(), 2);
    }

    #[test]
    fn test_null_and_empty_values_count_as_absent() {
        let key = EntityKey::parse("user:user_101").unwrap();
        assert!(derive_index_keys(&key, &doc(json!({"email": null}))).is_empty());
        assert!(derive_index_keys(&key, &doc(json!({"email": ""}))).is_empty());
        assert!(derive_index_keys(&key, &doc(json!({"email": 42}))).is_empty());
    }

    #[test]
    fn test_index_resolution_by_name() {
        assert_eq!(SecondaryIndex::from_name("GSI1"), Some(SecondaryIndex::Gsi1));
        assert_eq!(SecondaryIndex::from_name("GSI2"), Some(SecondaryIndex::Gsi2));
        assert_eq!(SecondaryIndex::from_name("GSI3"), None);
        assert_eq!(SecondaryIndex::Gsi1.pk_field(), "GSI1PK");
        assert_eq!(SecondaryIndex::Gsi2.sk_field(), "GSI2SK");
    }
}
