//! Logical/physical key codec.
//!
//! Logical keys are the caller-facing contract: colon-delimited strings such
//! as `project:evt_1:proj_1`. They are parsed into the closed `EntityKey`
//! sum type immediately at the boundary; all internal logic works against
//! that type and only serializes back to physical key strings at the final
//! call into the backend. Both directions are pure and `decode(encode(k))`
//! reproduces `k` for every valid key of each of the four shapes.

use std::fmt;

use super::error::{Result, StorageError};

// ============================================================================
// Key prefixes
// ============================================================================

pub const EVENT_PREFIX: &str = "EVENT#";
pub const PROJECT_PREFIX: &str = "PROJECT#";
pub const PRIZE_AWARD_PREFIX: &str = "PRIZE-AWARD#";
pub const USER_PREFIX: &str = "USER#";
pub const ORGANIZER_PREFIX: &str = "ORGANIZER#";
pub const HACKER_PREFIX: &str = "HACKER#";
pub const EMAIL_PREFIX: &str = "EMAIL#";
pub const ROLE_PREFIX: &str = "ROLE#";

/// Sort key for root aggregates (events, users).
pub const METADATA_SK: &str = "METADATA";

// ============================================================================
// Entity keys
// ============================================================================

/// A fully-qualified storage key for one of the four entity shapes.
///
/// The logical entity-type prefix and segment count uniquely determine the
/// physical key shape, so this enum is the single source of truth for both
/// directions of the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey {
    Event {
        event_id: String,
    },
    Project {
        event_id: String,
        project_id: String,
    },
    PrizeAward {
        event_id: String,
        prize_id: String,
        project_id: String,
    },
    User {
        user_id: String,
    },
}

/// The backing store's composite primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalKey {
    pub pk: String,
    pub sk: String,
}

impl EntityKey {
    /// Parses a logical key string.
    ///
    /// The entity type is matched case-insensitively; the segment count must
    /// match the type's fixed arity (`event`→2, `project`→3, `user`→2,
    /// `prize-award`→4, including the type itself) and every segment must be
    /// non-empty. A trailing colon is a listing prefix, not a key, and is
    /// rejected here.
    pub fn parse(key: &str) -> Result<Self> {
        let segments: Vec<&str> = key.split(':').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(StorageError::InvalidKey(format!(
                "empty segment in key '{key}'"
            )));
        }

        let entity_type = segments[0].to_ascii_lowercase();
        match (entity_type.as_str(), segments.len()) {
            ("event", 2) => Ok(EntityKey::Event {
                event_id: segments[1].to_string(),
            }),
            ("project", 3) => Ok(EntityKey::Project {
                event_id: segments[1].to_string(),
                project_id: segments[2].to_string(),
            }),
            ("prize-award", 4) => Ok(EntityKey::PrizeAward {
                event_id: segments[1].to_string(),
                prize_id: segments[2].to_string(),
                project_id: segments[3].to_string(),
            }),
            ("user", 2) => Ok(EntityKey::User {
                user_id: segments[1].to_string(),
            }),
            ("event", n) | ("user", n) => Err(StorageError::InvalidKey(format!(
                "'{entity_type}' keys take 2 segments, got {n}: '{key}'"
            ))),
            ("project", n) => Err(StorageError::InvalidKey(format!(
                "'project' keys take 3 segments, got {n}: '{key}'"
            ))),
            ("prize-award", n) => Err(StorageError::InvalidKey(format!(
                "'prize-award' keys take 4 segments, got {n}: '{key}'"
            ))),
            (other, _) => Err(StorageError::InvalidKey(format!(
                "unrecognized entity type '{other}' in key '{key}'"
            ))),
        }
    }

    /// Encodes this key into the physical `(PK, SK)` pair.
    pub fn encode(&self) -> PhysicalKey {
        match self {
            EntityKey::Event { event_id } => PhysicalKey {
                pk: format!("{EVENT_PREFIX}{event_id}"),
                sk: METADATA_SK.to_string(),
            },
            EntityKey::Project {
                event_id,
                project_id,
            } => PhysicalKey {
                pk: format!("{EVENT_PREFIX}{event_id}"),
                sk: format!("{PROJECT_PREFIX}{project_id}"),
            },
            EntityKey::PrizeAward {
                event_id,
                prize_id,
                project_id,
            } => PhysicalKey {
                pk: format!("{EVENT_PREFIX}{event_id}"),
                sk: format!("{PRIZE_AWARD_PREFIX}{prize_id}#{project_id}"),
            },
            EntityKey::User { user_id } => PhysicalKey {
                pk: format!("{USER_PREFIX}{user_id}"),
                sk: METADATA_SK.to_string(),
            },
        }
    }

    /// Reconstructs the entity key from a physical `(PK, SK)` pair.
    ///
    /// Fails with `InvalidKey` when the PK carries an unexpected number of
    /// `#`-delimited parts or the SK matches no known pattern.
    pub fn decode(pk: &str, sk: &str) -> Result<Self> {
        if let Some(user_id) = strip_single_part(pk, USER_PREFIX) {
            if sk != METADATA_SK {
                return Err(StorageError::InvalidKey(format!(
                    "unexpected sort key '{sk}' under user partition '{pk}'"
                )));
            }
            return Ok(EntityKey::User {
                user_id: user_id.to_string(),
            });
        }

        let event_id = strip_single_part(pk, EVENT_PREFIX).ok_or_else(|| {
            StorageError::InvalidKey(format!("unrecognized partition key '{pk}'"))
        })?;

        if sk == METADATA_SK {
            return Ok(EntityKey::Event {
                event_id: event_id.to_string(),
            });
        }
        if let Some(project_id) = strip_single_part(sk, PROJECT_PREFIX) {
            return Ok(EntityKey::Project {
                event_id: event_id.to_string(),
                project_id: project_id.to_string(),
            });
        }
        if let Some(rest) = sk.strip_prefix(PRIZE_AWARD_PREFIX) {
            let parts: Vec<&str> = rest.split('#').collect();
            if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
                return Err(StorageError::InvalidKey(format!(
                    "malformed prize-award sort key '{sk}'"
                )));
            }
            return Ok(EntityKey::PrizeAward {
                event_id: event_id.to_string(),
                prize_id: parts[0].to_string(),
                project_id: parts[1].to_string(),
            });
        }

        Err(StorageError::InvalidKey(format!(
            "unrecognized sort key '{sk}'"
        )))
    }

    /// Physical `entityType` tag stored alongside every record.
    pub fn entity_type(&self) -> &'static str {
        match self {
            EntityKey::Event { .. } => "EVENT",
            EntityKey::Project { .. } => "PROJECT",
            EntityKey::PrizeAward { .. } => "PRIZE-AWARD",
            EntityKey::User { .. } => "USER",
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Event { event_id } => write!(f, "event:{event_id}"),
            EntityKey::Project {
                event_id,
                project_id,
            } => write!(f, "project:{event_id}:{project_id}"),
            EntityKey::PrizeAward {
                event_id,
                prize_id,
                project_id,
            } => write!(f, "prize-award:{event_id}:{prize_id}:{project_id}"),
            EntityKey::User { user_id } => write!(f, "user:{user_id}"),
        }
    }
}

impl std::str::FromStr for EntityKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        EntityKey::parse(s)
    }
}

/// Strips `prefix` and returns the remainder when it contains no further
/// `#` separators.
fn strip_single_part<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    value
        .strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && !rest.contains('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_key_encoding() {
        let key = EntityKey::parse("event:evt_123").unwrap();
        let physical = key.encode();
        assert_eq!(physical.pk, "EVENT#evt_123");
        assert_eq!(physical.sk, "METADATA");
    }

    #[test]
    fn test_project_key_encoding() {
        let key = EntityKey::parse("project:evt_123:proj_789").unwrap();
        let physical = key.encode();
        assert_eq!(physical.pk, "EVENT#evt_123");
        assert_eq!(physical.sk, "PROJECT#proj_789");
    }

    #[test]
    fn test_prize_award_key_encoding() {
        let key = EntityKey::parse("prize-award:evt_123:prize_1:proj_456").unwrap();
        let physical = key.encode();
        assert_eq!(physical.pk, "EVENT#evt_123");
        assert_eq!(physical.sk, "PRIZE-AWARD#prize_1#proj_456");
    }

    #[test]
    fn test_user_key_encoding() {
        let key = EntityKey::parse("user:user_101").unwrap();
        let physical = key.encode();
        assert_eq!(physical.pk, "USER#user_101");
        assert_eq!(physical.sk, "METADATA");
    }

    #[test]
    fn test_round_trip_law() {
        for logical in [
            "event:evt_123",
            "project:evt_123:proj_789",
            "user:user_101",
            "prize-award:evt_123:prize_1:proj_456",
        ] {
            let key = EntityKey::parse(logical).unwrap();
            let physical = key.encode();
            let decoded = EntityKey::decode(&physical.pk, &physical.sk).unwrap();
            assert_eq!(decoded, key);
            assert_eq!(decoded.to_string(), logical);
        }
    }

    #[test]
    fn test_entity_type_is_case_insensitive() {
        let key = EntityKey::parse("EVENT:evt_1").unwrap();
        assert_eq!(key, EntityKey::parse("event:evt_1").unwrap());
        assert!(EntityKey::parse("Prize-Award:e:p:j").is_ok());
    }

    #[test]
    fn test_arity_mismatch_is_rejected() {
        assert!(matches!(
            EntityKey::parse("event:evt_1:extra"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            EntityKey::parse("project:evt_1"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            EntityKey::parse("prize-award:evt_1:prize_1"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_unknown_entity_type_is_rejected() {
        let err = EntityKey::parse("banana:b_1").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        assert!(err.to_string().contains("banana"));
    }

    #[test]
    fn test_empty_segments_are_rejected() {
        assert!(EntityKey::parse("event:").is_err());
        assert!(EntityKey::parse("project:evt_1:").is_err());
        assert!(EntityKey::parse(":evt_1").is_err());
        assert!(EntityKey::parse("").is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_shapes() {
        assert!(EntityKey::decode("WIDGET#w_1", "METADATA").is_err());
        assert!(EntityKey::decode("EVENT#evt_1", "WIDGET#w_1").is_err());
        assert!(EntityKey::decode("EVENT#evt_1#extra", "METADATA").is_err());
        assert!(EntityKey::decode("EVENT#evt_1", "PRIZE-AWARD#only_one").is_err());
        assert!(EntityKey::decode("EVENT#evt_1", "PRIZE-AWARD#a#b#c").is_err());
        assert!(EntityKey::decode("USER#user_1", "PROJECT#proj_1").is_err());
    }

    #[test]
    fn test_entity_type_tags() {
        assert_eq!(EntityKey::parse("event:e").unwrap().entity_type(), "EVENT");
        assert_eq!(
            EntityKey::parse("prize-award:e:p:j").unwrap().entity_type(),
            "PRIZE-AWARD"
        );
        assert_eq!(EntityKey::parse("user:u").unwrap().entity_type(), "USER");
    }
}
