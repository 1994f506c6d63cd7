//! Listing-prefix grammar for `get_all`.
//!
//! A listing prefix always ends in a colon: `"event:"` lists every event,
//! `"project:evt_1:"` lists the projects under one event. The prefix shape
//! selects the read strategy: entity-root prefixes become table scans
//! filtered to one entity type, parent-scoped prefixes become partition
//! queries. Prefixes that do not map to a supported access pattern are
//! rejected with `InvalidQuery` before any backend call is made.

use super::error::{Result, StorageError};
use super::keys::{
    EVENT_PREFIX, METADATA_SK, PRIZE_AWARD_PREFIX, PROJECT_PREFIX, USER_PREFIX,
};

/// A parsed `get_all` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPrefix {
    /// `event:` — every event.
    Events,
    /// `user:` — every user.
    Users,
    /// `project:{eventId}:` — projects under one event.
    Projects { event_id: String },
    /// `prize-award:{eventId}:` or `prize-award:{eventId}:{prizeId}:` —
    /// prize awards under one event, optionally narrowed to one prize.
    PrizeAwards {
        event_id: String,
        prize_id: Option<String>,
    },
}

/// The physical read strategy for a listing, consumed by backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPlan {
    /// Full-table scan filtered to items whose PK starts with `pk_prefix`
    /// and whose SK equals `sk_exact`. Used for entity-root listings.
    Scan {
        pk_prefix: String,
        sk_exact: String,
    },
    /// Partition query: `PK = pk AND begins_with(SK, sk_prefix)`. Used for
    /// parent-scoped listings.
    Query { pk: String, sk_prefix: String },
}

impl KeyPrefix {
    /// Parses a listing prefix.
    ///
    /// Fails with `InvalidQuery` when the prefix lacks its trailing colon
    /// (a fully-qualified key belongs to `get`, not `get_all`), when a
    /// child-entity listing is missing its parent qualifier, or when the
    /// entity type is unknown.
    pub fn parse(prefix: &str) -> Result<Self> {
        let Some(body) = prefix.strip_suffix(':') else {
            return Err(StorageError::InvalidQuery(format!(
                "listing prefixes end with ':' (got '{prefix}'); use get for fully-qualified keys"
            )));
        };

        let segments: Vec<&str> = body.split(':').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(StorageError::InvalidQuery(format!(
                "empty segment in prefix '{prefix}'"
            )));
        }

        let entity_type = segments[0].to_ascii_lowercase();
        match (entity_type.as_str(), segments.len()) {
            ("event", 1) => Ok(KeyPrefix::Events),
            ("user", 1) => Ok(KeyPrefix::Users),
            ("project", 2) => Ok(KeyPrefix::Projects {
                event_id: segments[1].to_string(),
            }),
            ("prize-award", 2) => Ok(KeyPrefix::PrizeAwards {
                event_id: segments[1].to_string(),
                prize_id: None,
            }),
            ("prize-award", 3) => Ok(KeyPrefix::PrizeAwards {
                event_id: segments[1].to_string(),
                prize_id: Some(segments[2].to_string()),
            }),
            ("project", 1) => Err(StorageError::InvalidQuery(
                "project listings require an event id qualifier: 'project:{eventId}:'"
                    .to_string(),
            )),
            ("prize-award", 1) => Err(StorageError::InvalidQuery(
                "prize-award listings require an event id qualifier: 'prize-award:{eventId}:'"
                    .to_string(),
            )),
            ("event", _) | ("user", _) | ("project", _) | ("prize-award", _) => {
                Err(StorageError::InvalidQuery(format!(
                    "unsupported listing prefix '{prefix}'"
                )))
            }
            (other, _) => Err(StorageError::InvalidQuery(format!(
                "unrecognized entity type '{other}' in prefix '{prefix}'"
            ))),
        }
    }

    /// The read strategy for this listing.
    pub fn plan(&self) -> ListPlan {
        match self {
            KeyPrefix::Events => ListPlan::Scan {
                pk_prefix: EVENT_PREFIX.to_string(),
                sk_exact: METADATA_SK.to_string(),
            },
            KeyPrefix::Users => ListPlan::Scan {
                pk_prefix: USER_PREFIX.to_string(),
                sk_exact: METADATA_SK.to_string(),
            },
            KeyPrefix::Projects { event_id } => ListPlan::Query {
                pk: format!("{EVENT_PREFIX}{event_id}"),
                sk_prefix: PROJECT_PREFIX.to_string(),
            },
            KeyPrefix::PrizeAwards { event_id, prize_id } => ListPlan::Query {
                pk: format!("{EVENT_PREFIX}{event_id}"),
                sk_prefix: match prize_id {
                    Some(prize_id) => format!("{PRIZE_AWARD_PREFIX}{prize_id}#"),
                    None => PRIZE_AWARD_PREFIX.to_string(),
                },
            },
        }
    }
}
