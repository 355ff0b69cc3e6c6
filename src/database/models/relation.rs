//! Directed user -> counterpart relations.

use serde::{Deserialize, Serialize};

/// What the requester decided about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Favorite,
    Like,
    /// Blocked candidates are never offered again.
    Block,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Like => "like",
            Self::Block => "block",
        }
    }
}

/// One stored relation. Unique per (user_id, counterpart_id, kind).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub user_id: i64,
    pub counterpart_id: i64,
    pub kind: RelationKind,
    /// Unix timestamp (millis) of the first insert.
    pub created_at: i64,
}

impl Relation {
    pub fn new(user_id: i64, counterpart_id: i64, kind: RelationKind) -> Self {
        Self {
            user_id,
            counterpart_id,
            kind,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
