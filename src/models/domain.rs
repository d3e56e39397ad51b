use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user gate on match requests
///
/// A user in `none` may request a match. `waiting` and `accept` both block
/// new requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "matching_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchingStatus {
    None,
    Waiting,
    Accept,
}

impl MatchingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingStatus::None => "none",
            MatchingStatus::Waiting => "waiting",
            MatchingStatus::Accept => "accept",
        }
    }

    /// True while the user holds a pending or accepted match
    pub fn is_active(&self) -> bool {
        matches!(self, MatchingStatus::Waiting | MatchingStatus::Accept)
    }
}

impl std::fmt::Display for MatchingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a single match record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Waiting,
    Accept,
    Reject,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Waiting => "waiting",
            MatchStatus::Accept => "accept",
            MatchStatus::Reject => "reject",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchStatus::Waiting)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender")]
pub enum Gender {
    #[serde(rename = "M")]
    #[sqlx(rename = "M")]
    Male,
    #[serde(rename = "F")]
    #[sqlx(rename = "F")]
    Female,
}

/// A user as seen by the matching core
///
/// Users are owned by the wider application. The core only reads them and
/// moves `matching_status` through the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(rename = "mbti")]
    pub personality_type: String,
    pub gender: Gender,
    pub matching_status: MatchingStatus,
}

/// A directed proposal from a requester to a responder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub requester_id: i64,
    pub responder_id: i64,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Build a fresh `waiting` request with a new id and timestamp
    pub fn new_request(requester_id: i64, responder_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            requester_id,
            responder_id,
            status: MatchStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    pub fn involves(&self, user_id: i64) -> bool {
        self.requester_id == user_id || self.responder_id == user_id
    }

    /// The party on the other side of this match from `user_id`
    pub fn counterpart_of(&self, user_id: i64) -> i64 {
        if self.requester_id == user_id {
            self.responder_id
        } else {
            self.requester_id
        }
    }
}

/// Parameters for the store-side candidate query
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub requester_id: i64,
    pub requester_gender: Gender,
    pub compatible_types: Vec<String>,
    pub limit: usize,
}
