use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to propose a match to another user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequestBody {
    #[validate(range(min = 1))]
    #[serde(alias = "partnerId")]
    pub partner_id: i64,
}

/// Responder's decision on a pending request
///
/// `match_id` carries the requester's user id, not the match record id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchResponseBody {
    #[validate(range(min = 1))]
    #[serde(alias = "matchId", alias = "requester_id")]
    pub match_id: i64,
    pub accept: bool,
}
