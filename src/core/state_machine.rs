//! Legal transitions of the matching lifecycle.
//!
//! ```text
//! none    --request-->        waiting
//! waiting --accept-->         accept
//! waiting --reject-->         waiting   (unless release_on_reject)
//! accept  -- no transition in scope --
//! ```
//!
//! Functions here are pure: they validate a proposed transition against the
//! current state and describe the writes. The ledger applies those writes
//! inside a single store transaction.

use crate::error::MatchingError;
use crate::models::{Match, MatchStatus, MatchingStatus, User};

/// The responder's decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl From<bool> for Decision {
    fn from(accept: bool) -> Self {
        if accept {
            Decision::Accept
        } else {
            Decision::Reject
        }
    }
}

/// What to do with user statuses when a request is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectPolicy {
    /// Leave both parties as they are; the requester stays `waiting`
    #[default]
    KeepStatus,
    /// Return the requester to `none` so they can request again
    ReleaseRequester,
}

/// Whether accepting requires the responder to be free
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptPolicy {
    /// Accept regardless of the responder's own status
    #[default]
    Unconditional,
    /// Refuse with `Conflict` unless the responder is `none`
    RequireFreeResponder,
}

/// Writes produced by resolving a pending match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub match_status: MatchStatus,
    pub requester_status: Option<MatchingStatus>,
    pub responder_status: Option<MatchingStatus>,
}

/// Gate for `requestMatch`: returns the requester's next status
pub fn request(requester: &User, partner_id: i64) -> Result<MatchingStatus, MatchingError> {
    if partner_id == requester.id {
        return Err(MatchingError::InvalidRequest(
            "You cannot request a match with yourself".to_string(),
        ));
    }

    if requester.matching_status.is_active() {
        return Err(MatchingError::Conflict(
            "You already have a pending or accepted match".to_string(),
        ));
    }

    Ok(MatchingStatus::Waiting)
}

/// Gate for `respondToMatch` on a match already owned by `responder`
///
/// Under [`AcceptPolicy::RequireFreeResponder`] a responder who is already
/// `waiting` or `accept` may only reject. Rejecting is always allowed.
pub fn resolve(
    pending: &Match,
    responder: &User,
    decision: Decision,
    on_accept: AcceptPolicy,
    on_reject: RejectPolicy,
) -> Result<Resolution, MatchingError> {
    if pending.responder_id != responder.id {
        return Err(MatchingError::Unauthorized(
            "Match request not found or you are not authorized to respond".to_string(),
        ));
    }

    if pending.status.is_terminal() {
        return Err(MatchingError::Conflict(format!(
            "Match request already resolved as {}",
            pending.status
        )));
    }

    match decision {
        Decision::Accept => {
            if on_accept == AcceptPolicy::RequireFreeResponder && responder.matching_status.is_active() {
                return Err(MatchingError::Conflict(
                    "You already have a pending or accepted match".to_string(),
                ));
            }
            Ok(Resolution {
                match_status: MatchStatus::Accept,
                requester_status: Some(MatchingStatus::Accept),
                responder_status: Some(MatchingStatus::Accept),
            })
        }
        Decision::Reject => Ok(Resolution {
            match_status: MatchStatus::Reject,
            requester_status: match on_reject {
                RejectPolicy::KeepStatus => None,
                RejectPolicy::ReleaseRequester => Some(MatchingStatus::None),
            },
            responder_status: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn user(id: i64, status: MatchingStatus) -> User {
        User {
            id,
            name: format!("User {}", id),
            personality_type: "INFP".to_string(),
            gender: if id % 2 == 0 { Gender::Female } else { Gender::Male },
            matching_status: status,
        }
    }

    #[test]
    fn test_request_from_none() {
        let a = user(1, MatchingStatus::None);
        assert_eq!(request(&a, 2).unwrap(), MatchingStatus::Waiting);
    }

    #[test]
    fn test_request_blocked_while_active() {
        for status in [MatchingStatus::Waiting, MatchingStatus::Accept] {
            let a = user(1, status);
            assert!(matches!(request(&a, 2), Err(MatchingError::Conflict(_))));
        }
    }

    #[test]
    fn test_request_self() {
        let a = user(1, MatchingStatus::None);
        assert!(matches!(request(&a, 1), Err(MatchingError::InvalidRequest(_))));
    }

    #[test]
    fn test_accept_updates_both() {
        let b = user(2, MatchingStatus::None);
        let m = Match::new_request(1, 2);
        let r = resolve(&m, &b, Decision::Accept, AcceptPolicy::default(), RejectPolicy::default()).unwrap();
        assert_eq!(r.match_status, MatchStatus::Accept);
        assert_eq!(r.requester_status, Some(MatchingStatus::Accept));
        assert_eq!(r.responder_status, Some(MatchingStatus::Accept));
    }

    #[test]
    fn test_reject_keeps_statuses() {
        let b = user(2, MatchingStatus::None);
        let m = Match::new_request(1, 2);
        let r = resolve(&m, &b, Decision::Reject, AcceptPolicy::default(), RejectPolicy::KeepStatus).unwrap();
        assert_eq!(r.match_status, MatchStatus::Reject);
        assert_eq!(r.requester_status, None);
        assert_eq!(r.responder_status, None);
    }

    #[test]
    fn test_reject_with_release() {
        let b = user(2, MatchingStatus::None);
        let m = Match::new_request(1, 2);
        let r = resolve(&m, &b, Decision::Reject, AcceptPolicy::default(), RejectPolicy::ReleaseRequester).unwrap();
        assert_eq!(r.requester_status, Some(MatchingStatus::None));
        assert_eq!(r.responder_status, None);
    }

    #[test]
    fn test_wrong_responder() {
        let c = user(3, MatchingStatus::None);
        let m = Match::new_request(1, 2);
        assert!(matches!(
            resolve(&m, &c, Decision::Accept, AcceptPolicy::default(), RejectPolicy::default()),
            Err(MatchingError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_resolved_match_is_final() {
        let b = user(2, MatchingStatus::None);
        let mut m = Match::new_request(1, 2);
        m.status = MatchStatus::Reject;
        assert!(matches!(
            resolve(&m, &b, Decision::Accept, AcceptPolicy::default(), RejectPolicy::default()),
            Err(MatchingError::Conflict(_))
        ));
    }

    #[test]
    fn test_waiting_responder_accepts_by_default() {
        let b = user(2, MatchingStatus::Waiting);
        let m = Match::new_request(1, 2);
        let r = resolve(&m, &b, Decision::Accept, AcceptPolicy::default(), RejectPolicy::default()).unwrap();
        assert_eq!(r.match_status, MatchStatus::Accept);
        assert_eq!(r.requester_status, Some(MatchingStatus::Accept));
        assert_eq!(r.responder_status, Some(MatchingStatus::Accept));
    }

    #[test]
    fn test_busy_responder_refused_when_free_responder_required() {
        let b = user(2, MatchingStatus::Accept);
        let m = Match::new_request(1, 2);
        assert!(matches!(
            resolve(&m, &b, Decision::Accept, AcceptPolicy::RequireFreeResponder, RejectPolicy::default()),
            Err(MatchingError::Conflict(_))
        ));
        assert!(resolve(&m, &b, Decision::Reject, AcceptPolicy::RequireFreeResponder, RejectPolicy::default()).is_ok());
    }

    #[test]
    fn test_decision_from_bool() {
        assert_eq!(Decision::from(true), Decision::Accept);
        assert_eq!(Decision::from(false), Decision::Reject);
    }
}
