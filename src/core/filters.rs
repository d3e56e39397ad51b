use crate::core::compatibility::is_compatible;
use crate::models::{MatchingStatus, User};

/// Compatibility tier of a candidate relative to the requester
///
/// Ordered so that `Compatible < Incompatible`; sorting ascending puts the
/// preferred tier first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Compatible,
    Incompatible,
}

/// Check whether `candidate` may appear in `requester`'s shortlist
///
/// Eligible candidates are free (`none`), of the other gender, and not
/// the requester.
#[inline]
pub fn is_eligible(requester: &User, candidate: &User) -> bool {
    if candidate.id == requester.id {
        return false;
    }

    if candidate.gender == requester.gender {
        return false;
    }

    candidate.matching_status == MatchingStatus::None
}

#[inline]
pub fn compatibility_tier(requester: &User, candidate: &User) -> Tier {
    if is_compatible(&requester.personality_type, &candidate.personality_type) {
        Tier::Compatible
    } else {
        Tier::Incompatible
    }
}
