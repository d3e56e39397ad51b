use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::compatibility::{compatible_types, is_known_type};
use crate::core::filters::{compatibility_tier, is_eligible, Tier};
use crate::error::MatchingError;
use crate::models::{CandidateQuery, User};
use crate::services::MatchStore;

pub const DEFAULT_SHORTLIST_SIZE: usize = 4;
pub const DEFAULT_CANDIDATE_POOL_SIZE: usize = 64;

/// Builds candidate shortlists and resolves a user's current partner
///
/// # Ranking
/// 1. Drop ineligible candidates (self, same gender, not `none`)
/// 2. Split into compatible and incompatible tiers
/// 3. Shuffle each tier independently
/// 4. Concatenate and keep the first `shortlist_size`
#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector {
    shortlist_size: usize,
    pool_size: usize,
}

impl CandidateSelector {
    /// `pool_size` is raised to `shortlist_size` if smaller
    pub fn new(shortlist_size: usize, pool_size: usize) -> Self {
        Self {
            shortlist_size,
            pool_size: pool_size.max(shortlist_size),
        }
    }

    /// Rank already-fetched candidates for `requester`
    pub fn rank<R: Rng + ?Sized>(&self, requester: &User, candidates: Vec<User>, rng: &mut R) -> Vec<User> {
        let (mut compatible, mut others): (Vec<User>, Vec<User>) = candidates
            .into_iter()
            .filter(|candidate| is_eligible(requester, candidate))
            .partition(|candidate| compatibility_tier(requester, candidate) == Tier::Compatible);

        compatible.shuffle(rng);
        others.shuffle(rng);

        compatible.extend(others);
        compatible.truncate(self.shortlist_size);
        compatible
    }

    /// Shortlist of partners for `requester`
    ///
    /// An empty shortlist is reported as `NotFound`.
    pub async fn list_candidates<S: MatchStore>(
        &self,
        store: &S,
        requester: &User,
    ) -> Result<Vec<User>, MatchingError> {
        if !is_known_type(&requester.personality_type) {
            tracing::warn!(
                "User {} has unknown personality type {:?}; ranking without a compatible tier",
                requester.id,
                requester.personality_type
            );
        }

        let query = CandidateQuery {
            requester_id: requester.id,
            requester_gender: requester.gender,
            compatible_types: compatible_types(&requester.personality_type)
                .iter()
                .map(|code| code.to_string())
                .collect(),
            limit: self.pool_size,
        };

        let pool = store.query_candidates(&query).await?;
        let pool_len = pool.len();
        let shortlist = self.rank(requester, pool, &mut rand::thread_rng());

        if shortlist.is_empty() {
            tracing::info!("No eligible candidates for user {}", requester.id);
            return Err(MatchingError::NotFound("No matching users found".to_string()));
        }

        tracing::debug!(
            "Shortlisted {} of {} candidates for user {}",
            shortlist.len(),
            pool_len,
            requester.id
        );

        Ok(shortlist)
    }

    /// The other party of `user`'s most recent match, whatever its status
    pub async fn active_partner<S: MatchStore>(&self, store: &S, user: &User) -> Result<User, MatchingError> {
        let latest = store
            .latest_match_for(user.id)
            .await?
            .ok_or_else(|| MatchingError::NotFound("No matching partner found".to_string()))?;

        let partner_id = latest.counterpart_of(user.id);

        store.get_user(partner_id).await?.ok_or_else(|| {
            tracing::warn!(
                "Match {} references missing user {}",
                latest.id,
                partner_id
            );
            MatchingError::NotFound("Matching partner not found".to_string())
        })
    }
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(DEFAULT_SHORTLIST_SIZE, DEFAULT_CANDIDATE_POOL_SIZE)
    }
}
