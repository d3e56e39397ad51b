use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{CandidateQuery, Match, MatchStatus, MatchingStatus, User};
use crate::services::store::{LedgerTx, MatchStore, StoreError};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    // Insertion order doubles as a tie-breaker for equal timestamps
    matches: Vec<Match>,
}

impl MemoryState {
    fn latest_match_for(&self, user_id: i64) -> Option<&Match> {
        self.matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.involves(user_id))
            .max_by_key(|(seq, m)| (m.created_at, *seq))
            .map(|(_, m)| m)
    }
}

/// In-process store for tests and local runs
///
/// A transaction takes the store-wide lock and works on a private copy of
/// the state; `commit` swaps the copy in.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let state = MemoryState {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            matches: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Every match the store holds, oldest first
    pub async fn matches(&self) -> Vec<Match> {
        self.state.lock().await.matches.clone()
    }
}

impl MatchStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = (*guard).clone();
        Ok(MemoryTx { guard, staged })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let state = self.state.lock().await;

        let mut candidates: Vec<User> = state
            .users
            .values()
            .filter(|candidate| {
                candidate.id != query.requester_id
                    && candidate.gender != query.requester_gender
                    && candidate.matching_status == MatchingStatus::None
            })
            .cloned()
            .collect();
        // Stable sort keeps id order within a tier; the selector shuffles
        candidates.sort_by_key(|candidate| !query.compatible_types.contains(&candidate.personality_type));
        candidates.truncate(query.limit);

        Ok(candidates)
    }

    async fn latest_match_for(&self, user_id: i64) -> Result<Option<Match>, StoreError> {
        Ok(self.state.lock().await.latest_match_for(user_id).cloned())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

impl LedgerTx for MemoryTx {
    async fn lock_user(&mut self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.staged.users.get(&user_id).cloned())
    }

    async fn get_user(&mut self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.staged.users.get(&user_id).cloned())
    }

    async fn lock_pending_match(
        &mut self,
        requester_id: i64,
        responder_id: i64,
    ) -> Result<Option<Match>, StoreError> {
        Ok(self
            .staged
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| {
                m.requester_id == requester_id
                    && m.responder_id == responder_id
                    && m.status == MatchStatus::Waiting
            })
            .max_by_key(|(seq, m)| (m.created_at, *seq))
            .map(|(_, m)| m.clone()))
    }

    async fn insert_match(&mut self, record: &Match) -> Result<(), StoreError> {
        if self.staged.matches.iter().any(|m| m.id == record.id) {
            return Err(StoreError::Corrupt(format!("duplicate match id {}", record.id)));
        }
        self.staged.matches.push(record.clone());
        Ok(())
    }

    async fn set_match_status(&mut self, match_id: Uuid, status: MatchStatus) -> Result<(), StoreError> {
        let record = self
            .staged
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StoreError::Corrupt(format!("match {} vanished", match_id)))?;
        record.status = status;
        Ok(())
    }

    async fn set_matching_status(
        &mut self,
        user_ids: &[i64],
        status: MatchingStatus,
    ) -> Result<u64, StoreError> {
        let mut updated = 0;
        for id in user_ids {
            if let Some(user) = self.staged.users.get_mut(id) {
                user.matching_status = status;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryTx { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}
