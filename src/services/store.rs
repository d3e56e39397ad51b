//! Storage seam for the matching core.
//!
//! Reads that need no isolation go through [`MatchStore`] directly. Every
//! check-then-write sequence runs inside a [`LedgerTx`], which holds the
//! rows it locked until `commit` or drop. Dropping a transaction without
//! committing discards its writes.
#![allow(async_fn_in_trait)]

use thiserror::Error;
use uuid::Uuid;

use crate::models::{CandidateQuery, Match, MatchStatus, MatchingStatus, User};

/// Errors raised by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Data integrity error: {0}")]
    Corrupt(String),
}

pub trait MatchStore {
    type Tx: LedgerTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    /// Eligible candidates for `query`, compatible ones first, at most
    /// `query.limit` rows
    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError>;

    /// Most recently created match the user is party to, in any status
    async fn latest_match_for(&self, user_id: i64) -> Result<Option<Match>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

pub trait LedgerTx {
    /// Read a user and hold its row until the transaction ends
    async fn lock_user(&mut self, user_id: i64) -> Result<Option<User>, StoreError>;

    async fn get_user(&mut self, user_id: i64) -> Result<Option<User>, StoreError>;

    /// Newest `waiting` match from `requester_id` to `responder_id`, locked
    async fn lock_pending_match(
        &mut self,
        requester_id: i64,
        responder_id: i64,
    ) -> Result<Option<Match>, StoreError>;

    async fn insert_match(&mut self, record: &Match) -> Result<(), StoreError>;

    async fn set_match_status(&mut self, match_id: Uuid, status: MatchStatus) -> Result<(), StoreError>;

    /// Returns the number of user rows updated
    async fn set_matching_status(
        &mut self,
        user_ids: &[i64],
        status: MatchingStatus,
    ) -> Result<u64, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}
