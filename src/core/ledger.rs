use crate::core::state_machine::{self, AcceptPolicy, Decision, RejectPolicy};
use crate::error::MatchingError;
use crate::models::Match;
use crate::services::{LedgerTx, MatchStore};

/// Authoritative writer of match records and user matching statuses
///
/// Each operation runs in one store transaction: the gate is checked
/// against rows read under lock, and all writes commit together or not
/// at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchLedger {
    accept_policy: AcceptPolicy,
    reject_policy: RejectPolicy,
}

impl MatchLedger {
    pub fn new(accept_policy: AcceptPolicy, reject_policy: RejectPolicy) -> Self {
        Self {
            accept_policy,
            reject_policy,
        }
    }

    /// Propose a match from `requester_id` to `partner_id`
    ///
    /// Only the requester moves to `waiting`; the partner's status is left
    /// as it is until they accept.
    pub async fn request_match<S: MatchStore>(
        &self,
        store: &S,
        requester_id: i64,
        partner_id: i64,
    ) -> Result<Match, MatchingError> {
        let mut tx = store.begin().await?;

        let requester = tx
            .lock_user(requester_id)
            .await?
            .ok_or_else(|| MatchingError::Unauthenticated(format!("User {} not found", requester_id)))?;

        let next = match state_machine::request(&requester, partner_id) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("Match request from {} to {} refused: {}", requester_id, partner_id, e);
                return Err(e);
            }
        };

        if tx.get_user(partner_id).await?.is_none() {
            return Err(MatchingError::NotFound("Partner not found".to_string()));
        }

        let record = Match::new_request(requester_id, partner_id);
        tx.insert_match(&record).await?;
        tx.set_matching_status(&[requester_id], next).await?;
        tx.commit().await?;

        tracing::info!(
            "Match {} requested: {} -> {} (requester now {})",
            record.id,
            requester_id,
            partner_id,
            next
        );

        Ok(record)
    }

    /// Accept or reject the pending request `requester_id` sent to
    /// `responder_id`
    ///
    /// The request is identified by its requester, relying on a requester
    /// holding at most one waiting match at a time.
    pub async fn respond_to_match<S: MatchStore>(
        &self,
        store: &S,
        responder_id: i64,
        requester_id: i64,
        decision: Decision,
    ) -> Result<Match, MatchingError> {
        tracing::info!(
            "Checking match with requester {} for user {}",
            requester_id,
            responder_id
        );

        let mut tx = store.begin().await?;

        let pending = match tx.lock_pending_match(requester_id, responder_id).await? {
            Some(pending) => pending,
            None => {
                tracing::warn!(
                    "No pending match with requester {} for user {}",
                    requester_id,
                    responder_id
                );
                return Err(MatchingError::Unauthorized(
                    "Match request not found or you are not authorized to respond".to_string(),
                ));
            }
        };

        let responder = tx
            .lock_user(responder_id)
            .await?
            .ok_or_else(|| MatchingError::Unauthenticated(format!("User {} not found", responder_id)))?;

        let resolution = state_machine::resolve(
            &pending,
            &responder,
            decision,
            self.accept_policy,
            self.reject_policy,
        )?;

        tx.set_match_status(pending.id, resolution.match_status).await?;
        if let Some(status) = resolution.requester_status {
            let updated = tx.set_matching_status(&[pending.requester_id], status).await?;
            if updated == 0 {
                tracing::warn!("Requester {} of match {} no longer exists", pending.requester_id, pending.id);
            }
        }
        if let Some(status) = resolution.responder_status {
            tx.set_matching_status(&[responder_id], status).await?;
        }
        tx.commit().await?;

        tracing::info!(
            "Match {} resolved as {} by user {}",
            pending.id,
            resolution.match_status,
            responder_id
        );

        Ok(Match {
            status: resolution.match_status,
            ..pending
        })
    }
}
