// Integration tests for the matching lifecycle

use mbti_match::core::{CandidateSelector, Decision, MatchLedger};
use mbti_match::models::{Gender, MatchStatus, MatchingStatus, User};
use mbti_match::services::{LedgerTx, MatchStore, MemoryStore};
use mbti_match::MatchingError;

fn create_user(id: i64, mbti: &str, gender: Gender, status: MatchingStatus) -> User {
    User {
        id,
        name: format!("User {}", id),
        personality_type: mbti.to_string(),
        gender,
        matching_status: status,
    }
}

/// A (INFP, M) and B (ENFJ, F), both free
fn scenario_store() -> MemoryStore {
    MemoryStore::with_users([
        create_user(1, "INFP", Gender::Male, MatchingStatus::None),
        create_user(2, "ENFJ", Gender::Female, MatchingStatus::None),
    ])
}

async fn status_of(store: &MemoryStore, id: i64) -> MatchingStatus {
    store.get_user(id).await.unwrap().unwrap().matching_status
}

#[tokio::test]
async fn test_request_then_accept_scenario() {
    let store = scenario_store();
    let ledger = MatchLedger::default();

    ledger.request_match(&store, 1, 2).await.unwrap();

    let matches = store.matches().await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].requester_id, 1);
    assert_eq!(matches[0].responder_id, 2);
    assert_eq!(matches[0].status, MatchStatus::Waiting);
    assert_eq!(status_of(&store, 1).await, MatchingStatus::Waiting);
    assert_eq!(status_of(&store, 2).await, MatchingStatus::None);

    // B identifies the request by A's user id
    ledger
        .respond_to_match(&store, 2, 1, Decision::Accept)
        .await
        .unwrap();

    let matches = store.matches().await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].status, MatchStatus::Accept);
    assert_eq!(status_of(&store, 1).await, MatchingStatus::Accept);
    assert_eq!(status_of(&store, 2).await, MatchingStatus::Accept);
}

#[tokio::test]
async fn test_request_then_reject_scenario() {
    let store = scenario_store();
    let ledger = MatchLedger::default();

    ledger.request_match(&store, 1, 2).await.unwrap();
    ledger
        .respond_to_match(&store, 2, 1, Decision::Reject)
        .await
        .unwrap();

    let matches = store.matches().await;
    assert_eq!(matches[0].status, MatchStatus::Reject);
    // Rejection does not release the requester
    assert_eq!(status_of(&store, 1).await, MatchingStatus::Waiting);
    assert_eq!(status_of(&store, 2).await, MatchingStatus::None);

    let err = ledger.request_match(&store, 1, 2).await.unwrap_err();
    assert!(matches!(err, MatchingError::Conflict(_)));
}

#[tokio::test]
async fn test_waiting_user_cannot_request_again() {
    let store = MemoryStore::with_users([
        create_user(1, "INFP", Gender::Male, MatchingStatus::Waiting),
        create_user(2, "ENFJ", Gender::Female, MatchingStatus::None),
    ]);
    let ledger = MatchLedger::default();

    let err = ledger.request_match(&store, 1, 2).await.unwrap_err();
    assert!(matches!(err, MatchingError::Conflict(_)));
    assert!(store.matches().await.is_empty());
}

#[tokio::test]
async fn test_request_to_missing_partner() {
    let store = scenario_store();
    let ledger = MatchLedger::default();

    let err = ledger.request_match(&store, 1, 999).await.unwrap_err();
    assert!(matches!(err, MatchingError::NotFound(_)));
    assert_eq!(status_of(&store, 1).await, MatchingStatus::None);
}

#[tokio::test]
async fn test_concurrent_requests_from_same_user() {
    let store = MemoryStore::with_users([
        create_user(1, "INFP", Gender::Male, MatchingStatus::None),
        create_user(2, "ENFJ", Gender::Female, MatchingStatus::None),
        create_user(3, "ENTJ", Gender::Female, MatchingStatus::None),
    ]);
    let ledger = MatchLedger::default();

    let (first, second) = tokio::join!(
        ledger.request_match(&store, 1, 2),
        ledger.request_match(&store, 1, 3),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    assert_eq!(store.matches().await.len(), 1);
}

#[tokio::test]
async fn test_concurrent_responses_to_same_match() {
    let store = scenario_store();
    let ledger = MatchLedger::default();
    ledger.request_match(&store, 1, 2).await.unwrap();

    let (accept, reject) = tokio::join!(
        ledger.respond_to_match(&store, 2, 1, Decision::Accept),
        ledger.respond_to_match(&store, 2, 1, Decision::Reject),
    );

    assert_eq!(accept.is_ok() as u8 + reject.is_ok() as u8, 1);
    let status = store.matches().await[0].status;
    if accept.is_ok() {
        assert_eq!(status, MatchStatus::Accept);
    } else {
        assert_eq!(status, MatchStatus::Reject);
    }
}

#[tokio::test]
async fn test_active_partner_from_either_side() {
    let store = scenario_store();
    let ledger = MatchLedger::default();
    let selector = CandidateSelector::default();

    assert!(matches!(
        selector.active_partner(&store, &create_user(1, "INFP", Gender::Male, MatchingStatus::None)).await,
        Err(MatchingError::NotFound(_))
    ));

    ledger.request_match(&store, 1, 2).await.unwrap();

    let a = store.get_user(1).await.unwrap().unwrap();
    let b = store.get_user(2).await.unwrap().unwrap();
    assert_eq!(selector.active_partner(&store, &a).await.unwrap().id, 2);
    assert_eq!(selector.active_partner(&store, &b).await.unwrap().id, 1);

    // Rejected matches still resolve to the partner
    ledger.respond_to_match(&store, 2, 1, Decision::Reject).await.unwrap();
    assert_eq!(selector.active_partner(&store, &b).await.unwrap().id, 1);
}

#[tokio::test]
async fn test_active_partner_is_newest_match() {
    let store = MemoryStore::with_users([
        create_user(1, "INFP", Gender::Male, MatchingStatus::None),
        create_user(2, "ENFJ", Gender::Female, MatchingStatus::None),
        create_user(3, "ISTP", Gender::Male, MatchingStatus::None),
    ]);
    let ledger = MatchLedger::default();
    let selector = CandidateSelector::default();

    ledger.request_match(&store, 1, 2).await.unwrap();
    ledger.request_match(&store, 3, 2).await.unwrap();

    let b = store.get_user(2).await.unwrap().unwrap();
    assert_eq!(selector.active_partner(&store, &b).await.unwrap().id, 3);
}

#[tokio::test]
async fn test_active_partner_missing_record() {
    let store = scenario_store();
    let ledger = MatchLedger::default();
    ledger.request_match(&store, 1, 2).await.unwrap();

    // Same match history, but the partner row is gone
    let orphaned = MemoryStore::with_users([create_user(1, "INFP", Gender::Male, MatchingStatus::Waiting)]);
    let mut tx = orphaned.begin().await.unwrap();
    for m in store.matches().await {
        tx.insert_match(&m).await.unwrap();
    }
    tx.commit().await.unwrap();

    let a = orphaned.get_user(1).await.unwrap().unwrap();
    let err = CandidateSelector::default().active_partner(&orphaned, &a).await.unwrap_err();
    assert!(matches!(err, MatchingError::NotFound(_)));
}

#[tokio::test]
async fn test_list_candidates_after_request() {
    let store = MemoryStore::with_users([
        create_user(1, "INFP", Gender::Male, MatchingStatus::None),
        create_user(2, "ENFJ", Gender::Female, MatchingStatus::None),
        create_user(3, "ISTJ", Gender::Male, MatchingStatus::None),
    ]);
    let ledger = MatchLedger::default();
    let selector = CandidateSelector::default();

    let a = store.get_user(1).await.unwrap().unwrap();
    let shortlist = selector.list_candidates(&store, &a).await.unwrap();
    assert_eq!(shortlist.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);

    // B accepts someone else and drops out of everyone's shortlist
    ledger.request_match(&store, 3, 2).await.unwrap();
    ledger.respond_to_match(&store, 2, 3, Decision::Accept).await.unwrap();

    let err = selector.list_candidates(&store, &a).await.unwrap_err();
    assert!(matches!(err, MatchingError::NotFound(_)));
}
