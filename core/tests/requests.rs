//! Integration tests for the extra-number request workflow.
//!
//! Covers submission arithmetic, the duplicate-pending guard, the
//! single-shot approve/reject transitions and allocation atomicity under
//! concurrent approvals.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)] // Test assertions

use rifa_core::config::RaffleConfig;
use rifa_core::error::RaffleError;
use rifa_core::mocks::{InMemoryRaffleStore, MockNotifier, MockProofStorage};
use rifa_core::providers::SystemClock;
use rifa_core::service::Raffle;
use rifa_core::types::{Money, ProofFile, RequestStatus, TicketOrigin};
use std::collections::HashSet;

type TestRaffle = Raffle<InMemoryRaffleStore, MockProofStorage, MockNotifier, SystemClock>;

struct Fixture {
    raffle: TestRaffle,
    proofs: MockProofStorage,
}

fn fixture(config: RaffleConfig) -> Fixture {
    let proofs = MockProofStorage::new();
    let raffle = Raffle::with_seed(
        InMemoryRaffleStore::new(),
        proofs.clone(),
        MockNotifier::new(),
        SystemClock,
        config,
        42,
    );
    Fixture { raffle, proofs }
}

fn proof() -> ProofFile {
    ProofFile::new("comprovante.png".to_string(), vec![0xFF, 0xD8, 0xFF])
}

#[tokio::test]
async fn submit_computes_the_extra_ticket_count() {
    let Fixture { raffle, proofs } = fixture(RaffleConfig::default());

    // 21 currency units at 7 per unit, 5 tickets per unit.
    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(2100), proof())
        .await
        .unwrap();

    assert_eq!(request.extra_count, 15);
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(request.granted_numbers.is_empty());
    assert!(request.decided_at.is_none());
    assert_eq!(proofs.stored_count(), 1);
}

#[tokio::test]
async fn submit_rejects_amounts_below_one_unit() {
    let Fixture { raffle, proofs } = fixture(RaffleConfig::default());

    let error = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(600), proof())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        RaffleError::BelowMinimumPurchase {
            amount: Money::from_cents(600),
            minimum: Money::from_cents(700),
        }
    );
    assert_eq!(proofs.stored_count(), 0);
    assert!(raffle.list_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn submit_rejects_malformed_input() {
    let Fixture { raffle, .. } = fixture(RaffleConfig::default());

    assert!(matches!(
        raffle
            .submit("Ana", "11987654321", Money::from_cents(700), proof())
            .await,
        Err(RaffleError::InvalidInput { .. })
    ));
    assert!(matches!(
        raffle
            .submit("Ana Souza", "12", Money::from_cents(700), proof())
            .await,
        Err(RaffleError::InvalidInput { .. })
    ));
}

#[tokio::test]
async fn second_pending_submission_is_guarded() {
    let Fixture { raffle, .. } = fixture(RaffleConfig::default());

    let first = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();

    let error = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(1400), proof())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        RaffleError::DuplicatePendingRequest {
            request_id: first.id
        }
    );
}

#[tokio::test]
async fn proof_storage_failure_blocks_submission() {
    let Fixture { raffle, proofs } = fixture(RaffleConfig::default());
    proofs.fail_store(true);

    let error = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap_err();

    assert!(matches!(error, RaffleError::ProofStorageFailed(_)));
    assert!(raffle.list_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn approval_allocates_distinct_unclaimed_numbers() {
    let Fixture { raffle, .. } = fixture(RaffleConfig::new(50, Money::from_cents(700), 5));
    let base = raffle
        .register("Ana Souza", "11987654321", 3)
        .await
        .unwrap();
    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(1400), proof())
        .await
        .unwrap();

    let granted = raffle.approve(request.id).await.unwrap();

    assert_eq!(granted.len(), 10);
    let numbers: HashSet<u32> = granted.iter().map(|p| p.number.get()).collect();
    assert_eq!(numbers.len(), 10);
    assert!(!numbers.contains(&base.number.get()));
    assert!(granted.iter().all(|p| p.origin == TicketOrigin::Extra));

    let updated = raffle.request(request.id).await.unwrap();
    assert_eq!(updated.status, RequestStatus::Approved);
    assert_eq!(updated.granted_numbers.len(), 10);
    assert!(updated.decided_at.is_some());

    // The contact now holds the base ticket plus every granted one.
    let rows = raffle.lookup_by_contact("11987654321").await.unwrap();
    assert_eq!(rows.len(), 11);
}

#[tokio::test]
async fn approval_is_single_shot() {
    let Fixture { raffle, .. } = fixture(RaffleConfig::default());
    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();

    raffle.approve(request.id).await.unwrap();
    let error = raffle.approve(request.id).await.unwrap_err();

    assert_eq!(
        error,
        RaffleError::InvalidState {
            status: RequestStatus::Approved
        }
    );
}

#[tokio::test]
async fn rejection_is_terminal_and_allocates_nothing() {
    let Fixture { raffle, .. } = fixture(RaffleConfig::default());
    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();

    raffle.reject(request.id).await.unwrap();

    let updated = raffle.request(request.id).await.unwrap();
    assert_eq!(updated.status, RequestStatus::Rejected);
    assert!(updated.granted_numbers.is_empty());
    assert_eq!(raffle.participant_count().await.unwrap(), 0);

    // Neither decision can follow a rejection.
    assert!(matches!(
        raffle.approve(request.id).await,
        Err(RaffleError::InvalidState {
            status: RequestStatus::Rejected
        })
    ));
    assert!(matches!(
        raffle.reject(request.id).await,
        Err(RaffleError::InvalidState {
            status: RequestStatus::Rejected
        })
    ));
}

#[tokio::test]
async fn deciding_an_unknown_request_fails() {
    let Fixture { raffle, .. } = fixture(RaffleConfig::default());
    let id = rifa_core::types::RequestId::new();

    assert_eq!(raffle.approve(id).await.unwrap_err(), RaffleError::NotFound);
    assert_eq!(raffle.reject(id).await.unwrap_err(), RaffleError::NotFound);
}

#[tokio::test]
async fn failed_allocation_leaves_the_request_pending() {
    // Pool of 5 with one number claimed: a 5-ticket request cannot fit.
    let Fixture { raffle, .. } = fixture(RaffleConfig::new(5, Money::from_cents(700), 5));
    let base = raffle
        .register("Bruno Lima", "21912345678", 1)
        .await
        .unwrap();
    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();

    let error = raffle.approve(request.id).await.unwrap_err();
    assert_eq!(
        error,
        RaffleError::InsufficientPool {
            requested: 5,
            available: 4,
        }
    );

    // No partial state: the request is still pending and no rows exist.
    let pending = raffle.request(request.id).await.unwrap();
    assert_eq!(pending.status, RequestStatus::Pending);
    assert_eq!(raffle.participant_count().await.unwrap(), 1);

    // Once the pool frees up, the same request can be approved.
    raffle.remove(base.id).await.unwrap();
    let granted = raffle.approve(request.id).await.unwrap();
    assert_eq!(granted.len(), 5);
}

#[tokio::test]
async fn concurrent_approvals_never_overlap() {
    // Pool with exactly enough room for both requests combined.
    let Fixture { raffle, .. } = fixture(RaffleConfig::new(20, Money::from_cents(700), 5));
    let first = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(1400), proof())
        .await
        .unwrap();
    let second = raffle
        .submit("Bruno Lima", "21912345678", Money::from_cents(1400), proof())
        .await
        .unwrap();

    let (a, b) = tokio::join!(raffle.approve(first.id), raffle.approve(second.id));
    let a = a.unwrap();
    let b = b.unwrap();

    assert_eq!(a.len(), 10);
    assert_eq!(b.len(), 10);

    let union: HashSet<u32> = a
        .iter()
        .chain(b.iter())
        .map(|p| p.number.get())
        .collect();
    assert_eq!(union.len(), 20, "allocations must be disjoint");
}

#[tokio::test]
async fn decisions_are_stamped_with_the_clock() {
    use chrono::TimeZone;
    use rifa_core::mocks::FixedClock;

    let instant = chrono::Utc
        .with_ymd_and_hms(2025, 5, 17, 12, 0, 0)
        .single()
        .unwrap();
    let raffle = Raffle::with_seed(
        InMemoryRaffleStore::new(),
        MockProofStorage::new(),
        MockNotifier::new(),
        FixedClock::new(instant),
        RaffleConfig::default(),
        42,
    );

    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();
    assert_eq!(request.created_at, instant);

    raffle.reject(request.id).await.unwrap();
    let decided = raffle.request(request.id).await.unwrap();
    assert_eq!(decided.decided_at, Some(instant));
}

#[tokio::test]
async fn a_decided_contact_may_submit_again() {
    let Fixture { raffle, .. } = fixture(RaffleConfig::default());
    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();
    raffle.reject(request.id).await.unwrap();

    raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();
}
