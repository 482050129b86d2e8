//! Integration tests for the cycle reset.
//!
//! A reset must leave no trace of the previous cycle: participants,
//! requests, the draw outcome and stored proof artifacts are all gone,
//! and a fresh cycle can run to a new draw.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)] // Test assertions

use rifa_core::config::RaffleConfig;
use rifa_core::error::RaffleError;
use rifa_core::mocks::{InMemoryRaffleStore, MockNotifier, MockProofStorage};
use rifa_core::providers::{RaffleNotification, SystemClock};
use rifa_core::service::Raffle;
use rifa_core::types::{Money, ProofFile};

type TestRaffle = Raffle<InMemoryRaffleStore, MockProofStorage, MockNotifier, SystemClock>;

struct Fixture {
    raffle: TestRaffle,
    proofs: MockProofStorage,
    notifier: MockNotifier,
}

fn fixture() -> Fixture {
    let proofs = MockProofStorage::new();
    let notifier = MockNotifier::new();
    let raffle = Raffle::with_seed(
        InMemoryRaffleStore::new(),
        proofs.clone(),
        notifier.clone(),
        SystemClock,
        RaffleConfig::default(),
        42,
    );
    Fixture {
        raffle,
        proofs,
        notifier,
    }
}

fn proof() -> ProofFile {
    ProofFile::new("comprovante.png".to_string(), vec![1, 2, 3])
}

#[tokio::test]
async fn reset_clears_every_table_and_artifact() {
    let Fixture { raffle, proofs, .. } = fixture();

    raffle.register("Ana Souza", "11987654321", 1).await.unwrap();
    raffle.register("Bruno Lima", "21912345678", 2).await.unwrap();
    let request = raffle
        .submit("Ana Souza", "11987654321", Money::from_cents(700), proof())
        .await
        .unwrap();
    raffle.approve(request.id).await.unwrap();
    raffle.draw().await.unwrap();

    raffle.reset().await.unwrap();

    assert!(raffle.lookup_by_contact("11987654321").await.unwrap().is_empty());
    assert!(raffle.lookup_by_contact("21912345678").await.unwrap().is_empty());
    assert_eq!(raffle.participant_count().await.unwrap(), 0);
    assert!(raffle.pool_status().await.unwrap().claimed.is_empty());
    assert!(raffle.list_requests().await.unwrap().is_empty());
    assert!(raffle.outcome().await.unwrap().is_none());

    // The stored proof artifact was handed to the storage collaborator.
    assert_eq!(proofs.deleted().len(), 1);
    assert_eq!(proofs.stored_count(), 0);
}

#[tokio::test]
async fn a_fresh_cycle_can_be_drawn_after_reset() {
    let Fixture { raffle, .. } = fixture();

    raffle.register("Ana Souza", "11987654321", 1).await.unwrap();
    raffle.draw().await.unwrap();
    assert_eq!(raffle.draw().await.unwrap_err(), RaffleError::AlreadyDrawn);

    raffle.reset().await.unwrap();

    // The outcome is gone: drawing is possible again once the new cycle
    // has participants.
    assert_eq!(raffle.draw().await.unwrap_err(), RaffleError::NoParticipants);
    raffle.register("Ana Souza", "11987654321", 1).await.unwrap();
    raffle.draw().await.unwrap();
}

#[tokio::test]
async fn reset_is_safe_to_re_run() {
    let Fixture { raffle, .. } = fixture();
    raffle.register("Ana Souza", "11987654321", 1).await.unwrap();

    raffle.reset().await.unwrap();
    raffle.reset().await.unwrap();
    assert_eq!(raffle.participant_count().await.unwrap(), 0);
}

#[tokio::test]
async fn reset_emits_a_notification() {
    let Fixture {
        raffle, notifier, ..
    } = fixture();

    raffle.register("Ana Souza", "11987654321", 1).await.unwrap();
    raffle.reset().await.unwrap();

    assert!(notifier
        .sent()
        .iter()
        .any(|n| matches!(n, RaffleNotification::CycleReset)));
}
