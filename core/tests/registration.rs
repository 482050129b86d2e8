//! Integration tests for the participant registry.
//!
//! Exercises the register/lookup/remove surface against the in-memory
//! store, including precedence of conflict checks and uniqueness under
//! concurrent registration.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)] // Test assertions

use rifa_core::config::RaffleConfig;
use rifa_core::error::RaffleError;
use rifa_core::mocks::{InMemoryRaffleStore, MockNotifier, MockProofStorage};
use rifa_core::providers::SystemClock;
use rifa_core::service::Raffle;
use rifa_core::types::{Money, TicketNumber, TicketOrigin};
use std::collections::HashSet;

type TestRaffle = Raffle<InMemoryRaffleStore, MockProofStorage, MockNotifier, SystemClock>;

fn raffle_with(config: RaffleConfig) -> TestRaffle {
    Raffle::with_seed(
        InMemoryRaffleStore::new(),
        MockProofStorage::new(),
        MockNotifier::new(),
        SystemClock,
        config,
        42,
    )
}

fn small_pool(pool_size: u32) -> RaffleConfig {
    RaffleConfig::new(pool_size, Money::from_cents(700), 5)
}

#[tokio::test]
async fn register_creates_a_direct_row() {
    let raffle = raffle_with(RaffleConfig::default());

    let participant = raffle
        .register("Ana Souza", "11987654321", 7)
        .await
        .unwrap();

    assert_eq!(participant.number.get(), 7);
    assert_eq!(participant.origin, TicketOrigin::Direct);
    assert_eq!(participant.contact.as_str(), "(11) 98765-4321");
    assert_eq!(raffle.participant_count().await.unwrap(), 1);
}

#[tokio::test]
async fn taken_number_is_rejected() {
    let raffle = raffle_with(RaffleConfig::default());
    raffle.register("Ana Souza", "11987654321", 7).await.unwrap();

    let error = raffle
        .register("Bruno Lima", "21912345678", 7)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        RaffleError::NumberTaken {
            number: TicketNumber::new(7).unwrap()
        }
    );
    assert_eq!(raffle.participant_count().await.unwrap(), 1);
}

#[tokio::test]
async fn registered_contact_conflict_carries_the_existing_row() {
    let raffle = raffle_with(RaffleConfig::default());
    let first = raffle.register("Ana Souza", "11987654321", 7).await.unwrap();

    let error = raffle
        .register("Ana Souza", "(11) 98765-4321", 8)
        .await
        .unwrap_err();

    match error {
        RaffleError::ContactAlreadyRegistered { existing } => {
            assert_eq!(*existing, first);
        }
        other => panic!("expected contact conflict, got {other:?}"),
    }
    assert_eq!(raffle.participant_count().await.unwrap(), 1);
}

#[tokio::test]
async fn malformed_inputs_are_rejected_before_any_write() {
    let raffle = raffle_with(RaffleConfig::default());

    assert!(matches!(
        raffle.register("Ana", "11987654321", 7).await,
        Err(RaffleError::InvalidInput { .. })
    ));
    assert!(matches!(
        raffle.register("Ana Souza", "123", 7).await,
        Err(RaffleError::InvalidInput { .. })
    ));
    assert!(matches!(
        raffle.register("Ana Souza", "11987654321", 0).await,
        Err(RaffleError::InvalidInput { .. })
    ));
    assert!(matches!(
        raffle.register("Ana Souza", "11987654321", 1001).await,
        Err(RaffleError::InvalidInput { .. })
    ));
    assert_eq!(raffle.participant_count().await.unwrap(), 0);
}

#[tokio::test]
async fn conflict_checks_take_precedence_over_validation() {
    let raffle = raffle_with(RaffleConfig::default());
    raffle.register("Ana Souza", "11987654321", 7).await.unwrap();

    // Taken number wins over a malformed name.
    assert!(matches!(
        raffle.register("x", "21912345678", 7).await,
        Err(RaffleError::NumberTaken { .. })
    ));

    // Contact conflict wins over a malformed name.
    assert!(matches!(
        raffle.register("x", "11987654321", 8).await,
        Err(RaffleError::ContactAlreadyRegistered { .. })
    ));
}

#[tokio::test]
async fn identical_retry_returns_the_conflict_instead_of_duplicating() {
    let raffle = raffle_with(RaffleConfig::default());
    raffle.register("Ana Souza", "11987654321", 7).await.unwrap();

    // A client retrying after a timeout resubmits the same pair.
    let error = raffle
        .register("Ana Souza", "11987654321", 7)
        .await
        .unwrap_err();

    assert!(error.is_conflict());
    assert_eq!(raffle.participant_count().await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_registration_fills_the_pool_exactly_once() {
    let pool_size = 10;
    let raffle = raffle_with(small_pool(pool_size));

    let mut handles = Vec::new();
    for i in 0u32..40 {
        let raffle = raffle.clone();
        handles.push(tokio::spawn(async move {
            let contact = format!("119{i:08}");
            raffle
                .register("Participante Sorteado", &contact, (i % pool_size) + 1)
                .await
        }));
    }

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(participant) => winners.push(participant),
            Err(RaffleError::NumberTaken { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners.len(), pool_size as usize);
    assert_eq!(conflicts, 40 - pool_size as usize);

    let numbers: HashSet<u32> = winners.iter().map(|p| p.number.get()).collect();
    assert_eq!(numbers.len(), pool_size as usize);
    assert_eq!(
        raffle.participant_count().await.unwrap(),
        u64::from(pool_size)
    );
}

#[tokio::test]
async fn removing_a_row_frees_its_number_and_contact() {
    let raffle = raffle_with(RaffleConfig::default());
    let participant = raffle
        .register("Ana Souza", "11987654321", 7)
        .await
        .unwrap();

    raffle.remove(participant.id).await.unwrap();
    assert_eq!(raffle.participant_count().await.unwrap(), 0);

    // Both the number and the contact are immediately reusable.
    raffle.register("Ana Souza", "11987654321", 7).await.unwrap();
}

#[tokio::test]
async fn removing_an_unknown_row_fails() {
    let raffle = raffle_with(RaffleConfig::default());
    let error = raffle
        .remove(rifa_core::types::ParticipantId::new())
        .await
        .unwrap_err();
    assert_eq!(error, RaffleError::NotFound);
}

#[tokio::test]
async fn lookup_returns_every_row_for_the_contact() {
    let raffle = raffle_with(RaffleConfig::default());
    raffle.register("Ana Souza", "11987654321", 7).await.unwrap();
    raffle.register("Bruno Lima", "21912345678", 8).await.unwrap();

    let rows = raffle.lookup_by_contact("(11) 98765-4321").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].number.get(), 7);

    let none = raffle.lookup_by_contact("31955554444").await.unwrap();
    assert!(none.is_empty());
}
