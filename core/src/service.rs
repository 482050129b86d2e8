//! The raffle service: registration, extras workflow, draw and reset.
//!
//! Orchestrates the provider traits. Prechecks run against read snapshots
//! for early, informative failures; the authoritative uniqueness and
//! at-most-one-draw enforcement always happens inside the store's atomic
//! commit methods.

use crate::allocator;
use crate::config::RaffleConfig;
use crate::error::{RaffleError, Result};
use crate::providers::{Clock, Notifier, ProofStorage, RaffleNotification, RaffleStore};
use crate::types::{
    DrawId, DrawOutcome, ExtraNumberRequest, FullName, Money, Participant, ParticipantId,
    PhoneNumber, PoolStatus, ProofFile, RequestId, TicketNumber, TicketOrigin,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Commit attempts for an approval whose claimed-number snapshot went
/// stale. An aborted commit wrote nothing, so re-sampling against a fresh
/// snapshot is safe.
const APPROVE_COMMIT_ATTEMPTS: u32 = 3;

/// The number allocation and draw subsystem.
///
/// Generic over its collaborators so production (Postgres store, file
/// proof storage) and tests (in-memory mocks, seeded sampler) share the
/// same code path.
#[derive(Clone)]
pub struct Raffle<S, P, N, C> {
    store: S,
    proofs: P,
    notifier: N,
    clock: C,
    config: RaffleConfig,
    rng: Arc<Mutex<StdRng>>,
}

impl<S, P, N, C> Raffle<S, P, N, C>
where
    S: RaffleStore,
    P: ProofStorage,
    N: Notifier,
    C: Clock,
{
    /// Creates a raffle with an entropy-seeded sampler.
    #[must_use]
    pub fn new(store: S, proofs: P, notifier: N, clock: C, config: RaffleConfig) -> Self {
        Self {
            store,
            proofs,
            notifier,
            clock,
            config,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Creates a raffle with a deterministic sampler, for tests.
    #[must_use]
    pub fn with_seed(
        store: S,
        proofs: P,
        notifier: N,
        clock: C,
        config: RaffleConfig,
        seed: u64,
    ) -> Self {
        Self {
            store,
            proofs,
            notifier,
            clock,
            config,
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// The cycle configuration.
    #[must_use]
    pub const fn config(&self) -> &RaffleConfig {
        &self.config
    }

    fn sample<T>(&self, sample: impl FnOnce(&mut StdRng) -> T) -> Result<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| RaffleError::StoreUnavailable("sampler lock poisoned".to_string()))?;
        Ok(sample(&mut rng))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Participant registry
    // ═══════════════════════════════════════════════════════════════════════

    /// Registers a participant on a chosen number.
    ///
    /// Prechecks run in precedence order — number conflict, then contact
    /// conflict, then input validation — against read snapshots; the store
    /// re-checks both conflicts inside the commit, so two concurrent
    /// callers targeting the same number can never both succeed.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The number is claimed → [`RaffleError::NumberTaken`]
    /// - The contact already registered → [`RaffleError::ContactAlreadyRegistered`]
    ///   (carries the existing row for recovery)
    /// - Name/contact/number are malformed → [`RaffleError::InvalidInput`]
    /// - The store fails → [`RaffleError::StoreUnavailable`]
    #[tracing::instrument(skip_all, fields(number))]
    pub async fn register(&self, name: &str, contact: &str, number: u32) -> Result<Participant> {
        if let Some(wanted) = TicketNumber::new(number) {
            let claimed = self.store.claimed_numbers().await?;
            if claimed.contains(&wanted) {
                return Err(RaffleError::NumberTaken { number: wanted });
            }
        }

        // A malformed contact cannot match any canonical row, so the
        // recovery precheck only applies to parseable input.
        if let Ok(phone) = PhoneNumber::parse(contact) {
            let rows = self.store.participants_by_contact(&phone).await?;
            if let Some(existing) = rows.into_iter().next() {
                return Err(RaffleError::ContactAlreadyRegistered {
                    existing: Box::new(existing),
                });
            }
        }

        let name = FullName::parse(name)?;
        let contact = PhoneNumber::parse(contact)?;
        let number = TicketNumber::new(number)
            .filter(|n| self.config.contains(*n))
            .ok_or_else(|| RaffleError::InvalidInput {
                reason: format!(
                    "ticket number must be within 1..={}",
                    self.config.pool_size
                ),
            })?;

        let participant = Participant::new(
            ParticipantId::new(),
            name,
            contact,
            number,
            TicketOrigin::Direct,
            self.clock.now(),
        );
        let participant = self.store.insert_participant(&participant).await?;

        info!(participant = %participant.id, number = %participant.number, "participant registered");
        self.notifier.notify(&RaffleNotification::ParticipantRegistered {
            participant: participant.clone(),
        });
        Ok(participant)
    }

    /// Every ticket owned by a contact (base registration plus extras).
    ///
    /// # Errors
    ///
    /// Returns error if the contact is malformed or the store fails.
    pub async fn lookup_by_contact(&self, contact: &str) -> Result<Vec<Participant>> {
        let contact = PhoneNumber::parse(contact)?;
        self.store.participants_by_contact(&contact).await
    }

    /// Operator-only hard delete of one participant row.
    ///
    /// The removed number becomes immediately available to future
    /// allocations; there are no other cascading effects.
    ///
    /// # Errors
    ///
    /// Returns error if the row is absent or the store fails.
    #[tracing::instrument(skip(self), fields(participant = %id))]
    pub async fn remove(&self, id: ParticipantId) -> Result<()> {
        self.store.remove_participant(id).await?;
        info!(participant = %id, "participant removed");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Extra-number request workflow
    // ═══════════════════════════════════════════════════════════════════════

    /// Submits a purchase-backed request for extra numbers.
    ///
    /// The duplicate-pending guard is a user-facing check over a read
    /// snapshot, not a hard constraint; a rare race producing two pending
    /// requests is resolved at approval time by processing both.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Name/contact are malformed → [`RaffleError::InvalidInput`]
    /// - The amount is under one unit → [`RaffleError::BelowMinimumPurchase`]
    /// - A pending request exists → [`RaffleError::DuplicatePendingRequest`]
    /// - Proof storage fails → [`RaffleError::ProofStorageFailed`]
    /// - The store fails → [`RaffleError::StoreUnavailable`]
    #[tracing::instrument(skip_all, fields(amount = %amount))]
    pub async fn submit(
        &self,
        name: &str,
        contact: &str,
        amount: Money,
        proof: ProofFile,
    ) -> Result<ExtraNumberRequest> {
        let name = FullName::parse(name)?;
        let contact = PhoneNumber::parse(contact)?;
        if !self.config.meets_minimum(amount) {
            return Err(RaffleError::BelowMinimumPurchase {
                amount,
                minimum: self.config.unit_price,
            });
        }

        if let Some(pending) = self.store.pending_request_for_contact(&contact).await? {
            return Err(RaffleError::DuplicatePendingRequest {
                request_id: pending.id,
            });
        }

        let extra_count = self.config.extra_tickets_for(amount);
        let proof = self.proofs.store(&proof).await?;

        let request = ExtraNumberRequest::new(
            RequestId::new(),
            name,
            contact,
            amount,
            extra_count,
            proof,
            self.clock.now(),
        );
        let request = self.store.insert_request(&request).await?;

        info!(request = %request.id, extra_count = request.extra_count, "extra-number request submitted");
        Ok(request)
    }

    /// Fetches one request (operator review).
    ///
    /// # Errors
    ///
    /// Returns error if the request is absent or the store fails.
    pub async fn request(&self, id: RequestId) -> Result<ExtraNumberRequest> {
        self.store.request(id).await
    }

    /// All requests, newest first (operator review listing).
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn list_requests(&self) -> Result<Vec<ExtraNumberRequest>> {
        self.store.list_requests().await
    }

    /// Approves a pending request, allocating its extra numbers.
    ///
    /// Reads a fresh claimed-number snapshot, samples the allocation purely
    /// and commits rows plus the status transition as one atomic unit. A
    /// commit-time number conflict means the snapshot went stale under
    /// concurrency: nothing was written, so the allocation is re-sampled
    /// against a fresh snapshot, a bounded number of times.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The request is absent → [`RaffleError::NotFound`]
    /// - The request is not pending → [`RaffleError::InvalidState`]
    /// - The pool cannot cover the request → [`RaffleError::InsufficientPool`]
    ///   (the request stays pending; the operator may retry later)
    /// - Commit attempts are exhausted or the store fails →
    ///   [`RaffleError::StoreUnavailable`]
    #[tracing::instrument(skip(self), fields(request = %id))]
    pub async fn approve(&self, id: RequestId) -> Result<Vec<Participant>> {
        let request = self.store.request(id).await?;
        if !request.status.is_pending() {
            return Err(RaffleError::InvalidState {
                status: request.status,
            });
        }

        for attempt in 1..=APPROVE_COMMIT_ATTEMPTS {
            let claimed = self.store.claimed_numbers().await?;
            let numbers = self.sample(|rng| {
                allocator::draw_numbers(&claimed, request.extra_count, self.config.pool_size, rng)
            })??;

            let now = self.clock.now();
            let rows: Vec<Participant> = numbers
                .into_iter()
                .map(|number| {
                    Participant::new(
                        ParticipantId::new(),
                        request.name.clone(),
                        request.contact.clone(),
                        number,
                        TicketOrigin::Extra,
                        now,
                    )
                })
                .collect();

            match self.store.commit_approval(id, &rows, now).await {
                Ok(updated) => {
                    info!(
                        request = %updated.id,
                        granted = updated.granted_numbers.len(),
                        "extra-number request approved"
                    );
                    self.notifier.notify(&RaffleNotification::ExtraNumbersGranted {
                        request_id: updated.id,
                        contact: updated.contact.clone(),
                        numbers: updated.granted_numbers.clone(),
                    });
                    return Ok(rows);
                }
                Err(RaffleError::NumberTaken { number }) => {
                    warn!(
                        request = %id,
                        number = %number,
                        attempt,
                        "allocation snapshot went stale, re-sampling"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Err(RaffleError::StoreUnavailable(format!(
            "approval of request {id} conflicted {APPROVE_COMMIT_ATTEMPTS} times"
        )))
    }

    /// Rejects a pending request. No numbers are allocated and the chosen
    /// list stays empty.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The request is absent → [`RaffleError::NotFound`]
    /// - The request is not pending → [`RaffleError::InvalidState`]
    /// - The store fails → [`RaffleError::StoreUnavailable`]
    #[tracing::instrument(skip(self), fields(request = %id))]
    pub async fn reject(&self, id: RequestId) -> Result<()> {
        let updated = self.store.commit_rejection(id, self.clock.now()).await?;
        info!(request = %updated.id, "extra-number request rejected");
        self.notifier.notify(&RaffleNotification::RequestRejected {
            request_id: updated.id,
            contact: updated.contact.clone(),
        });
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Draw
    // ═══════════════════════════════════════════════════════════════════════

    /// Draws the winner: one uniformly random participant row.
    ///
    /// Every row is an equally weighted entry, so a contact holding three
    /// tickets has three times the chance of a contact holding one. The
    /// outcome write is atomic with the at-most-one check; reversing a
    /// draw requires a full cycle reset.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The registry is empty → [`RaffleError::NoParticipants`]
    /// - An outcome already exists → [`RaffleError::AlreadyDrawn`]
    /// - The store fails → [`RaffleError::StoreUnavailable`]
    #[tracing::instrument(skip(self))]
    pub async fn draw(&self) -> Result<Participant> {
        if self.store.draw_outcome().await?.is_some() {
            return Err(RaffleError::AlreadyDrawn);
        }

        let mut participants = self.store.list_participants().await?;
        if participants.is_empty() {
            return Err(RaffleError::NoParticipants);
        }

        let index = self.sample(|rng| rng.gen_range(0..participants.len()))?;
        let winner = participants.swap_remove(index);

        let outcome = DrawOutcome::new(DrawId::new(), winner.id, self.clock.now());
        self.store.record_draw(&outcome).await?;

        info!(winner = %winner.id, number = %winner.number, "draw completed");
        self.notifier.notify(&RaffleNotification::WinnerDrawn {
            winner: winner.clone(),
        });
        Ok(winner)
    }

    /// The persisted draw outcome, if the cycle has been drawn.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn outcome(&self) -> Result<Option<DrawOutcome>> {
        self.store.draw_outcome().await
    }

    /// The persisted outcome joined with the winning row, for display.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn winner(&self) -> Result<Option<(DrawOutcome, Participant)>> {
        let Some(outcome) = self.store.draw_outcome().await? else {
            return Ok(None);
        };
        let winner = self
            .store
            .list_participants()
            .await?
            .into_iter()
            .find(|p| p.id == outcome.winner)
            .ok_or_else(|| {
                RaffleError::StoreUnavailable("draw outcome references a missing row".to_string())
            })?;
        Ok(Some((outcome, winner)))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Cycle reset
    // ═══════════════════════════════════════════════════════════════════════

    /// Resets the cycle: wipes participants, requests and the draw outcome
    /// atomically, then deletes stored proof artifacts best effort.
    ///
    /// Proof deletion failures are logged and never roll back the wipe.
    ///
    /// # Errors
    ///
    /// Returns error if the store wipe fails; the wipe is safe to re-run.
    #[tracing::instrument(skip(self))]
    pub async fn reset(&self) -> Result<()> {
        let proofs: Vec<_> = self
            .store
            .list_requests()
            .await?
            .into_iter()
            .map(|request| request.proof)
            .collect();

        self.store.reset().await?;
        info!(proofs = proofs.len(), "cycle reset committed");

        for proof in proofs {
            if let Err(error) = self.proofs.delete(&proof).await {
                warn!(proof = %proof, %error, "failed to delete proof artifact");
            }
        }

        self.notifier.notify(&RaffleNotification::CycleReset);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Read accessors (availability / progress indicators)
    // ═══════════════════════════════════════════════════════════════════════

    /// Current pool snapshot for availability display.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn pool_status(&self) -> Result<PoolStatus> {
        let mut claimed: Vec<TicketNumber> =
            self.store.claimed_numbers().await?.into_iter().collect();
        claimed.sort_unstable();
        Ok(PoolStatus {
            pool_size: self.config.pool_size,
            claimed,
        })
    }

    /// Number of participant rows (progress indicator).
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn participant_count(&self) -> Result<u64> {
        self.store.participant_count().await
    }
}
