//! Raffle store trait.

use crate::error::Result;
use crate::types::{
    DrawOutcome, ExtraNumberRequest, Participant, ParticipantId, PhoneNumber, RequestId,
    TicketNumber,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Durable raffle state.
///
/// This trait abstracts over the shared store. Concurrency correctness
/// lives entirely behind it: the commit methods execute their check and
/// write as one atomic unit against the store, never through in-memory
/// locks, because multiple independent processes may call the subsystem
/// simultaneously.
pub trait RaffleStore: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════
    // Participants
    // ═══════════════════════════════════════════════════════════════════════
    /// Persist one participant row, enforcing number and contact uniqueness
    /// atomically at commit time.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The ticket number is claimed → `RaffleError::NumberTaken`
    /// - A direct registration exists for the contact and the new row is
    ///   direct → `RaffleError::ContactAlreadyRegistered` (carries the
    ///   existing row)
    /// - The store fails → `RaffleError::StoreUnavailable`
    async fn insert_participant(&self, participant: &Participant) -> Result<Participant>;

    /// Every row held by a contact (base registration plus extras).
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn participants_by_contact(&self, contact: &PhoneNumber) -> Result<Vec<Participant>>;

    /// All participant rows, ordered by ticket number.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn list_participants(&self) -> Result<Vec<Participant>>;

    /// Hard-delete one participant row; its number becomes reusable.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The row is absent → `RaffleError::NotFound`
    /// - The store fails → `RaffleError::StoreUnavailable`
    async fn remove_participant(&self, id: ParticipantId) -> Result<()>;

    /// Snapshot of every claimed ticket number.
    ///
    /// Recomputed from participant rows on each call; never cached across
    /// allocations.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn claimed_numbers(&self) -> Result<HashSet<TicketNumber>>;

    /// Number of participant rows.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn participant_count(&self) -> Result<u64>;

    // ═══════════════════════════════════════════════════════════════════════
    // Extra-number requests
    // ═══════════════════════════════════════════════════════════════════════
    /// Persist a new pending request.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails.
    async fn insert_request(&self, request: &ExtraNumberRequest) -> Result<ExtraNumberRequest>;

    /// Fetch one request.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The request is absent → `RaffleError::NotFound`
    /// - The store fails → `RaffleError::StoreUnavailable`
    async fn request(&self, id: RequestId) -> Result<ExtraNumberRequest>;

    /// All requests, newest first (operator review listing).
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn list_requests(&self) -> Result<Vec<ExtraNumberRequest>>;

    /// The pending request for a contact, if any.
    ///
    /// Best-effort read used as a duplicate-submission guard; not required
    /// to be transactionally airtight.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn pending_request_for_contact(
        &self,
        contact: &PhoneNumber,
    ) -> Result<Option<ExtraNumberRequest>>;

    /// Commit an approval: verify the request is still pending, insert the
    /// pre-allocated participant rows and stamp the request approved, all
    /// in one atomic unit.
    ///
    /// A ticket-number conflict aborts the whole commit; nothing is left
    /// allocated without a completed request.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The request is absent → `RaffleError::NotFound`
    /// - The request is not pending → `RaffleError::InvalidState`
    /// - A number was claimed since the snapshot → `RaffleError::NumberTaken`
    /// - The store fails → `RaffleError::StoreUnavailable`
    async fn commit_approval(
        &self,
        id: RequestId,
        participants: &[Participant],
        decided_at: DateTime<Utc>,
    ) -> Result<ExtraNumberRequest>;

    /// Commit a rejection: verify the request is still pending and stamp it
    /// rejected. No participant rows are created.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The request is absent → `RaffleError::NotFound`
    /// - The request is not pending → `RaffleError::InvalidState`
    /// - The store fails → `RaffleError::StoreUnavailable`
    async fn commit_rejection(
        &self,
        id: RequestId,
        decided_at: DateTime<Utc>,
    ) -> Result<ExtraNumberRequest>;

    // ═══════════════════════════════════════════════════════════════════════
    // Draw outcome
    // ═══════════════════════════════════════════════════════════════════════
    /// The persisted draw outcome, if the cycle has been drawn.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn draw_outcome(&self) -> Result<Option<DrawOutcome>>;

    /// Persist the draw outcome, atomically with the at-most-one check.
    ///
    /// Two simultaneous calls must not both succeed.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - An outcome already exists → `RaffleError::AlreadyDrawn`
    /// - The winner row vanished since selection → `RaffleError::StoreUnavailable`
    ///   (retryable; nothing was committed)
    /// - The store fails → `RaffleError::StoreUnavailable`
    async fn record_draw(&self, outcome: &DrawOutcome) -> Result<DrawOutcome>;

    // ═══════════════════════════════════════════════════════════════════════
    // Cycle reset
    // ═══════════════════════════════════════════════════════════════════════
    /// Wipe participants, requests and the draw outcome in one atomic unit,
    /// returning the system to its initial state.
    ///
    /// # Errors
    ///
    /// Returns error if the store wipe fails; the wipe is safe to re-run.
    async fn reset(&self) -> Result<()>;
}
