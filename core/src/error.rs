//! Error types for raffle operations.

use crate::types::{Money, Participant, RequestId, RequestStatus, TicketNumber};
use thiserror::Error;

/// Result type alias for raffle operations.
pub type Result<T> = std::result::Result<T, RaffleError>;

/// Error taxonomy for the number allocation and draw subsystem.
///
/// Conflict variants are expected, non-fatal outcomes of normal concurrent
/// use; nothing here is fatal to the process, and every failure is scoped
/// to the single requested operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RaffleError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors (rejected before any write)
    // ═══════════════════════════════════════════════════════════
    /// Malformed name, contact or amount.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// Declared purchase amount is below one unit price.
    #[error("Purchase amount {amount} is below the minimum of {minimum}")]
    BelowMinimumPurchase {
        /// Declared amount.
        amount: Money,
        /// Minimum accepted amount (one unit).
        minimum: Money,
    },

    // ═══════════════════════════════════════════════════════════
    // Conflict Errors (expected under concurrent use)
    // ═══════════════════════════════════════════════════════════
    /// The requested ticket number is already claimed.
    #[error("Ticket number {number} is already taken")]
    NumberTaken {
        /// The contested number.
        number: TicketNumber,
    },

    /// The contact identity already registered directly.
    ///
    /// Carries the row that established the identity so callers can offer
    /// account recovery instead of a bare failure.
    #[error("Contact {} already has a registration", existing.contact)]
    ContactAlreadyRegistered {
        /// The earliest existing row for the contact.
        existing: Box<Participant>,
    },

    /// The contact already has a pending extra-number request.
    #[error("Contact already has a pending request {request_id}")]
    DuplicatePendingRequest {
        /// The pending request.
        request_id: RequestId,
    },

    /// The request is not in a state that allows the transition.
    #[error("Request is {status}, expected pending")]
    InvalidState {
        /// Current terminal status of the request.
        status: RequestStatus,
    },

    /// A draw outcome already exists for this cycle.
    #[error("The draw has already happened")]
    AlreadyDrawn,

    // ═══════════════════════════════════════════════════════════
    // Resource Errors
    // ═══════════════════════════════════════════════════════════
    /// Not enough unclaimed numbers to satisfy the allocation.
    #[error("Pool has {available} numbers left, {requested} requested")]
    InsufficientPool {
        /// Numbers requested.
        requested: u32,
        /// Numbers still unclaimed at the snapshot.
        available: u32,
    },

    /// The registry is empty; there is nothing to draw from.
    #[error("No participants registered")]
    NoParticipants,

    /// The referenced entity does not exist.
    #[error("Not found")]
    NotFound,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════
    /// The store failed or timed out; the outcome of the write is unknown.
    ///
    /// Callers retry with backoff; the subsystem never retries a write
    /// whose outcome is unknown on its own.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Proof storage failed; blocks submission only.
    #[error("Proof storage failed: {0}")]
    ProofStorageFailed(String),
}

impl RaffleError {
    /// Returns `true` if this error was rejected before any write.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::BelowMinimumPurchase { .. }
        )
    }

    /// Returns `true` for expected conflicts of normal concurrent use.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::NumberTaken { .. }
                | Self::ContactAlreadyRegistered { .. }
                | Self::DuplicatePendingRequest { .. }
                | Self::InvalidState { .. }
                | Self::AlreadyDrawn
        )
    }

    /// Returns `true` if the caller may retry the operation with backoff.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
