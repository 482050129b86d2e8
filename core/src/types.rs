//! Domain types for the raffle number allocation and draw subsystem.
//!
//! This module contains all value objects and entities: ticket numbers,
//! contact identities, participants, extra-number requests and the draw
//! outcome. Uniqueness and draw-weighting logic operate uniformly over
//! `Participant` rows regardless of how a row was created.

use crate::error::{RaffleError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a participant row (one row per allocated ticket).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Creates a new random `ParticipantId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ParticipantId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an extra-number request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RequestId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a draw outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawId(Uuid);

impl DrawId {
    /// Creates a new random `DrawId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `DrawId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DrawId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DrawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ticket Number
// ============================================================================

/// A raffle entry number in `[1, pool_size]`.
///
/// Range membership is validated against [`crate::config::RaffleConfig`];
/// the type itself only guarantees the number is non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketNumber(u32);

impl TicketNumber {
    /// Creates a `TicketNumber`. Returns `None` for zero.
    #[must_use]
    pub const fn new(number: u32) -> Option<Self> {
        if number == 0 { None } else { Some(Self(number)) }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Contact Identity (phone number)
// ============================================================================

/// Canonical phone contact identity, formatted `(DD) DDDDD-DDDD`.
///
/// The phone number is the identity used to recognize a returning
/// participant across sessions; parsing strips punctuation and requires
/// exactly eleven digits (two-digit area code plus nine-digit number).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses and canonicalizes a phone number.
    ///
    /// Accepts either a pre-formatted value or a raw digit string.
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::InvalidInput`] if the input does not contain
    /// exactly eleven digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use rifa_core::types::PhoneNumber;
    ///
    /// let phone = PhoneNumber::parse("11987654321").unwrap();
    /// assert_eq!(phone.as_str(), "(11) 98765-4321");
    /// assert_eq!(PhoneNumber::parse("(11) 98765-4321").unwrap(), phone);
    /// assert!(PhoneNumber::parse("12345").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 11 {
            return Err(RaffleError::InvalidInput {
                reason: format!("phone number must have 11 digits, got {}", digits.len()),
            });
        }
        Ok(Self(format!(
            "({}) {}-{}",
            &digits[0..2],
            &digits[2..7],
            &digits[7..11]
        )))
    }

    /// Returns the canonical representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Full Name
// ============================================================================

/// Participant full name. Must tokenize into at least two non-empty words.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullName(String);

impl FullName {
    /// Parses a full name, collapsing interior whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::InvalidInput`] if fewer than two words remain
    /// after tokenization.
    ///
    /// # Examples
    ///
    /// ```
    /// use rifa_core::types::FullName;
    ///
    /// assert_eq!(FullName::parse("  Ana   Souza ").unwrap().as_str(), "Ana Souza");
    /// assert!(FullName::parse("Ana").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let words: Vec<&str> = input.split_whitespace().collect();
        if words.len() < 2 {
            return Err(RaffleError::InvalidInput {
                reason: "full name must contain at least two words".to_string(),
            });
        }
        Ok(Self(words.join(" ")))
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole currency units (rounded down)
    #[must_use]
    pub const fn units(&self) -> u64 {
        self.0 / 100
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R${}.{:02}", self.units(), self.0 % 100)
    }
}

// ============================================================================
// Proof of payment
// ============================================================================

/// Opaque reference to a stored proof-of-payment artifact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofUri(String);

impl ProofUri {
    /// Creates a `ProofUri` from an already-stored artifact reference.
    #[must_use]
    pub const fn new(uri: String) -> Self {
        Self(uri)
    }

    /// Returns the reference as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProofUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An uploaded proof-of-payment file, as received from the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofFile {
    /// Original file name supplied by the uploader.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ProofFile {
    /// Creates a new `ProofFile`.
    #[must_use]
    pub const fn new(name: String, bytes: Vec<u8>) -> Self {
        Self { name, bytes }
    }
}

// ============================================================================
// Participant
// ============================================================================

/// How a participant row came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketOrigin {
    /// Created by public registration (at most one per contact).
    Direct,
    /// Created by an approved extra-number request.
    Extra,
}

impl TicketOrigin {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Extra => "extra",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direct" => Some(Self::Direct),
            "extra" => Some(Self::Extra),
            _ => None,
        }
    }
}

impl fmt::Display for TicketOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One raffle entry: a ticket number held by a contact identity.
///
/// A contact may hold many rows (the first from direct registration, the
/// rest from approved extras); every row is an equally weighted entry in
/// the draw. Rows are never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique row identifier.
    pub id: ParticipantId,
    /// Participant full name.
    pub name: FullName,
    /// Contact identity (canonical phone number).
    pub contact: PhoneNumber,
    /// Allocated ticket number, unique across all rows.
    pub number: TicketNumber,
    /// How this row was created.
    pub origin: TicketOrigin,
    /// When the row was created.
    pub registered_at: DateTime<Utc>,
}

impl Participant {
    /// Creates a new `Participant`.
    #[must_use]
    pub const fn new(
        id: ParticipantId,
        name: FullName,
        contact: PhoneNumber,
        number: TicketNumber,
        origin: TicketOrigin,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            contact,
            number,
            origin,
            registered_at,
        }
    }
}

// ============================================================================
// Extra Number Request
// ============================================================================

/// Workflow state of an extra-number request.
///
/// The only transitions are `Pending -> Approved` and `Pending -> Rejected`,
/// each performed in a single operator action; both non-pending states are
/// terminal and completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Submitted, awaiting an operator decision.
    Pending,
    /// Approved and completed; numbers were allocated.
    Approved,
    /// Rejected and completed; no numbers were allocated.
    Rejected,
}

impl RequestStatus {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether an operator decision is still possible.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchase-backed claim for additional ticket numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtraNumberRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// Requester full name.
    pub name: FullName,
    /// Requester contact identity.
    pub contact: PhoneNumber,
    /// Declared purchase amount.
    pub amount: Money,
    /// Tickets owed if approved: `floor(amount / unit_price) * tickets_per_unit`.
    pub extra_count: u32,
    /// Stored proof-of-payment reference.
    pub proof: ProofUri,
    /// Workflow state.
    pub status: RequestStatus,
    /// Numbers allocated on approval; empty otherwise.
    pub granted_numbers: Vec<TicketNumber>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the operator decided; `None` while pending.
    pub decided_at: Option<DateTime<Utc>>,
}

impl ExtraNumberRequest {
    /// Creates a new pending request.
    #[must_use]
    pub const fn new(
        id: RequestId,
        name: FullName,
        contact: PhoneNumber,
        amount: Money,
        extra_count: u32,
        proof: ProofUri,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            contact,
            amount,
            extra_count,
            proof,
            status: RequestStatus::Pending,
            granted_numbers: Vec::new(),
            created_at,
            decided_at: None,
        }
    }
}

// ============================================================================
// Draw Outcome
// ============================================================================

/// The single irreversible draw result for the current cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawOutcome {
    /// Unique outcome identifier.
    pub id: DrawId,
    /// The winning participant row.
    pub winner: ParticipantId,
    /// When the draw happened.
    pub drawn_at: DateTime<Utc>,
}

impl DrawOutcome {
    /// Creates a new `DrawOutcome`.
    #[must_use]
    pub const fn new(id: DrawId, winner: ParticipantId, drawn_at: DateTime<Utc>) -> Self {
        Self {
            id,
            winner,
            drawn_at,
        }
    }
}

// ============================================================================
// Pool read model
// ============================================================================

/// Read-model summary of the number pool, for availability indicators.
///
/// Derived from participant rows on demand; authoritative only as of the
/// committed state it was read from, never for write-path decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Total numbers in the pool.
    pub pool_size: u32,
    /// Claimed numbers, ascending.
    pub claimed: Vec<TicketNumber>,
}

impl PoolStatus {
    /// Numbers still available.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // claimed never exceeds pool_size
    pub fn remaining(&self) -> u32 {
        self.pool_size.saturating_sub(self.claimed.len() as u32)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn phone_parse_canonicalizes_raw_digits() {
        let phone = PhoneNumber::parse("21 9 8888-7777").unwrap();
        assert_eq!(phone.as_str(), "(21) 98888-7777");
    }

    #[test]
    fn phone_parse_is_idempotent_on_canonical_form() {
        let phone = PhoneNumber::parse("(11) 91234-5678").unwrap();
        let again = PhoneNumber::parse(phone.as_str()).unwrap();
        assert_eq!(phone, again);
    }

    #[test]
    fn phone_parse_rejects_wrong_length() {
        assert!(PhoneNumber::parse("1234567890").is_err());
        assert!(PhoneNumber::parse("123456789012").is_err());
        assert!(PhoneNumber::parse("no digits here").is_err());
    }

    #[test]
    fn full_name_requires_two_words() {
        assert!(FullName::parse("Maria").is_err());
        assert!(FullName::parse("   ").is_err());
        assert_eq!(
            FullName::parse("Maria  da Silva").unwrap().as_str(),
            "Maria da Silva"
        );
    }

    #[test]
    fn ticket_number_rejects_zero() {
        assert!(TicketNumber::new(0).is_none());
        assert_eq!(TicketNumber::new(42).unwrap().get(), 42);
    }

    #[test]
    fn money_display_uses_cents() {
        assert_eq!(Money::from_cents(700).to_string(), "R$7.00");
        assert_eq!(Money::from_cents(1050).to_string(), "R$10.50");
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::parse("completed"), None);
    }
}
