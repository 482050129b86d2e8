//! HTTP handlers for the raffle operation surface.

pub mod admin;
pub mod draw;
pub mod health;
pub mod participants;
pub mod pool;
pub mod requests;

use chrono::{DateTime, Utc};
use rifa_core::types::{ExtraNumberRequest, Participant};
use serde::Serialize;
use uuid::Uuid;

/// One participant row as returned by the API.
#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    /// Row identifier
    pub id: Uuid,
    /// Full name
    pub name: String,
    /// Canonical contact
    pub contact: String,
    /// Ticket number
    pub number: u32,
    /// `direct` or `extra`
    pub origin: String,
    /// When the row was created
    pub registered_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            id: *participant.id.as_uuid(),
            name: participant.name.to_string(),
            contact: participant.contact.to_string(),
            number: participant.number.get(),
            origin: participant.origin.as_str().to_string(),
            registered_at: participant.registered_at,
        }
    }
}

/// One extra-number request as returned by the API.
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    /// Request identifier
    pub id: Uuid,
    /// Requester full name
    pub name: String,
    /// Requester canonical contact
    pub contact: String,
    /// Declared amount in cents
    pub amount_cents: u64,
    /// Tickets owed if approved
    pub extra_count: u32,
    /// Workflow status
    pub status: String,
    /// Numbers allocated on approval
    pub granted_numbers: Vec<u32>,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Decision time, if decided
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<ExtraNumberRequest> for RequestResponse {
    fn from(request: ExtraNumberRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            name: request.name.to_string(),
            contact: request.contact.to_string(),
            amount_cents: request.amount.cents(),
            extra_count: request.extra_count,
            status: request.status.as_str().to_string(),
            granted_numbers: request.granted_numbers.iter().map(|n| n.get()).collect(),
            created_at: request.created_at,
            decided_at: request.decided_at,
        }
    }
}
