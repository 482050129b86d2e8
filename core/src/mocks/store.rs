//! In-memory raffle store.

use crate::error::{RaffleError, Result};
use crate::providers::RaffleStore;
use crate::types::{
    DrawOutcome, ExtraNumberRequest, Participant, ParticipantId, PhoneNumber, RequestId,
    RequestStatus, TicketNumber, TicketOrigin,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct StoreState {
    participants: Vec<Participant>,
    requests: Vec<ExtraNumberRequest>,
    outcome: Option<DrawOutcome>,
}

/// In-memory raffle store.
///
/// Every operation takes the single state lock, so each call observes and
/// mutates a consistent snapshot exactly like a store-level transaction.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRaffleStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryRaffleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| RaffleError::StoreUnavailable("state lock poisoned".to_string()))
    }
}

impl RaffleStore for InMemoryRaffleStore {
    async fn insert_participant(&self, participant: &Participant) -> Result<Participant> {
        let mut state = self.lock()?;

        if state
            .participants
            .iter()
            .any(|p| p.number == participant.number)
        {
            return Err(RaffleError::NumberTaken {
                number: participant.number,
            });
        }

        // Direct registration is one-per-contact; extras attach to an
        // identity established by an earlier direct row.
        if participant.origin == TicketOrigin::Direct {
            let existing = state
                .participants
                .iter()
                .filter(|p| p.contact == participant.contact)
                .min_by_key(|p| p.registered_at);
            if let Some(existing) = existing {
                return Err(RaffleError::ContactAlreadyRegistered {
                    existing: Box::new(existing.clone()),
                });
            }
        }

        state.participants.push(participant.clone());
        Ok(participant.clone())
    }

    async fn participants_by_contact(&self, contact: &PhoneNumber) -> Result<Vec<Participant>> {
        let state = self.lock()?;
        let mut rows: Vec<Participant> = state
            .participants
            .iter()
            .filter(|p| &p.contact == contact)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.registered_at, p.number));
        Ok(rows)
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        let state = self.lock()?;
        let mut rows = state.participants.clone();
        rows.sort_by_key(|p| p.number);
        Ok(rows)
    }

    async fn remove_participant(&self, id: ParticipantId) -> Result<()> {
        let mut state = self.lock()?;
        if state.outcome.as_ref().is_some_and(|o| o.winner == id) {
            return Err(RaffleError::StoreUnavailable(
                "participant is referenced by the draw outcome".to_string(),
            ));
        }
        let before = state.participants.len();
        state.participants.retain(|p| p.id != id);
        if state.participants.len() == before {
            return Err(RaffleError::NotFound);
        }
        Ok(())
    }

    async fn claimed_numbers(&self) -> Result<HashSet<TicketNumber>> {
        let state = self.lock()?;
        Ok(state.participants.iter().map(|p| p.number).collect())
    }

    async fn participant_count(&self) -> Result<u64> {
        let state = self.lock()?;
        Ok(state.participants.len() as u64)
    }

    async fn insert_request(&self, request: &ExtraNumberRequest) -> Result<ExtraNumberRequest> {
        let mut state = self.lock()?;
        state.requests.push(request.clone());
        Ok(request.clone())
    }

    async fn request(&self, id: RequestId) -> Result<ExtraNumberRequest> {
        let state = self.lock()?;
        state
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RaffleError::NotFound)
    }

    async fn list_requests(&self) -> Result<Vec<ExtraNumberRequest>> {
        let state = self.lock()?;
        let mut rows = state.requests.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn pending_request_for_contact(
        &self,
        contact: &PhoneNumber,
    ) -> Result<Option<ExtraNumberRequest>> {
        let state = self.lock()?;
        Ok(state
            .requests
            .iter()
            .find(|r| &r.contact == contact && r.status.is_pending())
            .cloned())
    }

    async fn commit_approval(
        &self,
        id: RequestId,
        participants: &[Participant],
        decided_at: DateTime<Utc>,
    ) -> Result<ExtraNumberRequest> {
        let mut state = self.lock()?;

        let index = state
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(RaffleError::NotFound)?;
        let status = state.requests[index].status;
        if !status.is_pending() {
            return Err(RaffleError::InvalidState { status });
        }

        // Re-validate the allocation against the current committed state;
        // any conflict aborts the whole commit.
        for participant in participants {
            if state
                .participants
                .iter()
                .any(|p| p.number == participant.number)
            {
                return Err(RaffleError::NumberTaken {
                    number: participant.number,
                });
            }
        }

        state.participants.extend(participants.iter().cloned());
        let request = &mut state.requests[index];
        request.status = RequestStatus::Approved;
        request.granted_numbers = participants.iter().map(|p| p.number).collect();
        request.decided_at = Some(decided_at);
        Ok(request.clone())
    }

    async fn commit_rejection(
        &self,
        id: RequestId,
        decided_at: DateTime<Utc>,
    ) -> Result<ExtraNumberRequest> {
        let mut state = self.lock()?;

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RaffleError::NotFound)?;
        if !request.status.is_pending() {
            return Err(RaffleError::InvalidState {
                status: request.status,
            });
        }

        request.status = RequestStatus::Rejected;
        request.decided_at = Some(decided_at);
        Ok(request.clone())
    }

    async fn draw_outcome(&self) -> Result<Option<DrawOutcome>> {
        let state = self.lock()?;
        Ok(state.outcome.clone())
    }

    async fn record_draw(&self, outcome: &DrawOutcome) -> Result<DrawOutcome> {
        let mut state = self.lock()?;

        if state.outcome.is_some() {
            return Err(RaffleError::AlreadyDrawn);
        }
        if !state.participants.iter().any(|p| p.id == outcome.winner) {
            return Err(RaffleError::StoreUnavailable(
                "selected winner no longer exists".to_string(),
            ));
        }

        state.outcome = Some(outcome.clone());
        Ok(outcome.clone())
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.participants.clear();
        state.requests.clear();
        state.outcome = None;
        Ok(())
    }
}
