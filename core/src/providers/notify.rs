//! Fire-and-forget notification trait.

use crate::types::{Participant, PhoneNumber, RequestId, TicketNumber};

/// Domain notification emitted after a successful state change.
#[derive(Clone, Debug, PartialEq)]
pub enum RaffleNotification {
    /// A participant claimed a number directly.
    ParticipantRegistered {
        /// The new row.
        participant: Participant,
    },
    /// An extra-number request was approved and numbers allocated.
    ExtraNumbersGranted {
        /// The approved request.
        request_id: RequestId,
        /// The requester contact.
        contact: PhoneNumber,
        /// The allocated numbers.
        numbers: Vec<TicketNumber>,
    },
    /// An extra-number request was rejected.
    RequestRejected {
        /// The rejected request.
        request_id: RequestId,
        /// The requester contact.
        contact: PhoneNumber,
    },
    /// The draw selected a winner.
    WinnerDrawn {
        /// The winning row.
        winner: Participant,
    },
    /// The cycle was reset to its initial state.
    CycleReset,
}

/// Notification sink.
///
/// Never awaited for correctness: delivery failure must not roll back the
/// committed write that produced the notification.
pub trait Notifier: Send + Sync {
    /// Deliver a notification, best effort.
    fn notify(&self, notification: &RaffleNotification);
}
