//! Tracing-backed notification sink.

use rifa_core::providers::{Notifier, RaffleNotification};
use tracing::info;

/// Notifier that emits structured log events.
///
/// Stands in for the UI toast/notification collaborator; delivery is
/// observable in the logs and never awaited.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &RaffleNotification) {
        match notification {
            RaffleNotification::ParticipantRegistered { participant } => {
                info!(
                    participant = %participant.id,
                    number = %participant.number,
                    "notification: participant registered"
                );
            }
            RaffleNotification::ExtraNumbersGranted {
                request_id,
                numbers,
                ..
            } => {
                info!(
                    request = %request_id,
                    granted = numbers.len(),
                    "notification: extra numbers granted"
                );
            }
            RaffleNotification::RequestRejected { request_id, .. } => {
                info!(request = %request_id, "notification: request rejected");
            }
            RaffleNotification::WinnerDrawn { winner } => {
                info!(
                    winner = %winner.id,
                    number = %winner.number,
                    "notification: winner drawn"
                );
            }
            RaffleNotification::CycleReset => {
                info!("notification: cycle reset");
            }
        }
    }
}
