//! Mock notifier.

use crate::providers::{Notifier, RaffleNotification};
use std::sync::{Arc, Mutex};

/// Mock notifier that records every notification.
#[derive(Clone, Debug, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<RaffleNotification>>>,
}

impl MockNotifier {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<RaffleNotification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, notification: &RaffleNotification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
    }
}
