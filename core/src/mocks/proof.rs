//! Mock proof storage.

use crate::error::{RaffleError, Result};
use crate::providers::ProofStorage;
use crate::types::{ProofFile, ProofUri};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Default)]
struct ProofState {
    stored: HashMap<ProofUri, Vec<u8>>,
    deleted: Vec<ProofUri>,
    fail_store: bool,
}

/// Mock proof storage.
///
/// Records stored and deleted artifacts; can be told to fail on store to
/// exercise the submit-blocking behavior.
#[derive(Clone, Debug, Default)]
pub struct MockProofStorage {
    state: Arc<Mutex<ProofState>>,
}

impl MockProofStorage {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `store` calls fail.
    pub fn fail_store(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_store = fail;
        }
    }

    /// Number of artifacts currently stored.
    #[must_use]
    pub fn stored_count(&self) -> usize {
        self.state.lock().map(|s| s.stored.len()).unwrap_or(0)
    }

    /// References deleted so far.
    #[must_use]
    pub fn deleted(&self) -> Vec<ProofUri> {
        self.state.lock().map(|s| s.deleted.clone()).unwrap_or_default()
    }
}

impl ProofStorage for MockProofStorage {
    async fn store(&self, file: &ProofFile) -> Result<ProofUri> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RaffleError::StoreUnavailable("proof lock poisoned".to_string()))?;
        if state.fail_store {
            return Err(RaffleError::ProofStorageFailed(
                "mock store failure".to_string(),
            ));
        }
        let uri = ProofUri::new(format!("mock://proofs/{}-{}", Uuid::new_v4(), file.name));
        state.stored.insert(uri.clone(), file.bytes.clone());
        Ok(uri)
    }

    async fn delete(&self, uri: &ProofUri) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RaffleError::StoreUnavailable("proof lock poisoned".to_string()))?;
        state.stored.remove(uri);
        state.deleted.push(uri.clone());
        Ok(())
    }
}
