//! Proof-of-payment storage trait.

use crate::error::Result;
use crate::types::{ProofFile, ProofUri};

/// External storage for payment proofs.
///
/// Failures here block `submit` but never `approve`/`reject`; deletion
/// failures during a cycle reset are logged and swallowed.
pub trait ProofStorage: Send + Sync {
    /// Persist a proof file and return its opaque reference.
    ///
    /// # Errors
    ///
    /// Returns error if the artifact cannot be stored.
    async fn store(&self, file: &ProofFile) -> Result<ProofUri>;

    /// Delete a previously stored proof.
    ///
    /// # Errors
    ///
    /// Returns error if the artifact cannot be deleted.
    async fn delete(&self, uri: &ProofUri) -> Result<()>;
}
