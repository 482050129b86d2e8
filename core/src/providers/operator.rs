//! Operator gating trait.

use crate::error::Result;

/// Opaque "is this caller an operator" predicate.
///
/// Supplied by the identity/session collaborator; the raffle subsystem
/// performs no authentication logic itself.
pub trait OperatorGate: Send + Sync {
    /// Whether the presented credential belongs to an operator.
    ///
    /// # Errors
    ///
    /// Returns error if the identity provider cannot be reached.
    async fn is_operator(&self, credential: &str) -> Result<bool>;
}
