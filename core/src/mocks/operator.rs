//! Mock operator gate.

use crate::error::Result;
use crate::providers::OperatorGate;
use std::collections::HashSet;

/// Mock operator gate backed by a fixed credential allowlist.
#[derive(Clone, Debug, Default)]
pub struct MockOperatorGate {
    allowed: HashSet<String>,
}

impl MockOperatorGate {
    /// Create a gate that accepts the given credentials.
    #[must_use]
    pub fn allowing<I: IntoIterator<Item = String>>(credentials: I) -> Self {
        Self {
            allowed: credentials.into_iter().collect(),
        }
    }
}

impl OperatorGate for MockOperatorGate {
    async fn is_operator(&self, credential: &str) -> Result<bool> {
        Ok(self.allowed.contains(credential))
    }
}
