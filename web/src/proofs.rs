//! Filesystem proof storage.

use rifa_core::error::{RaffleError, Result};
use rifa_core::providers::ProofStorage;
use rifa_core::types::{ProofFile, ProofUri};
use std::path::PathBuf;
use uuid::Uuid;

/// Proof storage that writes artifacts to a local directory.
#[derive(Clone, Debug)]
pub struct FsProofStorage {
    dir: PathBuf,
}

impl FsProofStorage {
    /// Create storage rooted at `dir`; the directory is created on first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn sanitize(name: &str) -> String {
        let safe: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            .collect();
        if safe.is_empty() { "proof.bin".to_string() } else { safe }
    }
}

impl ProofStorage for FsProofStorage {
    async fn store(&self, file: &ProofFile) -> Result<ProofUri> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RaffleError::ProofStorageFailed(format!("create proof dir: {e}")))?;

        let path = self
            .dir
            .join(format!("{}-{}", Uuid::new_v4(), Self::sanitize(&file.name)));
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| RaffleError::ProofStorageFailed(format!("write proof: {e}")))?;

        Ok(ProofUri::new(format!("file://{}", path.display())))
    }

    async fn delete(&self, uri: &ProofUri) -> Result<()> {
        let Some(path) = uri.as_str().strip_prefix("file://") else {
            // A reference this storage did not mint; nothing to remove.
            return Ok(());
        };

        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RaffleError::ProofStorageFailed(format!(
                "delete proof: {e}"
            ))),
        }
    }
}
