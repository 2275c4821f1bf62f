//! External protein folding service.

use async_trait::async_trait;
use biosynth_common::error::BiosynthError;
use biosynth_common::sandbox::SandboxClient;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum FoldingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Sandbox(#[from] BiosynthError),
    #[error("Folding service returned an empty structure")]
    Empty,
    #[error("Folding service timed out after {0:?}")]
    Timeout(Duration),
}

/// Predicts a 3-D structure and returns it as PDB text.
#[async_trait]
pub trait FoldingService: Send + Sync {
    async fn fold(&self, sequence: &str) -> Result<String, FoldingError>;
}

/// ESM Atlas `foldSequence` endpoint: the raw sequence is POSTed, PDB text comes back.
pub struct EsmFoldClient {
    client: SandboxClient,
    url: String,
}

impl EsmFoldClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FoldingError> {
        Ok(Self {
            client: SandboxClient::new(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FoldingService for EsmFoldClient {
    #[instrument(skip(self, sequence), fields(len = sequence.len()))]
    async fn fold(&self, sequence: &str) -> Result<String, FoldingError> {
        info!("Requesting structure from ESMFold");
        let pdb = self.client
            .post(&self.url)?
            .header("content-type", "text/plain")
            .body(sequence.to_string())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        if pdb.trim().is_empty() {
            return Err(FoldingError::Empty);
        }
        Ok(pdb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_unlisted_host() {
        let client = EsmFoldClient::new("https://folding.invalid/pdb", Duration::from_secs(1)).unwrap();
        let err = client.client.post(&client.url).unwrap_err();
        assert!(matches!(err, BiosynthError::Security(_)));
    }
}
