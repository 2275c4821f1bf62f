//! Audit entries for text-generation calls. Prompts and outputs are stored
//! only as SHA-256 digests.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub provider: String,
    pub model: String,
    pub prompt_hash: String,
    pub output_hash: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl LlmAuditEntry {
    pub fn new(
        provider: String,
        model: String,
        prompt: &str,
        output: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider,
            model,
            prompt_hash: sha256_hex(prompt),
            output_hash: sha256_hex(output),
            prompt_tokens,
            completion_tokens,
            latency_ms,
            called_at: Utc::now(),
        }
    }
}
