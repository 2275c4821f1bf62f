//! Ordered provider chain: try each configured backend in turn until one
//! returns a non-empty completion.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::audit::LlmAuditEntry;
use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

/// A named slot in the chain. `backend` is `None` when the provider has no credentials.
#[derive(Clone)]
pub struct ProviderSlot {
    pub name: String,
    pub backend: Option<Arc<dyn LlmBackend>>,
}

/// Successful completion plus the slot that produced it.
#[derive(Debug, Clone)]
pub struct ChainCompletion {
    pub provider: String,
    pub response: LlmResponse,
    pub audit: LlmAuditEntry,
}

pub struct ProviderChain {
    slots: Vec<ProviderSlot>,
    timeout: Duration,
}

impl ProviderChain {
    pub fn new(timeout: Duration) -> Self {
        Self { slots: Vec::new(), timeout }
    }

    /// Append a provider. Order of registration is order of preference.
    pub fn with_provider(mut self, name: impl Into<String>, backend: Option<Arc<dyn LlmBackend>>) -> Self {
        self.slots.push(ProviderSlot { name: name.into(), backend });
        self
    }

    /// Names of every registered provider, configured or not.
    /// Names of providers that hold credentials.
    pub fn configured(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| s.backend.is_some())
            .map(|s| s.name.as_str())
            .collect()
    }

    /// First configured provider, if any.
    pub fn primary(&self) -> Option<&str> {
        self.configured().into_iter().next()
    }

    /// Run the request through the chain. Returns `Unavailable` only when
    /// every provider was skipped or failed.
    pub async fn complete(&self, req: LlmRequest) -> Result<ChainCompletion, LlmError> {
        let prompt_text = req.messages.iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        for slot in &self.slots {
            let Some(backend) = &slot.backend else {
                debug!(provider = %slot.name, "No credentials, skipping provider");
                continue;
            };

            let started = Instant::now();
            let outcome = match tokio::time::timeout(self.timeout, backend.complete(req.clone())).await {
                Ok(Ok(resp)) if resp.content.trim().is_empty() => Err(LlmError::EmptyResponse),
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(response) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    let audit = LlmAuditEntry::new(
                        slot.name.clone(),
                        response.model.clone(),
                        &prompt_text,
                        &response.content,
                        response.prompt_tokens,
                        response.completion_tokens,
                        latency_ms,
                    );
                    debug!(?audit, "Text generation audit");
                    info!(provider = %slot.name, model = %response.model, latency_ms, "Text generated");
                    return Ok(ChainCompletion { provider: slot.name.clone(), response, audit });
                }
                Err(e) => {
                    warn!(provider = %slot.name, error = %e, "Provider failed, falling through");
                }
            }
        }

        Err(LlmError::Unavailable("no text provider produced a completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behaviour {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct MockBackend {
        name: &'static str,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn arc(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self { name, behaviour, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Reply(text) => Ok(LlmResponse {
                    content: text.to_string(),
                    model: format!("{}-model", self.name),
                    prompt_tokens: 10,
                    completion_tokens: 5,
                }),
                Behaviour::Fail => Err(LlmError::ApiError { status: 500, message: "boom".into() }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(LlmError::Unavailable("unreachable".into()))
                }
            }
        }
        fn model_id(&self) -> &str { self.name }
        fn provider(&self) -> &str { self.name }
    }

    fn req() -> LlmRequest {
        LlmRequest::prompt("Recommend next steps", 64)
    }

    #[tokio::test]
    async fn test_primary_success_short_circuits() {
        let primary = MockBackend::arc("anthropic", Behaviour::Reply("Use primary."));
        let secondary = MockBackend::arc("gemini", Behaviour::Reply("Use secondary."));
        let chain = ProviderChain::new(Duration::from_secs(1))
            .with_provider("anthropic", Some(primary.clone()))
            .with_provider("gemini", Some(secondary.clone()));

        let out = tokio_test::assert_ok!(chain.complete(req()).await);
        assert_eq!(out.provider, "anthropic");
        assert_eq!(out.response.content, "Use primary.");
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_and_empty_reply_fall_through() {
        let failing = MockBackend::arc("anthropic", Behaviour::Fail);
        let empty = MockBackend::arc("gemini", Behaviour::Reply("   "));
        let last = MockBackend::arc("local", Behaviour::Reply("Third time lucky."));
        let chain = ProviderChain::new(Duration::from_secs(1))
            .with_provider("anthropic", Some(failing))
            .with_provider("gemini", Some(empty))
            .with_provider("local", Some(last));

        let out = chain.complete(req()).await.unwrap();
        assert_eq!(out.provider, "local");
        assert_eq!(out.audit.provider, "local");
    }

    #[tokio::test]
    async fn test_unconfigured_providers_are_skipped() {
        let secondary = MockBackend::arc("gemini", Behaviour::Reply("From gemini."));
        let chain = ProviderChain::new(Duration::from_secs(1))
            .with_provider("anthropic", None)
            .with_provider("gemini", Some(secondary));

        assert_eq!(chain.configured(), vec!["gemini"]);
        assert_eq!(chain.primary(), Some("gemini"));
        assert_eq!(chain.complete(req()).await.unwrap().provider, "gemini");
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let slow = MockBackend::arc("anthropic", Behaviour::Hang);
        let chain = ProviderChain::new(Duration::from_millis(20))
            .with_provider("anthropic", Some(slow));

        let err = chain.complete(req()).await.unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_chain_is_unavailable() {
        let chain = ProviderChain::new(Duration::from_secs(1));
        assert!(chain.primary().is_none());
        assert!(chain.complete(req()).await.is_err());
    }
}
