//! biosynth-llm: generative-text backends for recommendation writing.
//! Provides the LlmBackend trait, the Anthropic and Gemini clients, and the
//! ordered provider chain used by the recommendation stage.

pub mod backend;
pub mod chain;
pub mod audit;

pub use backend::{AnthropicBackend, GeminiBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use chain::{ChainCompletion, ProviderChain};
