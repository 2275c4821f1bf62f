//! Generative-text backend trait and concrete implementations.
//!
//! Backends:
//!   AnthropicBackend: Anthropic Messages API (claude-*)
//!   GeminiBackend:    Google Gemini generateContent API

use async_trait::async_trait;
use biosynth_common::error::BiosynthError;
use biosynth_common::sandbox::SandboxClient;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MAX_TOKENS: u32 = 1024;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] BiosynthError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Backend returned an empty completion")]
    EmptyResponse,
    #[error("Backend timed out after {0:?}")]
    Timeout(Duration),
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    /// Single user-turn request.
    pub fn prompt(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(max_tokens),
        }
    }

    /// Prepend a system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.messages.insert(0, Message::system(system));
        self
    }

    fn system_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .filter(|s| !s.is_empty())
    }

    fn turns(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != "system")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
    /// Human-readable provider name used in logs and status reports.
    fn provider(&self) -> &str;
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await?;
    if status >= 400 {
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status, message: msg });
    }
    Ok(body)
}

// ── 1. Anthropic (claude-*) ───────────────────────────────────────────────────

pub struct AnthropicBackend {
    pub model: String,
    api_key: SecretString,
    client: SandboxClient,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            client: SandboxClient::new(timeout)?,
        })
    }
}

/// Messages API body: the system prompt travels separately from the turns.
pub(crate) fn anthropic_body(req: &LlmRequest, model: &str) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = req.turns()
        .map(|m| serde_json::json!({"role": m.role, "content": m.content}))
        .collect();

    let mut body = serde_json::json!({
        "model":      model,
        "messages":   messages,
        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    });
    if let Some(system) = req.system_text() {
        body["system"] = serde_json::Value::String(system.to_string());
    }
    body
}

pub(crate) fn parse_anthropic_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    let content = json["content"]
        .as_array()
        .and_then(|blocks| blocks.first())
        .and_then(|b| b["text"].as_str())
        .unwrap_or("")
        .to_string();

    LlmResponse {
        content,
        model: json["model"].as_str().unwrap_or(fallback_model).to_string(),
        prompt_tokens:     json["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = anthropic_body(&req, &self.model);

        let resp = self.client
            .post(ANTHROPIC_URL)?
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let json = check_response_status(resp).await?;
        Ok(parse_anthropic_response(&json, &self.model))
    }

    fn model_id(&self) -> &str { &self.model }
    fn provider(&self) -> &str { "anthropic" }
}

// ── 2. Google Gemini ──────────────────────────────────────────────────────────

pub struct GeminiBackend {
    pub model: String,
    api_key: SecretString,
    client: SandboxClient,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            client: SandboxClient::new(timeout)?,
        })
    }
}

/// generateContent body: the system message becomes `systemInstruction`,
/// assistant turns are sent with the `model` role.
pub(crate) fn gemini_body(req: &LlmRequest) -> serde_json::Value {
    let contents: Vec<serde_json::Value> = req.turns()
        .map(|m| {
            let role = if m.role == "assistant" { "model" } else { "user" };
            serde_json::json!({
                "role": role,
                "parts": [{ "text": m.content }]
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "contents": contents,
        "generationConfig": {
            "maxOutputTokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    });
    if let Some(sys) = req.system_text() {
        body["systemInstruction"] = serde_json::json!({
            "parts": [{ "text": sys }]
        });
    }
    body
}

pub(crate) fn parse_gemini_response(json: &serde_json::Value, model: &str) -> LlmResponse {
    LlmResponse {
        content: json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: model.to_string(),
        prompt_tokens:     json["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/{}:generateContent", GEMINI_URL, self.model);
        let body = gemini_body(&req);

        let resp = self.client
            .post(&url)?
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;
        Ok(parse_gemini_response(&json, &self.model))
    }

    fn model_id(&self) -> &str { &self.model }
    fn provider(&self) -> &str { "gemini" }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_backend_identity() {
        let b = AnthropicBackend::new("sk-ant-test", "claude-3-5-sonnet-20241022", Duration::from_secs(5)).unwrap();
        assert_eq!(b.model_id(), "claude-3-5-sonnet-20241022");
        assert_eq!(b.provider(), "anthropic");
    }

    #[test]
    fn test_gemini_backend_identity() {
        let b = GeminiBackend::new("AIza-test", "gemini-2.0-flash", Duration::from_secs(5)).unwrap();
        assert_eq!(b.model_id(), "gemini-2.0-flash");
        assert_eq!(b.provider(), "gemini");
    }

    #[test]
    fn test_parse_anthropic_response() {
        let json = serde_json::json!({
            "model": "claude-x",
            "content": [{"type": "text", "text": "Proceed with in vitro validation."}],
            "usage": {"input_tokens": 120, "output_tokens": 9}
        });
        let r = parse_anthropic_response(&json, "fallback");
        assert_eq!(r.content, "Proceed with in vitro validation.");
        assert_eq!(r.model, "claude-x");
        assert_eq!(r.prompt_tokens, 120);
        assert_eq!(r.completion_tokens, 9);
    }

    #[test]
    fn test_parse_gemini_response_tolerates_missing_fields() {
        let r = parse_gemini_response(&serde_json::json!({}), "gemini-2.0-flash");
        assert_eq!(r.content, "");
        assert_eq!(r.prompt_tokens, 0);

        let json = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        });
        assert_eq!(parse_gemini_response(&json, "g").content, "ok");
    }

    #[test]
    fn test_system_message_travels_separately() {
        let req = LlmRequest::prompt("Assess LRP5.", 256).with_system("You are a synthetic biology expert.");

        let body = anthropic_body(&req, "claude-x");
        assert_eq!(body["system"], "You are a synthetic biology expert.");
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 256);

        let body = gemini_body(&req);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a synthetic biology expert.");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Assess LRP5.");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn test_plain_prompt_has_no_system_field() {
        let req = LlmRequest::prompt("Assess LRP5.", 256);
        assert!(anthropic_body(&req, "claude-x").get("system").is_none());
        assert!(gemini_body(&req).get("systemInstruction").is_none());
    }
}
