//! RepoLens LLM - Completion Service Integration
//!
//! Turns repository profiles into prompts and sends them to a text
//! completion service. The service is reached through the
//! [`CompletionService`] trait; [`GeminiClient`] is the HTTP implementation.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;
pub use prompt::{analysis_prompt, question_prompt, render_languages};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for LLM operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Error types for LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The request never produced a response
    #[error("Completion request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response arrived but has no usable answer text
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// True when no response body could be obtained from the service,
    /// as opposed to a response that could not be parsed
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// A single-turn text completion service
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `prompt` and return the answer text
    async fn complete(&self, prompt: &str) -> LlmResult<String>;
}

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Completion service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    /// Falls back to the `GEMINI_API_KEY` environment variable
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: Some(120),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl LlmConfig {
    /// `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    pub fn resolved_api_key(&self) -> LlmResult<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()))
            .ok_or_else(|| {
                LlmError::Config(format!(
                    "no API key configured; set llm.api_key or {API_KEY_ENV}"
                ))
            })
    }
}
