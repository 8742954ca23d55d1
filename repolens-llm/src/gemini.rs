//! Google AI Studio (Gemini) `generateContent` client
//!
//! One request per prompt, no retries. The answer is the text of the first
//! part of the first candidate.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{CompletionService, LlmConfig, LlmError, LlmResult};

/// Request structure for Gemini API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Response structure from Gemini API
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

/// Gemini API client
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    generation_config: Option<GenerationConfig>,
    client: Client,
}

impl GeminiClient {
    /// Build a client from configuration; fails without an API key
    pub fn new(config: &LlmConfig) -> LlmResult<Self> {
        let api_key = config.resolved_api_key()?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {e}")))?;

        let generation_config = (config.temperature.is_some() || config.max_output_tokens.is_some())
            .then(|| GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            });

        Ok(Self {
            endpoint: config.endpoint(),
            api_key,
            generation_config,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate text for a single-turn prompt
    pub async fn generate(&self, prompt: &str) -> LlmResult<String> {
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation_config.clone(),
        };

        debug!("Sending {} character prompt to {}", prompt.chars().count(), self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("Gemini API request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to read Gemini response: {e}")))?;

        if !status.is_success() {
            warn!("Gemini API returned {}", status);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_answer(&body)
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.generate(prompt).await
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
fn extract_answer(body: &str) -> LlmResult<String> {
    let gemini_response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::MalformedResponse(format!("Failed to parse Gemini response: {e}")))?;

    gemini_response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| LlmError::MalformedResponse("No response text from Gemini API".to_string()))
}
