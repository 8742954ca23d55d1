//! RepoLens Analysis - Request-Level Service
//!
//! Implements the two requests a front end forwards to RepoLens:
//! - analyze: fetch, profile and summarize a repository, caching the result
//! - query: answer a question about a repository analyzed earlier
//!
//! Every failure is returned as a [`ServiceError`] carrying an HTTP-style
//! status code and a human-readable message.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod api;
pub mod pipeline;

pub use api::{AnalyzeRequest, AnalyzeResponse, ErrorPayload, QueryRequest, QueryResponse};
pub use pipeline::RepositoryService;

use repolens_core::{CacheConfig, WalkConfig};
use repolens_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

pub const MISSING_REPO_URL: &str = "No repository URL provided";
pub const MISSING_QUERY_FIELDS: &str = "Repository URL and question are required";
pub const COMPLETION_UNAVAILABLE: &str = "Failed to get response from AI";
pub const COMPLETION_UNPARSABLE: &str = "Failed to parse AI response";
pub const SUMMARY_UNAVAILABLE: &str = "Failed to generate summary with AI.";
pub const SUMMARY_UNPARSABLE: &str = "Failed to parse AI summary response.";

/// Errors surfaced to callers of the service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A required request field is missing or empty
    #[error("{0}")]
    MissingField(&'static str),

    /// Query for a locator that has no cached analysis
    #[error("Repository not analyzed yet. Please analyze first.")]
    NotAnalyzed,

    /// The working copy could not be obtained
    #[error("{0}")]
    Fetch(String),

    /// The completion service failed during a query
    #[error("{0}")]
    Completion(&'static str),

    /// Anything else that went wrong while serving a request
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status a front end should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingField(_) | Self::NotAnalyzed => 400,
            Self::Fetch(_) | Self::Completion(_) | Self::Internal(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// The `{"error": ...}` body for this failure
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
        }
    }
}

impl From<repolens_core::Error> for ServiceError {
    fn from(err: repolens_core::Error) -> Self {
        match err {
            repolens_core::Error::Fetch(message) => Self::Fetch(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Top-level RepoLens configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoLensConfig {
    pub walk: WalkConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
}

impl RepoLensConfig {
    /// Load from a `.toml`, `.json` or `.yaml` file, or use defaults
    pub fn load(path: Option<&Path>) -> repolens_utils::Result<Self> {
        repolens_utils::load_config_or_default(path)
    }
}
