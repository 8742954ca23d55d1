//! Request and response bodies

use repolens_core::CacheEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `{repo_url}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub repo_url: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: Some(repo_url.into()),
        }
    }
}

/// `{repo_url, question}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
}

impl QueryRequest {
    pub fn new(repo_url: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            repo_url: Some(repo_url.into()),
            question: Some(question.into()),
        }
    }
}

/// Successful analysis: `{message, data: {repo_info, structure, summary, languages, files}}`
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub message: String,
    pub data: Arc<CacheEntry>,
    #[serde(skip)]
    pub from_cache: bool,
}

pub const ANALYZED_MESSAGE: &str = "Repository analyzed successfully";
pub const CACHED_MESSAGE: &str = "Repository loaded from cache";

impl AnalyzeResponse {
    pub fn analyzed(data: Arc<CacheEntry>) -> Self {
        Self {
            message: ANALYZED_MESSAGE.to_string(),
            data,
            from_cache: false,
        }
    }

    pub fn cached(data: Arc<CacheEntry>) -> Self {
        Self {
            message: CACHED_MESSAGE.to_string(),
            data,
            from_cache: true,
        }
    }
}

/// `{answer}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
}

/// `{error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// Returns the trimmed value when present and non-empty
pub(crate) fn required(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}
