//! Repository profile and the cached record derived from it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DirectoryNode, LanguageStats};

/// What reading an eligible file produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Decoded as UTF-8 text
    Text(String),
    /// Bytes were read but are not valid UTF-8
    NotText,
    /// The file could not be read at all
    Unreadable(String),
}

impl FileContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::NotText | Self::Unreadable(_) => None,
        }
    }
}

/// An eligible file, relative to the repository root with `/` separators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
    pub content: FileContent,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, size: u64, content: FileContent) -> Self {
        Self {
            path: path.into(),
            size,
            content,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }
}

/// Compact description of a repository that feeds prompt composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub total_files: usize,
    pub languages: LanguageStats,
    pub has_readme: bool,
    pub readme_sample: String,
    pub key_files: Vec<String>,
}

/// Everything learned about one repository during a single analysis pass.
///
/// Only `summary` may change after construction, and only once.
#[derive(Debug, Clone)]
pub struct RepositoryProfile {
    locator: String,
    files: Vec<FileEntry>,
    structure: DirectoryNode,
    languages: LanguageStats,
    key_files: Vec<usize>,
    repo_info: RepoInfo,
    summary: Option<String>,
}

impl RepositoryProfile {
    /// `key_files` are indices into `files`, in encounter order
    pub fn new(
        locator: impl Into<String>,
        files: Vec<FileEntry>,
        structure: DirectoryNode,
        languages: LanguageStats,
        key_files: Vec<usize>,
        repo_info: RepoInfo,
    ) -> Self {
        debug_assert!(key_files.iter().all(|&idx| idx < files.len()));
        Self {
            locator: locator.into(),
            files,
            structure,
            languages,
            key_files,
            repo_info,
            summary: None,
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn structure(&self) -> &DirectoryNode {
        &self.structure
    }

    pub fn languages(&self) -> &LanguageStats {
        &self.languages
    }

    pub fn repo_info(&self) -> &RepoInfo {
        &self.repo_info
    }

    pub fn readme_excerpt(&self) -> &str {
        &self.repo_info.readme_sample
    }

    /// Key files in the order the walk met them
    pub fn key_files(&self) -> impl Iterator<Item = &FileEntry> {
        self.key_files.iter().map(|&idx| &self.files[idx])
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Record the generated summary. A second call is rejected.
    pub fn set_summary(&mut self, summary: impl Into<String>) -> crate::Result<()> {
        if self.summary.is_some() {
            return Err(crate::Error::Analysis(format!(
                "summary for {} is already set",
                self.locator
            )));
        }
        self.summary = Some(summary.into());
        Ok(())
    }

    /// Drop raw file contents and keep only what is worth caching
    pub fn into_cache_entry(self) -> CacheEntry {
        CacheEntry {
            repo_info: self.repo_info,
            structure: self.structure,
            summary: self.summary.unwrap_or_default(),
            languages: self.languages,
            files: self.files.into_iter().map(|file| file.path).collect(),
            analyzed_at: Utc::now(),
        }
    }
}

/// The per-locator record held by the result cache
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub repo_info: RepoInfo,
    pub structure: DirectoryNode,
    pub summary: String,
    pub languages: LanguageStats,
    pub files: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}
