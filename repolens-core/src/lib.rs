//! RepoLens Core - Repository Profiling Engine
//!
//! This crate turns a local working copy of a repository into a
//! [`RepositoryProfile`]:
//! - Tree walking with directory, extension and size exclusion
//! - Extension-based language classification
//! - Nested directory structure building
//! - README excerpt and key-file selection
//! - Source fetching into scoped working copies
//! - A bounded, injectable cache of finished profiles

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,  // Often necessary for clarity
    clippy::missing_errors_doc,
)]

pub mod analysis;
pub mod cache;
pub mod constants;
pub mod fetch;
pub mod models;

pub use analysis::{RepositoryAnalyzer, TreeWalker};
pub use cache::{CacheStatistics, LruProfileCache, ProfileCache};
pub use fetch::{GitFetcher, LocalFetcher, SourceFetcher, WorkingCopy};
pub use models::{
    CacheEntry, DirectoryNode, FileContent, FileEntry, LanguageStats, RepoInfo,
    RepositoryProfile, TreeNode,
};

use serde::{Deserialize, Serialize};

/// Result type used throughout RepoLens core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for RepoLens core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Obtaining a working copy failed; the message is shown to callers verbatim
    #[error("{0}")]
    Fetch(String),

    /// Analysis error
    #[error("Analysis error: {0}")]
    Analysis(String),
}

/// Exclusion rules applied by the [`TreeWalker`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Directory names pruned before descent, at any depth below the root
    pub ignored_dirs: Vec<String>,
    /// File name suffixes that are never listed
    pub ignored_extensions: Vec<String>,
    /// Files strictly larger than this many bytes are skipped
    pub max_file_size: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: constants::IGNORED_DIRS.iter().map(|s| (*s).to_string()).collect(),
            ignored_extensions: constants::IGNORED_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_file_size: constants::MAX_FILE_SIZE,
        }
    }
}

/// Sizing for the result cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of repository profiles kept before LRU eviction
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: constants::DEFAULT_CACHE_CAPACITY,
        }
    }
}
