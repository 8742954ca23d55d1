//! Data models for repository profiles

pub mod languages;
pub mod profile;
pub mod structure;

pub use languages::{file_extension, language_for_extension, LanguageStats};
pub use profile::{CacheEntry, FileContent, FileEntry, RepoInfo, RepositoryProfile};
pub use structure::{DirectoryNode, TreeNode};
