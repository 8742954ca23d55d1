//! Repository analysis pass
//!
//! Walks a working copy once, classifying each eligible file and inserting
//! it into the directory structure as it is yielded, then summarizes the
//! result into a [`RepositoryProfile`].

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::models::{DirectoryNode, LanguageStats, RepositoryProfile};
use crate::{Result, WalkConfig};

pub mod summarizer;
pub mod walker;

pub use walker::TreeWalker;

/// Builds repository profiles from local directories
#[derive(Debug, Clone, Default)]
pub struct RepositoryAnalyzer {
    walker: TreeWalker,
}

impl RepositoryAnalyzer {
    pub fn new(config: WalkConfig) -> Self {
        Self {
            walker: TreeWalker::new(config),
        }
    }

    /// Profile the working copy at `root`, recording `locator` as its origin
    pub fn analyze(&self, locator: &str, root: &Path) -> Result<RepositoryProfile> {
        let start_time = Instant::now();
        debug!("Analyzing {} from {}", locator, root.display());

        let mut files = Vec::new();
        let mut languages = LanguageStats::new();
        let mut structure = DirectoryNode::new();

        self.walker.for_each_eligible(root, |entry| {
            languages.record_path(&entry.path);
            structure.insert_path(&entry.path);
            files.push(entry);
        })?;

        let (repo_info, key_files) = summarizer::summarize(&files, &languages);

        info!(
            "Analyzed {}: {} files, {} languages, {} key files in {:.2}s",
            locator,
            repo_info.total_files,
            languages.len(),
            key_files.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(RepositoryProfile::new(
            locator, files, structure, languages, key_files, repo_info,
        ))
    }
}
