//! Tree walking with exclusion rules
//!
//! Within each directory, files are visited before subdirectories and both
//! are sorted by name, so one filesystem snapshot always yields the same
//! sequence.

use std::cmp::Ordering;
use std::path::{Component, Path};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::models::{FileContent, FileEntry};
use crate::{Error, Result, WalkConfig};

/// Yields the eligible files of a local directory tree
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    config: WalkConfig,
}

impl TreeWalker {
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// Collect every eligible file under `root`
    pub fn walk(&self, root: &Path) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();
        self.for_each_eligible(root, |entry| files.push(entry))?;
        Ok(files)
    }

    /// Visit eligible files one at a time, in traversal order.
    ///
    /// Ignored directories are pruned before descent. Files with an ignored
    /// suffix or above the size ceiling are skipped without being read.
    pub fn for_each_eligible<F>(&self, root: &Path, mut visit: F) -> Result<()>
    where
        F: FnMut(FileEntry),
    {
        if !root.is_dir() {
            return Err(Error::Analysis(format!(
                "Repository root is not a directory: {}",
                root.display()
            )));
        }

        let walker = WalkDir::new(root)
            .sort_by(files_before_dirs)
            .into_iter()
            .filter_entry(|entry| !self.is_pruned_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if self.has_ignored_extension(&file_name) {
                debug!("Skipping {} (ignored extension)", entry.path().display());
                continue;
            }

            // Follows symlinks, so a link is judged by its target
            let metadata = match std::fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            if metadata.len() > self.config.max_file_size {
                debug!(
                    "Skipping {} ({} bytes exceeds {})",
                    entry.path().display(),
                    metadata.len(),
                    self.config.max_file_size
                );
                continue;
            }

            let Some(relative_path) = relative_slash_path(root, entry.path()) else {
                warn!("Skipping {}: not below {}", entry.path().display(), root.display());
                continue;
            };
            let content = read_content(entry.path());
            visit(FileEntry::new(relative_path, metadata.len(), content));
        }

        Ok(())
    }

    fn is_pruned_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.config.ignored_dirs.iter().any(|d| d == name))
    }

    fn has_ignored_extension(&self, file_name: &str) -> bool {
        self.config
            .ignored_extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }
}

fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// `path` relative to `root`, joined with `/` on every platform
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect();
    (!segments.is_empty()).then(|| segments.join("/"))
}

fn read_content(path: &Path) -> FileContent {
    match std::fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(normalize_newlines(text)),
            Err(_) => {
                debug!("{} is not UTF-8 text; keeping path only", path.display());
                FileContent::NotText
            }
        },
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            FileContent::Unreadable(e.to_string())
        }
    }
}

/// Rewrite `\r\n` and lone `\r` line endings as `\n`
fn normalize_newlines(text: String) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text
    }
}
