//! Source fetching
//!
//! A [`SourceFetcher`] turns a repository locator into a [`WorkingCopy`] on
//! local disk. Temporary working copies are deleted when dropped, so every
//! exit path of an analysis cleans up after itself.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::{Error, Result};

pub mod git;

pub use git::GitFetcher;

/// Produces local working copies of repositories
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Obtain a working copy for `locator`
    async fn fetch(&self, locator: &str) -> Result<WorkingCopy>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

#[derive(Debug)]
enum Storage {
    Temporary(TempDir),
    Borrowed(PathBuf),
}

/// A local directory holding a repository's files
#[derive(Debug)]
pub struct WorkingCopy {
    storage: Storage,
}

impl WorkingCopy {
    /// Take ownership of a temporary directory; it is removed on drop
    pub fn temporary(dir: TempDir) -> Self {
        Self {
            storage: Storage::Temporary(dir),
        }
    }

    /// Refer to an existing directory that must be left untouched
    pub fn borrowed(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::Borrowed(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        match &self.storage {
            Storage::Temporary(dir) => dir.path(),
            Storage::Borrowed(path) => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.storage, Storage::Temporary(_))
    }

    /// Remove a temporary copy now, reporting failures instead of ignoring
    /// them as drop would
    pub fn close(self) -> Result<()> {
        match self.storage {
            Storage::Temporary(dir) => dir.close().map_err(Error::from),
            Storage::Borrowed(_) => Ok(()),
        }
    }
}

/// Treats the locator as a path to an existing local directory
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

#[async_trait]
impl SourceFetcher for LocalFetcher {
    async fn fetch(&self, locator: &str) -> Result<WorkingCopy> {
        let path = PathBuf::from(locator);
        if !path.is_dir() {
            return Err(Error::Fetch(format!(
                "Local repository path is not a directory: {locator}"
            )));
        }
        Ok(WorkingCopy::borrowed(path))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
