//! Shallow git clones into temporary directories

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{SourceFetcher, WorkingCopy};
use crate::{Error, Result};

/// Clones repositories with `git clone --depth 1`
#[derive(Debug, Clone)]
pub struct GitFetcher {
    git_binary: String,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitFetcher {
    pub fn new(git_binary: impl Into<String>) -> Self {
        Self {
            git_binary: git_binary.into(),
        }
    }

    pub async fn is_available(&self) -> bool {
        Command::new(&self.git_binary)
            .arg("--version")
            .output()
            .await
            .is_ok_and(|output| output.status.success())
    }
}

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(&self, locator: &str) -> Result<WorkingCopy> {
        let dir = tempfile::Builder::new().prefix("repolens-").tempdir()?;
        debug!("Cloning {} into {}", locator, dir.path().display());

        // `dir` is dropped, and with it the partial clone, on every error path
        let output = Command::new(&self.git_binary)
            .args(["clone", "--depth", "1", "--"])
            .arg(locator)
            .arg(dir.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to clone repository: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Fetch(format!("Failed to clone repository: {stderr}")));
        }

        info!("Cloned {}", locator);
        Ok(WorkingCopy::temporary(dir))
    }

    fn name(&self) -> &'static str {
        "git"
    }
}
