//! Git2 implementation of the git port

use std::{path::Path, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use git2::Repository;
use tokio::{task, time};

use crate::{domain::error::HosterError, port::git::GitClient};

/// Git2 implementation of GitClient
///
/// git2 is blocking, so the clone runs on the blocking pool with a bounded
/// timeout. On expiry the clone task is abandoned; the deploy flow already
/// tears the directory down before the next attempt.
pub struct Git2Client {
    timeout: Duration
}

impl Git2Client {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl GitClient for Git2Client {
    async fn clone_repository(&self, url: &str, destination: &Path) -> Result<String, HosterError> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create deployments root {}", parent.display()))
                .map_err(|e| HosterError::Storage(e.to_string()))?;
        }

        let clone_url = url.to_string();
        let dest = destination.to_path_buf();
        let clone_task = task::spawn_blocking(move || -> Result<String, HosterError> {
            let repo = Repository::clone(&clone_url, &dest)
                .map_err(|e| HosterError::DeployFailed(format!("Failed to clone {clone_url}: {e}")))?;

            let head = repo.head().map_err(|e| HosterError::DeployFailed(format!("Cloned repo has no HEAD: {e}")))?;
            let commit = head
                .peel_to_commit()
                .map_err(|e| HosterError::DeployFailed(format!("Cloned repo has no HEAD commit: {e}")))?;

            Ok(commit.id().to_string())
        });

        match time::timeout(self.timeout, clone_task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(HosterError::Generic(format!("Clone task panicked: {e}"))),
            Err(_) => Err(HosterError::Timeout(format!(
                "Clone of {url} did not finish within {}s",
                self.timeout.as_secs()
            )))
        }
    }
}
