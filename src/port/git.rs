//! Git repository management port traits
//!
//! This module defines the minimal git operations needed by the deploy flow.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::error::HosterError;

/// Git client trait for repository operations
#[async_trait]
pub trait GitClient: Send + Sync + 'static {
    /// Clone a repository into the destination directory, returns the commit
    /// ID of the cloned HEAD. The destination must not exist yet; the deploy
    /// flow tears down any previous directory first.
    async fn clone_repository(&self, url: &str, destination: &Path) -> Result<String, HosterError>;
}
