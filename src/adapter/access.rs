//! Access store implementations
//!
//! The file-backed store persists the allowlist as one principal id per
//! line, append-only. The in-memory store mirrors the same semantics for
//! tests, duplicates included.

use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};

use crate::{
    domain::{error::HosterError, principal::PrincipalId},
    port::access::AccessStore
};

/// Allowlist persisted as an append-only text file
pub struct FileAccessStore {
    owner_id: PrincipalId,
    path:     PathBuf
}

impl FileAccessStore {
    pub fn new(owner_id: PrincipalId, path: PathBuf) -> Self {
        Self { owner_id, path }
    }
}

#[async_trait]
impl AccessStore for FileAccessStore {
    fn is_owner(&self, principal: PrincipalId) -> bool {
        principal == self.owner_id
    }

    async fn is_approved(&self, principal: PrincipalId) -> Result<bool, HosterError> {
        if self.is_owner(principal) {
            return Ok(true);
        }

        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(HosterError::Storage(format!("Failed to read allowlist: {e}")))
        };

        let needle = principal.to_string();
        Ok(content.lines().any(|line| line.trim() == needle))
    }

    async fn approve(&self, principal: PrincipalId) -> Result<(), HosterError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| HosterError::Storage(format!("Failed to create allowlist directory: {e}")))?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to open allowlist: {e}")))?;

        file.write_all(format!("{principal}\n").as_bytes())
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to append to allowlist: {e}")))?;

        Ok(())
    }
}

/// In-memory allowlist for tests and dry runs
///
/// Keeps every append, so duplicate approvals are observable exactly like
/// duplicate lines in the file store.
pub struct InMemoryAccessStore {
    owner_id: PrincipalId,
    ids:      Arc<RwLock<Vec<PrincipalId>>>
}

impl InMemoryAccessStore {
    pub fn new(owner_id: PrincipalId) -> Self {
        Self { owner_id, ids: Arc::new(RwLock::new(Vec::new())) }
    }

    /// Raw appended entries, duplicates included
    pub async fn entries(&self) -> Vec<PrincipalId> {
        self.ids.read().await.clone()
    }
}

#[async_trait]
impl AccessStore for InMemoryAccessStore {
    fn is_owner(&self, principal: PrincipalId) -> bool {
        principal == self.owner_id
    }

    async fn is_approved(&self, principal: PrincipalId) -> Result<bool, HosterError> {
        if self.is_owner(principal) {
            return Ok(true);
        }
        Ok(self.ids.read().await.contains(&principal))
    }

    async fn approve(&self, principal: PrincipalId) -> Result<(), HosterError> {
        self.ids.write().await.push(principal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn owner_is_always_approved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAccessStore::new(100, dir.path().join("approved.txt"));

        assert!(store.is_owner(100));
        assert!(store.is_approved(100).await.unwrap());
    }

    #[tokio::test]
    async fn missing_allowlist_means_not_approved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAccessStore::new(100, dir.path().join("approved.txt"));

        assert!(!store.is_approved(555).await.unwrap());
    }

    #[tokio::test]
    async fn approve_then_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAccessStore::new(100, dir.path().join("approved.txt"));

        assert!(!store.is_approved(555).await.unwrap());
        store.approve(555).await.unwrap();
        assert!(store.is_approved(555).await.unwrap());
        assert!(!store.is_approved(556).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_approvals_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("approved.txt");
        let store = FileAccessStore::new(100, path.clone());

        store.approve(555).await.unwrap();
        store.approve(555).await.unwrap();

        assert!(store.is_approved(555).await.unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().filter(|l| *l == "555").count(), 2);
    }

    #[tokio::test]
    async fn in_memory_store_mirrors_file_semantics() {
        let store = InMemoryAccessStore::new(100);

        assert!(store.is_approved(100).await.unwrap());
        assert!(!store.is_approved(555).await.unwrap());

        store.approve(555).await.unwrap();
        store.approve(555).await.unwrap();

        assert!(store.is_approved(555).await.unwrap());
        assert_eq!(store.entries().await.len(), 2);
    }
}
