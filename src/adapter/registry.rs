//! Deployment store implementations
//!
//! The file-backed store keeps one `process.json` per deployment directory,
//! written only after a successful spawn. Listing scans the deployments
//! root, so a directory left behind by a crashed deploy (no record file)
//! simply does not show up.

use std::{collections::HashMap, io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{Level, event};

use crate::{
    domain::{
        deployment::{DeploymentName, ProcessRecord},
        error::HosterError
    },
    port::registry::DeploymentStore
};

const RECORD_FILE: &str = "process.json";

/// Per-deployment process records under the deployments root
pub struct FileDeploymentStore {
    bots_dir: PathBuf
}

impl FileDeploymentStore {
    pub fn new(bots_dir: PathBuf) -> Self {
        Self { bots_dir }
    }

    fn record_path(&self, name: &DeploymentName) -> PathBuf {
        self.bots_dir.join(name.as_str()).join(RECORD_FILE)
    }
}

#[async_trait]
impl DeploymentStore for FileDeploymentStore {
    async fn get(&self, name: &DeploymentName) -> Result<Option<ProcessRecord>, HosterError> {
        let content = match fs::read_to_string(self.record_path(name)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HosterError::Storage(format!("Failed to read process record: {e}")))
        };

        let record = serde_json::from_str(&content)
            .map_err(|e| HosterError::Storage(format!("Corrupt process record for {name}: {e}")))?;
        Ok(Some(record))
    }

    async fn put(&self, name: &DeploymentName, record: &ProcessRecord) -> Result<(), HosterError> {
        let dir = self.bots_dir.join(name.as_str());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to create deployment directory: {e}")))?;

        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(name), content)
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to write process record: {e}")))?;

        Ok(())
    }

    async fn remove(&self, name: &DeploymentName) -> Result<(), HosterError> {
        match fs::remove_file(self.record_path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HosterError::Storage(format!("Failed to remove process record: {e}")))
        }
    }

    async fn list(&self) -> Result<Vec<(DeploymentName, ProcessRecord)>, HosterError> {
        let mut dir = match fs::read_dir(&self.bots_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HosterError::Storage(format!("Failed to scan deployments root: {e}")))
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to scan deployments root: {e}")))?
        {
            let Some(raw) = entry.file_name().to_str().map(str::to_string) else { continue };
            let Ok(name) = DeploymentName::parse(&raw) else {
                event!(Level::WARN, directory = %raw, "skipping non-deployment directory");
                continue;
            };
            if let Some(record) = self.get(&name).await? {
                entries.push((name, record));
            }
        }

        entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        Ok(entries)
    }
}

/// In-memory deployment store for tests
pub struct InMemoryDeploymentStore {
    records: Arc<RwLock<HashMap<DeploymentName, ProcessRecord>>>
}

impl InMemoryDeploymentStore {
    pub fn new() -> Self {
        Self { records: Arc::new(RwLock::new(HashMap::new())) }
    }
}

impl Default for InMemoryDeploymentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeploymentStore for InMemoryDeploymentStore {
    async fn get(&self, name: &DeploymentName) -> Result<Option<ProcessRecord>, HosterError> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn put(&self, name: &DeploymentName, record: &ProcessRecord) -> Result<(), HosterError> {
        self.records.write().await.insert(name.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, name: &DeploymentName) -> Result<(), HosterError> {
        self.records.write().await.remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(DeploymentName, ProcessRecord)>, HosterError> {
        let mut entries: Vec<_> =
            self.records.read().await.iter().map(|(name, record)| (name.clone(), record.clone())).collect();
        entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(pid: u32) -> ProcessRecord {
        ProcessRecord { pid, started_at: 1_700_000_000, deployed_at: Utc::now() }
    }

    #[tokio::test]
    async fn put_get_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeploymentStore::new(dir.path().join("bots"));
        let name = DeploymentName::parse("sample-bot").unwrap();

        assert_eq!(store.get(&name).await.unwrap(), None);

        store.put(&name, &record(4242)).await.unwrap();
        assert_eq!(store.get(&name).await.unwrap().unwrap().pid, 4242);

        store.remove(&name).await.unwrap();
        assert_eq!(store.get(&name).await.unwrap(), None);

        // Removing twice stays a no-op
        store.remove(&name).await.unwrap();
    }

    #[tokio::test]
    async fn put_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeploymentStore::new(dir.path().join("bots"));
        let name = DeploymentName::parse("sample-bot").unwrap();

        store.put(&name, &record(1)).await.unwrap();
        store.put(&name, &record(2)).await.unwrap();

        assert_eq!(store.get(&name).await.unwrap().unwrap().pid, 2);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_skips_directories_without_a_record() {
        let dir = tempfile::tempdir().unwrap();
        let bots = dir.path().join("bots");
        let store = FileDeploymentStore::new(bots.clone());

        store.put(&DeploymentName::parse("tracked").unwrap(), &record(7)).await.unwrap();
        std::fs::create_dir_all(bots.join("half-deployed")).unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0.as_str(), "tracked");
    }

    #[tokio::test]
    async fn list_on_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeploymentStore::new(dir.path().join("bots"));

        assert!(store.list().await.unwrap().is_empty());
    }
}
