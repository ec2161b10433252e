//! Action log implementations
//!
//! The file-backed log appends one human-readable line per lifecycle event.
//! The in-memory log keeps the typed events for assertions in tests.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};

use crate::{
    domain::{error::HosterError, event::HosterEvent},
    port::journal::ActionLog
};

/// Append-only audit log file, one timestamped line per event
pub struct FileActionLog {
    path: PathBuf
}

impl FileActionLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn render_line(event: &HosterEvent) -> String {
        format!(
            "[{}] [{}] {} -> {}\n",
            event.timestamp().format("%Y-%m-%d %H:%M:%S"),
            event.verb(),
            event.actor(),
            event.subject()
        )
    }
}

#[async_trait]
impl ActionLog for FileActionLog {
    async fn record(&self, event: &HosterEvent) -> Result<(), HosterError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| HosterError::Storage(format!("Failed to create log directory: {e}")))?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to open action log: {e}")))?;

        file.write_all(Self::render_line(event).as_bytes())
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to append to action log: {e}")))?;

        Ok(())
    }
}

/// In-memory audit log for tests
pub struct InMemoryActionLog {
    events: Arc<RwLock<Vec<HosterEvent>>>
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self { events: Arc::new(RwLock::new(Vec::new())) }
    }

    pub async fn entries(&self) -> Vec<HosterEvent> {
        self.events.read().await.clone()
    }
}

impl Default for InMemoryActionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionLog for InMemoryActionLog {
    async fn record(&self, event: &HosterEvent) -> Result<(), HosterError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deployment::DeploymentName;

    #[tokio::test]
    async fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("actions.log");
        let log = FileActionLog::new(path.clone());

        log.record(&HosterEvent::approved(100, 555)).await.unwrap();
        log.record(&HosterEvent::deployed(555, DeploymentName::parse("sample-bot").unwrap(), "url"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[APPROVE] 100 -> 555"));
        assert!(lines[1].contains("[DEPLOY] 555 -> sample-bot"));
    }

    #[tokio::test]
    async fn in_memory_log_collects_events() {
        let log = InMemoryActionLog::new();
        log.record(&HosterEvent::status_viewed(555)).await.unwrap();

        let entries = log.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].verb(), "STATUS");
    }
}
