//! Process host port
//!
//! Installing dependencies, launching entry points, probing liveness and
//! delivering kill signals. Every operation takes the durable
//! [`ProcessRecord`] rather than a bare pid, so implementations can guard
//! against pid reuse by verifying the recorded start time.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::{deployment::ProcessRecord, error::HosterError};

/// OS-level process operations for one deployment directory
#[async_trait]
pub trait ProcessHost: Send + Sync {
    /// Install the deployment's declared dependencies from its manifest.
    /// A missing manifest is skipped; a nonzero installer exit aborts.
    async fn install(&self, dir: &Path) -> Result<(), HosterError>;

    /// Spawn the entry point with the deployment directory as its working
    /// directory, stdout/stderr redirected into `log_file` which stays open
    /// for the process's lifetime. Returns the record to persist.
    async fn launch(&self, dir: &Path, log_file: &Path) -> Result<ProcessRecord, HosterError>;

    /// Deliver an immediate, unconditional kill. A pid that is already dead
    /// or that was recycled by an unrelated process is treated as success;
    /// no signal is sent at a recycled pid.
    async fn terminate(&self, record: &ProcessRecord) -> Result<(), HosterError>;

    /// Zero-effect liveness probe: the recorded pid exists and its start
    /// time still matches the record.
    fn probe(&self, record: &ProcessRecord) -> bool;
}
