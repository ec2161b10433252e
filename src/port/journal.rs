//! Action log abstraction - append-only audit trail
//!
//! Entries are immutable and never rotated. A failed append is reported by
//! the caller on the error channel but must never fail or roll back the
//! lifecycle operation that produced the event.

use async_trait::async_trait;

use crate::domain::{error::HosterError, event::HosterEvent};

/// Append-only audit log
#[async_trait]
pub trait ActionLog: Send + Sync {
    /// Append one timestamped entry for a completed lifecycle action
    async fn record(&self, event: &HosterEvent) -> Result<(), HosterError>;
}
