//! Deployment registry port
//!
//! Maps a deployment name to the process record written at spawn time. At
//! most one record is tracked per name.

use async_trait::async_trait;

use crate::domain::{
    deployment::{DeploymentName, ProcessRecord},
    error::HosterError
};

/// Store for per-deployment process records
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Fetch the record for a name, if one is tracked
    async fn get(&self, name: &DeploymentName) -> Result<Option<ProcessRecord>, HosterError>;

    /// Write the record for a name, replacing any previous one
    async fn put(&self, name: &DeploymentName, record: &ProcessRecord) -> Result<(), HosterError>;

    /// Drop the record for a name. Removing an absent record is not an error.
    async fn remove(&self, name: &DeploymentName) -> Result<(), HosterError>;

    /// All tracked records, ordered by name
    async fn list(&self) -> Result<Vec<(DeploymentName, ProcessRecord)>, HosterError>;
}
