//! Shared application context
//!
//! Bundles the configuration with the port implementations every command
//! phase needs. Production wiring uses the file-backed adapters; tests
//! inject in-memory fakes through [`AppContext::with_adapters`].

use std::{sync::Arc, time::Duration};

use crate::{
    adapter::{
        access::FileAccessStore, git::Git2Client, journal::FileActionLog, process::TokioProcessHost,
        registry::FileDeploymentStore
    },
    config::Settings,
    domain::error::HosterError,
    port::{
        access::AccessStore, git::GitClient, journal::ActionLog, process::ProcessHost, registry::DeploymentStore
    }
};

/// Dependencies shared by every command execution
#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub access:   Arc<dyn AccessStore>,
    pub registry: Arc<dyn DeploymentStore>,
    pub journal:  Arc<dyn ActionLog>,
    pub git:      Arc<dyn GitClient>,
    pub host:     Arc<dyn ProcessHost>
}

impl AppContext {
    /// Production wiring: file-backed stores under the configured data
    /// directory, git2 clones, tokio process control.
    pub fn init(settings: Settings) -> Result<Self, HosterError> {
        let access = Arc::new(FileAccessStore::new(settings.owner_id, settings.approved_file()));
        let registry = Arc::new(FileDeploymentStore::new(settings.bots_dir()));
        let journal = Arc::new(FileActionLog::new(settings.actions_log_file()));
        let git = Arc::new(Git2Client::new(Duration::from_secs(settings.clone_timeout_secs)));
        let host = Arc::new(TokioProcessHost::from_settings(&settings)?);

        Ok(Self { settings, access, registry, journal, git, host })
    }

    /// Explicit wiring for tests and alternative transports
    pub fn with_adapters(
        settings: Settings,
        access: Arc<dyn AccessStore>,
        registry: Arc<dyn DeploymentStore>,
        journal: Arc<dyn ActionLog>,
        git: Arc<dyn GitClient>,
        host: Arc<dyn ProcessHost>
    ) -> Self {
        Self { settings, access, registry, journal, git, host }
    }
}
