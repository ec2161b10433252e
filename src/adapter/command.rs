//! Command implementations - the lifecycle operations behind each verb

use std::any::Any;

use async_trait::async_trait;
use tokio::fs;

use crate::{
    AppContext,
    domain::{
        command::{
            ApprovePrincipalCommand, BotStatusCommand, DeployBotCommand, HosterCommand, RequestAccessCommand,
            StopBotCommand
        },
        deployment::{DeploymentName, ProcessRecord},
        error::HosterError,
        event::HosterEvent,
        principal::PrincipalId,
        reply::{CommandReply, StatusPanel}
    },
    port::{
        access::AccessStore, command::Command, git::GitClient, process::ProcessHost, registry::DeploymentStore
    }
};

/// Name of the credential file materialized inside each deployment
const ENV_FILE: &str = ".env";

/// Name of the per-deployment child output log
const CHILD_LOG_FILE: &str = "logs.txt";

/// Macro to implement Command for the HosterCommand enum by delegating each
/// phase to the variant's own implementation.
macro_rules! impl_command {
    ($enum_name:ident { $($variant:ident($field:ident)),* $(,)? }) => {
        #[async_trait]
        impl Command for $enum_name {
            type Error = HosterError;
            type LoadedData = Box<dyn Any + Send + Sync>; // Generic type since each command has different data

            async fn load(
                &self,
                sender: PrincipalId,
                app: &AppContext
            ) -> Result<Self::LoadedData, Self::Error> {
                match self {
                    $(
                        $enum_name::$variant($field) => {
                            let data = $field.load(sender, app).await?;
                            Ok(Box::new(data) as Box<dyn Any + Send + Sync>)
                        }
                    )*
                }
            }

            fn validate(&self, sender: PrincipalId, loaded: &Self::LoadedData) -> Result<(), Self::Error> {
                match self {
                    $(
                        $enum_name::$variant($field) => {
                            let data = loaded.downcast_ref().ok_or_else(||
                                HosterError::Generic("Failed to downcast loaded command data".to_string()))?;
                            $field.validate(sender, data)
                        }
                    )*
                }
            }

            async fn effect(
                &self,
                sender: PrincipalId,
                loaded: &Self::LoadedData,
                app: &AppContext
            ) -> Result<CommandReply, Self::Error> {
                match self {
                    $(
                        $enum_name::$variant($field) => {
                            let data = loaded.downcast_ref().ok_or_else(||
                                HosterError::Generic("Failed to downcast loaded command data".to_string()))?;
                            $field.effect(sender, data, app).await
                        }
                    )*
                }
            }

            fn emit(
                &self,
                sender: PrincipalId,
                loaded: &Self::LoadedData,
                reply: &CommandReply
            ) -> Vec<HosterEvent> {
                match self {
                    $(
                        $enum_name::$variant($field) => {
                            match loaded.downcast_ref() {
                                Some(data) => $field.emit(sender, data, reply),
                                None => Vec::new()
                            }
                        }
                    )*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $(
                        $enum_name::$variant($field) => $field.name(),
                    )*
                }
            }

            fn is_mutating(&self) -> bool {
                match self {
                    $(
                        $enum_name::$variant($field) => $field.is_mutating(),
                    )*
                }
            }
        }
    };
}

impl_command!(HosterCommand {
    RequestAccess(cmd),
    Approve(cmd),
    Deploy(cmd),
    Stop(cmd),
    Status(cmd)
});

// **********************
// Request access
// **********************

#[derive(Debug)]
pub struct RequestAccessData;

#[async_trait]
impl Command for RequestAccessCommand {
    type Error = HosterError;
    type LoadedData = RequestAccessData;

    async fn load(&self, _sender: PrincipalId, _app: &AppContext) -> Result<Self::LoadedData, Self::Error> {
        Ok(RequestAccessData)
    }

    fn validate(&self, _sender: PrincipalId, _loaded: &Self::LoadedData) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn effect(
        &self,
        sender: PrincipalId,
        _loaded: &Self::LoadedData,
        _app: &AppContext
    ) -> Result<CommandReply, Self::Error> {
        Ok(CommandReply::text("✅ Request sent to owner")
            .with_owner_note(format!("🔔 New access request\n🆔 ID: {sender}")))
    }

    fn emit(&self, _sender: PrincipalId, _loaded: &Self::LoadedData, _reply: &CommandReply) -> Vec<HosterEvent> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "request_access"
    }

    fn is_mutating(&self) -> bool {
        false
    }
}

// **********************
// Approve
// **********************

#[derive(Debug)]
pub struct ApproveData;

#[async_trait]
impl Command for ApprovePrincipalCommand {
    type Error = HosterError;
    type LoadedData = ApproveData;

    async fn load(&self, _sender: PrincipalId, _app: &AppContext) -> Result<Self::LoadedData, Self::Error> {
        Ok(ApproveData)
    }

    fn validate(&self, _sender: PrincipalId, _loaded: &Self::LoadedData) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn effect(
        &self,
        _sender: PrincipalId,
        _loaded: &Self::LoadedData,
        app: &AppContext
    ) -> Result<CommandReply, Self::Error> {
        app.access.approve(self.principal).await?;
        Ok(CommandReply::text(format!("✅ User {} approved", self.principal)))
    }

    fn emit(&self, sender: PrincipalId, _loaded: &Self::LoadedData, _reply: &CommandReply) -> Vec<HosterEvent> {
        vec![HosterEvent::approved(sender, self.principal)]
    }

    fn name(&self) -> &'static str {
        "approve_principal"
    }
}

// **********************
// Deploy
// **********************

#[derive(Debug)]
pub struct DeployData {
    pub name: DeploymentName
}

#[async_trait]
impl Command for DeployBotCommand {
    type Error = HosterError;
    type LoadedData = DeployData;

    async fn load(&self, _sender: PrincipalId, _app: &AppContext) -> Result<Self::LoadedData, Self::Error> {
        let name = DeploymentName::derive(&self.repo_url)?;
        Ok(DeployData { name })
    }

    fn validate(&self, _sender: PrincipalId, _loaded: &Self::LoadedData) -> Result<(), Self::Error> {
        if self.bot_token.trim().is_empty() {
            return Err(HosterError::BadCommand(crate::domain::command::USAGE_DEPLOY.to_string()));
        }
        Ok(())
    }

    async fn effect(
        &self,
        _sender: PrincipalId,
        loaded: &Self::LoadedData,
        app: &AppContext
    ) -> Result<CommandReply, Self::Error> {
        let dir = app.settings.bots_dir().join(loaded.name.as_str());

        // Redeploy clobbers whatever was there before; the per-name
        // processor guarantees no concurrent deploy observes this half-done.
        if fs::metadata(&dir).await.is_ok() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| HosterError::Storage(format!("Failed to clear previous deployment: {e}")))?;
        }

        let commit_id = app.git.clone_repository(&self.repo_url, &dir).await?;

        let credentials = format!(
            "API_ID={}\nAPI_HASH={}\nBOT_TOKEN={}\n",
            app.settings.api_id, app.settings.api_hash, self.bot_token
        );
        fs::write(dir.join(ENV_FILE), credentials)
            .await
            .map_err(|e| HosterError::Storage(format!("Failed to write credential file: {e}")))?;

        app.host.install(&dir).await?;

        let record = app.host.launch(&dir, &dir.join(CHILD_LOG_FILE)).await?;

        // The registry entry exists only once the process does.
        app.registry.put(&loaded.name, &record).await?;

        let short_commit = commit_id.get(..8).unwrap_or(&commit_id);
        Ok(CommandReply::text(format!(
            "✅ {} deployed & running (pid {}, {short_commit})",
            loaded.name, record.pid
        )))
    }

    fn emit(&self, sender: PrincipalId, loaded: &Self::LoadedData, _reply: &CommandReply) -> Vec<HosterEvent> {
        vec![HosterEvent::deployed(sender, loaded.name.clone(), self.repo_url.clone())]
    }

    fn name(&self) -> &'static str {
        "deploy_bot"
    }
}

// **********************
// Stop
// **********************

#[derive(Debug)]
pub struct StopData {
    pub name:   DeploymentName,
    pub record: Option<ProcessRecord>
}

impl StopBotCommand {
    fn not_running_reply(&self, name: &DeploymentName) -> HosterError {
        if self.forced {
            HosterError::NotRunning("Already stopped".to_string())
        } else {
            HosterError::NotRunning(format!("{name} is not running"))
        }
    }
}

#[async_trait]
impl Command for StopBotCommand {
    type Error = HosterError;
    type LoadedData = StopData;

    async fn load(&self, _sender: PrincipalId, app: &AppContext) -> Result<Self::LoadedData, Self::Error> {
        let name = DeploymentName::parse(&self.name)?;
        let record = app.registry.get(&name).await?;
        Ok(StopData { name, record })
    }

    fn validate(&self, _sender: PrincipalId, loaded: &Self::LoadedData) -> Result<(), Self::Error> {
        if loaded.record.is_none() {
            return Err(self.not_running_reply(&loaded.name));
        }
        Ok(())
    }

    async fn effect(
        &self,
        _sender: PrincipalId,
        loaded: &Self::LoadedData,
        app: &AppContext
    ) -> Result<CommandReply, Self::Error> {
        let Some(record) = &loaded.record else {
            return Err(self.not_running_reply(&loaded.name));
        };

        // A stale or recycled pid counts as already stopped; the record is
        // removed either way.
        app.host.terminate(record).await?;
        app.registry.remove(&loaded.name).await?;

        Ok(CommandReply::text(format!("🛑 {} stopped", loaded.name)))
    }

    fn emit(&self, sender: PrincipalId, loaded: &Self::LoadedData, _reply: &CommandReply) -> Vec<HosterEvent> {
        vec![HosterEvent::stopped(sender, loaded.name.clone(), self.forced)]
    }

    fn name(&self) -> &'static str {
        if self.forced { "force_stop_bot" } else { "stop_bot" }
    }
}

// **********************
// Status
// **********************

#[derive(Debug)]
pub struct StatusData;

#[async_trait]
impl Command for BotStatusCommand {
    type Error = HosterError;
    type LoadedData = StatusData;

    async fn load(&self, _sender: PrincipalId, _app: &AppContext) -> Result<Self::LoadedData, Self::Error> {
        Ok(StatusData)
    }

    fn validate(&self, _sender: PrincipalId, _loaded: &Self::LoadedData) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn effect(
        &self,
        _sender: PrincipalId,
        _loaded: &Self::LoadedData,
        app: &AppContext
    ) -> Result<CommandReply, Self::Error> {
        let mut running = Vec::new();

        // A record whose process no longer answers the probe is silently
        // excluded; the stale entry itself is left for the startup sweep.
        for (name, record) in app.registry.list().await? {
            if app.host.probe(&record) {
                running.push(name);
            }
        }

        Ok(CommandReply::status(StatusPanel::new(running)))
    }

    fn emit(&self, sender: PrincipalId, _loaded: &Self::LoadedData, _reply: &CommandReply) -> Vec<HosterEvent> {
        vec![HosterEvent::status_viewed(sender)]
    }

    fn name(&self) -> &'static str {
        "bot_status"
    }

    fn is_mutating(&self) -> bool {
        false
    }
}
