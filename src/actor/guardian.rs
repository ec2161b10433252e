//! Guardian Actor - Root Supervisor
//!
//! The Guardian is the root of the actor hierarchy and manages system-wide
//! concerns:
//! - Spawns and supervises the DeploymentManager
//! - Handles system initialization and shutdown
//! - Provides health checks and system monitoring

use std::{sync::Arc, time::SystemTime};

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SpawnErr, rpc::CallResult};
use tracing::{Level, event};

use crate::{
    AppContext,
    actor::{
        manager::DeploymentManager,
        message::{GuardianMessage, ManagerMessage, SystemHealth}
    },
    domain::{
        command::HosterCommand, constant::guardian, error::HosterError, principal::PrincipalId, reply::CommandReply
    }
};

/// Guardian Actor State - tracks child actors and system metrics
pub struct GuardianState {
    /// DeploymentManager actor reference
    manager:        Option<ActorRef<ManagerMessage>>,
    /// System startup time for uptime calculation
    startup_time:   SystemTime,
    /// System initialization flag
    is_initialized: bool,
    /// Shared application context handed to children
    app:            Arc<AppContext>
}

/// Guardian Actor - Root supervisor of the actor system
pub struct Guardian;

#[async_trait::async_trait]
impl Actor for Guardian {
    type Arguments = Arc<AppContext>;
    type Msg = GuardianMessage;
    type State = GuardianState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        app: Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = guardian::GUARDIAN_STARTED);

        Ok(GuardianState { manager: None, startup_time: SystemTime::now(), is_initialized: false, app })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        match message {
            GuardianMessage::Initialize => self.handle_initialize(myself, state).await,
            GuardianMessage::Shutdown => self.handle_shutdown(state).await,
            GuardianMessage::HealthCheck { reply } => self.handle_health_check(reply, state).await,
            GuardianMessage::SubmitCommand { sender, command, reply } => {
                self.handle_submit_command(sender, command, reply, state).await
            }
        }
    }
}

impl Guardian {
    /// Spawn the complete actor system
    pub async fn spawn_system(app: Arc<AppContext>) -> Result<ActorRef<GuardianMessage>, SpawnErr> {
        let (guardian_ref, _handle) = Actor::spawn(Some("guardian".to_string()), Guardian, app).await?;

        // Initialize the system
        if let Err(e) = guardian_ref.cast(GuardianMessage::Initialize) {
            event!(Level::ERROR, event = guardian::GUARDIAN_STARTED, error = ?e);
        }

        Ok(guardian_ref)
    }

    /// Initialize child actors
    async fn handle_initialize(
        &self,
        _myself: ActorRef<GuardianMessage>,
        state: &mut GuardianState
    ) -> Result<(), ActorProcessingErr> {
        event!(Level::DEBUG, event = guardian::CHILDREN_SPAWNING);

        match Actor::spawn(Some("deployment_manager".to_string()), DeploymentManager, state.app.clone()).await {
            Ok((manager_ref, _handle)) => {
                state.manager = Some(manager_ref);
                state.is_initialized = true;
                event!(Level::DEBUG, event = guardian::CHILDREN_SPAWNED, actor = "deployment_manager");
            }
            Err(e) => {
                event!(Level::ERROR, event = guardian::CHILDREN_SPAWN_FAILED, actor = "deployment_manager", error = %e);
                return Err(ActorProcessingErr::from(format!("Failed to spawn deployment manager: {e}")));
            }
        }

        event!(Level::INFO, event = guardian::SYSTEM_INITIALIZED);
        Ok(())
    }

    /// Shutdown child actors gracefully
    async fn handle_shutdown(&self, state: &mut GuardianState) -> Result<(), ActorProcessingErr> {
        event!(Level::DEBUG, event = guardian::SYSTEM_SHUTDOWN_STARTED);

        if let Some(manager) = &state.manager {
            manager.stop(None);
            event!(Level::DEBUG, event = guardian::SYSTEM_SHUTDOWN_STARTED, actor = "deployment_manager_stopped");
        }

        state.is_initialized = false;
        event!(Level::INFO, event = guardian::SYSTEM_SHUTDOWN_COMPLETED);
        Ok(())
    }

    /// Handle health check requests
    async fn handle_health_check(
        &self,
        reply: RpcReplyPort<SystemHealth>,
        state: &GuardianState
    ) -> Result<(), ActorProcessingErr> {
        let uptime_seconds = state.startup_time.elapsed().unwrap_or_default().as_secs();

        let active_processors = if let Some(manager) = &state.manager {
            match ractor::rpc::call(manager, |reply| ManagerMessage::GetActiveProcessors { reply }, None).await {
                Ok(CallResult::Success(count)) => count,
                _ => 0
            }
        } else {
            0
        };

        let health = SystemHealth { active_processors, uptime_seconds };

        event!(Level::DEBUG, event = guardian::HEALTH_CHECK_COMPLETED,
               active_processors = %active_processors, uptime_seconds = %uptime_seconds);

        if let Err(e) = reply.send(health) {
            event!(Level::ERROR, event = guardian::HEALTH_CHECK_COMPLETED, error = %e);
        }

        Ok(())
    }

    /// Forward a command to the manager, carrying the caller's reply port
    async fn handle_submit_command(
        &self,
        sender: PrincipalId,
        command: HosterCommand,
        reply: RpcReplyPort<Result<CommandReply, HosterError>>,
        state: &GuardianState
    ) -> Result<(), ActorProcessingErr> {
        event!(Level::DEBUG, event = guardian::COMMAND_SUBMITTED, sender = %sender);

        let manager = match (&state.manager, state.is_initialized) {
            (Some(manager), true) => manager,
            _ => {
                if let Err(e) = reply.send(Err(HosterError::Generic("Actor system not initialized".to_string()))) {
                    event!(Level::ERROR, event = guardian::COMMAND_SUBMITTED, error = %e);
                }
                return Ok(());
            }
        };

        if let Err(e) = manager.cast(ManagerMessage::SubmitCommand { sender, command, reply }) {
            event!(Level::ERROR, event = guardian::COMMAND_SUBMITTED, error = ?e, message = "manager_unreachable");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ractor::rpc::{CallResult, call};

    use super::*;
    use crate::{
        adapter::{
            access::InMemoryAccessStore, git::Git2Client, journal::InMemoryActionLog, process::TokioProcessHost,
            registry::InMemoryDeploymentStore
        },
        config::Settings,
        domain::reply::ReplyBody
    };

    async fn submit(
        guardian: &ActorRef<GuardianMessage>,
        sender: PrincipalId,
        text: &str
    ) -> Result<CommandReply, HosterError> {
        let command = HosterCommand::parse_text(text).unwrap();
        match call(
            guardian,
            |reply| GuardianMessage::SubmitCommand { sender, command, reply },
            Some(Duration::from_secs(5))
        )
        .await
        {
            Ok(CallResult::Success(result)) => result,
            Ok(_) => panic!("guardian call did not succeed"),
            Err(e) => panic!("guardian call failed: {e}")
        }
    }

    #[tokio::test]
    async fn commands_round_trip_through_the_actor_system() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::for_tests(tmp.path().to_path_buf());
        let app = Arc::new(AppContext::with_adapters(
            settings.clone(),
            Arc::new(InMemoryAccessStore::new(100)),
            Arc::new(InMemoryDeploymentStore::new()),
            Arc::new(InMemoryActionLog::new()),
            Arc::new(Git2Client::new(Duration::from_secs(5))),
            Arc::new(TokioProcessHost::from_settings(&settings).unwrap())
        ));

        let guardian = Guardian::spawn_system(app).await.unwrap();

        let reply = submit(&guardian, 100, "/approve 555").await.unwrap();
        assert_eq!(reply.body, ReplyBody::Text("✅ User 555 approved".to_string()));

        let reply = submit(&guardian, 555, "/status").await.unwrap();
        match reply.body {
            ReplyBody::Status(panel) => assert!(panel.running.is_empty()),
            other => panic!("expected status panel, got {other:?}")
        }

        let err = submit(&guardian, 999, "/status").await.unwrap_err();
        assert!(matches!(err, HosterError::AccessDenied(_)));

        let health = match call(&guardian, |reply| GuardianMessage::HealthCheck { reply }, Some(Duration::from_secs(5)))
            .await
        {
            Ok(CallResult::Success(health)) => health,
            Ok(_) => panic!("health check did not succeed"),
            Err(e) => panic!("health check failed: {e}")
        };
        assert_eq!(health.active_processors, 0);

        guardian.cast(GuardianMessage::Shutdown).unwrap();
    }
}
