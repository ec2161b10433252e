//! DeploymentManager Actor - dispatches commands and owns the processors
//!
//! The manager routes lifecycle commands (deploy/stop) to a per-name
//! CommandProcessor and executes everything else inline. Routing is a cast
//! that carries the caller's reply port along, so a minutes-long clone never
//! blocks dispatch of other commands.
//!
//! On startup the manager sweeps the deployment registry and drops entries
//! whose process died while the manager was down.

use std::{collections::HashMap, sync::Arc};

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SpawnErr};
use tracing::{Level, event};

use crate::{
    AppContext,
    actor::{
        message::{ManagerMessage, ProcessorMessage},
        processor::CommandProcessor
    },
    domain::{
        command::HosterCommand, constant::deployment_manager, engine::CommandEngine, error::HosterError,
        principal::PrincipalId, reply::CommandReply
    },
    port::{process::ProcessHost, registry::DeploymentStore}
};

/// DeploymentManager Actor State
pub struct DeploymentManagerState {
    /// Live per-deployment processors (deployment name -> processor_ref).
    /// A processor is reused across deploy/stop cycles of its name.
    processors:               HashMap<String, ActorRef<ProcessorMessage>>,
    /// Shared application context
    app:                      Arc<AppContext>,
    /// Statistics for monitoring and health checks
    total_commands_processed: u64
}

/// DeploymentManager Actor - routes commands, serializes per-name work
pub struct DeploymentManager;

#[async_trait::async_trait]
impl Actor for DeploymentManager {
    type Arguments = Arc<AppContext>;
    type Msg = ManagerMessage;
    type State = DeploymentManagerState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        app: Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = deployment_manager::MANAGER_STARTED);

        Self::sweep_stale_records(&app).await;

        Ok(DeploymentManagerState { processors: HashMap::new(), app, total_commands_processed: 0 })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ManagerMessage::SubmitCommand { sender, command, reply } => {
                self.handle_submit_command(myself, sender, command, reply, state).await
            }
            ManagerMessage::GetActiveProcessors { reply } => {
                if let Err(e) = reply.send(state.processors.len()) {
                    event!(Level::ERROR, event = deployment_manager::MANAGER_STARTED, error = %e);
                }
                Ok(())
            }
        }
    }
}

impl DeploymentManager {
    /// Drop registry entries whose process died while the manager was down.
    async fn sweep_stale_records(app: &AppContext) {
        event!(Level::DEBUG, event = deployment_manager::SWEEP_STARTED);

        let records = match app.registry.list().await {
            Ok(records) => records,
            Err(e) => {
                event!(Level::WARN, event = deployment_manager::SWEEP_STARTED, error = %e,
                       message = "registry_unreadable_skipping_sweep");
                return;
            }
        };

        let mut dropped = 0usize;
        for (name, record) in records {
            if app.host.probe(&record) {
                continue;
            }
            match app.registry.remove(&name).await {
                Ok(()) => {
                    dropped += 1;
                    event!(Level::INFO, event = deployment_manager::SWEEP_ENTRY_DROPPED,
                           deployment = %name, pid = %record.pid);
                }
                Err(e) => {
                    event!(Level::WARN, event = deployment_manager::SWEEP_ENTRY_DROPPED,
                           deployment = %name, error = %e);
                }
            }
        }

        event!(Level::DEBUG, event = deployment_manager::SWEEP_COMPLETED, dropped = %dropped);
    }

    async fn handle_submit_command(
        &self,
        _myself: ActorRef<ManagerMessage>,
        sender: PrincipalId,
        command: HosterCommand,
        reply: RpcReplyPort<Result<CommandReply, HosterError>>,
        state: &mut DeploymentManagerState
    ) -> Result<(), ActorProcessingErr> {
        state.total_commands_processed += 1;
        event!(Level::DEBUG, event = deployment_manager::COMMAND_SUBMITTED,
               sender = %sender, total_processed = %state.total_commands_processed);

        let Some(key) = command.deployment_key() else {
            // Non-lifecycle commands are quick (file reads, one append) and
            // run on the dispatch path.
            let result = CommandEngine::execute(&command, sender, &state.app).await;
            if let Err(e) = reply.send(result) {
                event!(Level::ERROR, event = deployment_manager::COMMAND_SUBMITTED, error = %e);
            }
            return Ok(());
        };

        let processor_ref = match state.processors.get(key.as_str()) {
            Some(existing) => existing.clone(),
            None => match self.spawn_processor(key.as_str(), state.app.clone()).await {
                Ok(processor_ref) => {
                    state.processors.insert(key.as_str().to_string(), processor_ref.clone());
                    event!(Level::DEBUG, event = deployment_manager::PROCESSOR_SPAWNED,
                           deployment = %key, total_processors = %state.processors.len());
                    processor_ref
                }
                Err(e) => {
                    event!(Level::ERROR, event = deployment_manager::PROCESSOR_SPAWN_FAILED,
                           deployment = %key, error = %e);
                    let _ = reply.send(Err(HosterError::Spawn(e.to_string())));
                    return Ok(());
                }
            }
        };

        // Hand the reply port to the processor; its mailbox serializes all
        // work for this name while the manager stays free.
        if let Err(e) = processor_ref.cast(ProcessorMessage::Execute { sender, command, reply }) {
            event!(Level::ERROR, event = deployment_manager::COMMAND_SUBMITTED,
                   deployment = %key, error = ?e, message = "processor_unreachable");
        }

        Ok(())
    }

    async fn spawn_processor(
        &self,
        name: &str,
        app: Arc<AppContext>
    ) -> Result<ActorRef<ProcessorMessage>, SpawnErr> {
        let processor_name = format!("deployment_{}", name);
        let (processor_ref, _handle) =
            Actor::spawn(Some(processor_name), CommandProcessor, (name.to_string(), app)).await?;

        Ok(processor_ref)
    }
}
