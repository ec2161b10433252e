//! CommandProcessor Actor - serialized lifecycle operations for one name
//!
//! Each deployment name gets its own processor; its mailbox is the per-name
//! mutual exclusion around the full deploy/stop sequence. Two deploys for
//! the same name can never interleave, while different names proceed
//! concurrently without blocking the manager's dispatch loop.

use std::sync::Arc;

use ractor::{Actor, ActorProcessingErr, ActorRef};
use tracing::{Level, event};

use crate::{
    AppContext,
    actor::message::ProcessorMessage,
    domain::{constant::command_processor, engine::CommandEngine},
    port::command::Command
};

/// CommandProcessor Actor State
pub struct CommandProcessorState {
    /// Deployment name this processor serializes
    pub name: String,
    /// Shared application context
    pub app:  Arc<AppContext>
}

/// CommandProcessor Actor - handles commands for a single deployment name
pub struct CommandProcessor;

#[async_trait::async_trait]
impl Actor for CommandProcessor {
    type Arguments = (String, Arc<AppContext>);
    type Msg = ProcessorMessage;
    type State = CommandProcessorState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        (name, app): Self::Arguments
    ) -> Result<Self::State, ActorProcessingErr> {
        event!(Level::DEBUG, event = command_processor::PROCESSOR_STARTED, deployment = %name);

        Ok(CommandProcessorState { name, app })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ProcessorMessage::Execute { sender, command, reply } => {
                event!(Level::DEBUG, event = command_processor::COMMAND_RECEIVED,
                       deployment = %state.name, command = %command.name(), sender = %sender);

                let result = CommandEngine::execute(&command, sender, &state.app).await;

                match &result {
                    Ok(_) => {
                        event!(Level::DEBUG, event = command_processor::COMMAND_PROCESSED,
                               deployment = %state.name, sender = %sender);
                    }
                    Err(e) => {
                        event!(Level::WARN, event = command_processor::COMMAND_FAILED,
                               deployment = %state.name, sender = %sender, error = %e);
                    }
                }

                if let Err(e) = reply.send(result) {
                    event!(Level::ERROR, event = command_processor::COMMAND_FAILED,
                           deployment = %state.name, error = %e, message = "reply_port_closed");
                }

                Ok(())
            }
        }
    }
}
