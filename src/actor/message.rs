//! Typed messages for actor communication

use ractor::{Message, RpcReplyPort};

use crate::domain::{command::HosterCommand, error::HosterError, principal::PrincipalId, reply::CommandReply};

/// Messages for the Guardian actor (root of actor system)
#[derive(Debug)]
pub enum GuardianMessage {
    /// Initialize the actor system
    Initialize,
    /// Submit a command for processing
    SubmitCommand {
        sender:  PrincipalId,
        command: HosterCommand,
        reply:   RpcReplyPort<Result<CommandReply, HosterError>>
    },
    /// Shutdown the entire system
    Shutdown,
    /// System health check
    HealthCheck { reply: RpcReplyPort<SystemHealth> }
}

/// Messages for the DeploymentManager actor
#[derive(Debug)]
pub enum ManagerMessage {
    /// Submit a command for dispatch
    SubmitCommand {
        sender:  PrincipalId,
        command: HosterCommand,
        reply:   RpcReplyPort<Result<CommandReply, HosterError>>
    },
    /// Get the number of live per-deployment processors
    GetActiveProcessors { reply: RpcReplyPort<usize> }
}

/// Messages for CommandProcessor actors (per deployment name)
#[derive(Debug)]
pub enum ProcessorMessage {
    /// Execute a lifecycle command for this processor's deployment
    Execute {
        sender:  PrincipalId,
        command: HosterCommand,
        reply:   RpcReplyPort<Result<CommandReply, HosterError>>
    }
}

/// System health information
#[derive(Debug)]
pub struct SystemHealth {
    pub active_processors: usize,
    pub uptime_seconds:    u64
}

// Implement Message trait for Ractor
impl Message for GuardianMessage {}
impl Message for ManagerMessage {}
impl Message for ProcessorMessage {}
