//! Command gateway port
//!
//! The transport's whole contract with the core: deliver a command with a
//! sender identity, render a reply. Anything chat-shaped can sit behind
//! this trait.

use async_trait::async_trait;

use crate::domain::{error::HosterError, principal::PrincipalId, reply::CommandReply};

/// Raw payload a transport delivers alongside the sender identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    /// A text command, e.g. `/deploy url | token`
    Text(String),
    /// Callback data from an interactive control, e.g. `force_stop:name`
    Callback(String)
}

/// One authenticated inbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub sender:  PrincipalId,
    pub payload: InboundPayload
}

/// Chat transport seam
#[async_trait]
pub trait CommandGateway: Send {
    /// Next inbound command, or `None` when the transport closed
    async fn next(&mut self) -> Option<Inbound>;

    /// Render a reply back to the sender
    async fn reply(&mut self, to: PrincipalId, reply: &CommandReply) -> Result<(), HosterError>;

    /// Render a refusal or failure back to the sender
    async fn reply_error(&mut self, to: PrincipalId, error: &HosterError) -> Result<(), HosterError>;

    /// Deliver a note to the owner (access requests)
    async fn notify_owner(&mut self, text: &str) -> Result<(), HosterError>;
}
