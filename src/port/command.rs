//! Base command trait that all commands must implement
//!
//! Every command follows the four-phase lifecycle:
//! 1. Load - Gather prerequisites (including the sender's approval state)
//! 2. Validate - Authorization and argument checks, no side effects yet
//! 3. Effect - Execute filesystem/process side effects, produce the reply
//! 4. Emit - Generate audit events for what actually happened
//!
//! Emit runs after the effect completed, so the audit trail never records an
//! action that was refused or aborted partway.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    AppContext,
    domain::{event::HosterEvent, principal::PrincipalId, reply::CommandReply}
};

/// Base trait that all commands must implement
#[async_trait]
pub trait Command: Debug + Send + Sync {
    /// The type of data loaded by this command
    type LoadedData: Send + Sync;

    /// The type of errors this command can produce
    type Error: std::error::Error + Send + Sync + 'static;

    /// Phase 1: Load prerequisites and dependencies
    ///
    /// This phase should:
    /// - Read whatever persisted state the later phases need
    /// - Resolve and normalize arguments (e.g. derive the deployment name)
    /// - Never mutate anything
    async fn load(&self, sender: PrincipalId, app: &AppContext) -> Result<Self::LoadedData, Self::Error>;

    /// Phase 2: Validate that the command may be executed
    ///
    /// This phase should:
    /// - Check the sender holds the required privilege
    /// - Verify preconditions against the loaded data
    /// - Fail before any side effect happens
    fn validate(&self, sender: PrincipalId, loaded: &Self::LoadedData) -> Result<(), Self::Error>;

    /// Phase 3: Execute side effects and produce the reply
    ///
    /// This phase should:
    /// - Perform filesystem and process operations
    /// - Write registry entries only after the effect they describe succeeded
    /// - Return the rendering-ready reply for the gateway
    async fn effect(
        &self,
        sender: PrincipalId,
        loaded: &Self::LoadedData,
        app: &AppContext
    ) -> Result<CommandReply, Self::Error>;

    /// Phase 4: Emit audit events for the completed effect
    ///
    /// Only called after a successful effect. Persisting the events is the
    /// engine's job; a persist failure is reported but never fails the
    /// command.
    fn emit(&self, sender: PrincipalId, loaded: &Self::LoadedData, reply: &CommandReply) -> Vec<HosterEvent>;

    /// Get a human-readable name for this command (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Check if this command modifies system state
    fn is_mutating(&self) -> bool {
        true
    }
}
