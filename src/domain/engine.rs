//! Command engine - drives the four-phase command lifecycle
//!
//! Authorization is computed once here from the command's declared
//! privilege, so the forced and unforced stop paths share a single
//! implementation instead of duplicating the check per entry point.

use tracing::{Level, event};

use crate::{
    AppContext,
    domain::{
        command::HosterCommand,
        constant::engine,
        error::HosterError,
        principal::{Privilege, PrincipalId},
        reply::CommandReply
    },
    port::{access::AccessStore, command::Command, journal::ActionLog}
};

pub struct CommandEngine;

impl CommandEngine {
    /// Execute one command: authorize, load, validate, effect, then append
    /// the audit events. Audit failures are reported and swallowed; the
    /// completed effect stands.
    pub async fn execute(
        command: &HosterCommand,
        sender: PrincipalId,
        app: &AppContext
    ) -> Result<CommandReply, HosterError> {
        if let Err(e) = Self::authorize(command, sender, app).await {
            event!(Level::DEBUG, event = engine::COMMAND_REJECTED,
                   command = %command.name(), sender = %sender, error = %e);
            return Err(e);
        }

        let loaded = command.load(sender, app).await?;
        command.validate(sender, &loaded)?;
        let reply = command.effect(sender, &loaded, app).await?;

        for audit_event in command.emit(sender, &loaded, &reply) {
            if let Err(e) = app.journal.record(&audit_event).await {
                event!(Level::ERROR, event = engine::AUDIT_WRITE_FAILED,
                       command = %command.name(), audit = %audit_event, error = %e);
            }
        }

        event!(Level::DEBUG, event = engine::COMMAND_EXECUTED,
               command = %command.name(), sender = %sender);
        Ok(reply)
    }

    async fn authorize(
        command: &HosterCommand,
        sender: PrincipalId,
        app: &AppContext
    ) -> Result<(), HosterError> {
        match command.privilege() {
            Privilege::Any => Ok(()),
            Privilege::Approved => {
                if app.access.is_approved(sender).await? {
                    Ok(())
                } else {
                    Err(HosterError::AccessDenied("Access denied. Use /request".to_string()))
                }
            }
            Privilege::Owner => {
                if app.access.is_owner(sender) {
                    Ok(())
                } else {
                    Err(HosterError::AccessDenied("Only owner allowed".to_string()))
                }
            }
        }
    }
}
