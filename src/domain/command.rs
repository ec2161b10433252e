//! Typed commands delivered by the gateway
//!
//! The gateway hands the core a `(sender, text)` pair; parsing happens here
//! so transports stay dumb. Interactive controls arrive as callback data and
//! parse through [`HosterCommand::parse_callback`].

use serde::{Deserialize, Serialize};

use crate::domain::{
    deployment::DeploymentName,
    error::HosterError,
    principal::{Privilege, PrincipalId}
};

pub const USAGE_APPROVE: &str = "Use: /approve user_id";
pub const USAGE_DEPLOY: &str = "Use: /deploy repo_link | bot_token";
pub const USAGE_STOP: &str = "Use: /stop bot_name";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestAccessCommand;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovePrincipalCommand {
    pub principal: PrincipalId
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeployBotCommand {
    pub repo_url:  String,
    pub bot_token: String
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopBotCommand {
    pub name:   String,
    /// Forced stops come from the interactive control and demand the owner
    pub forced: bool
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotStatusCommand;

/// Unified command enum for everything the gateway can deliver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HosterCommand {
    RequestAccess(RequestAccessCommand),
    Approve(ApprovePrincipalCommand),
    Deploy(DeployBotCommand),
    Stop(StopBotCommand),
    Status(BotStatusCommand)
}

impl HosterCommand {
    /// Parse a chat text command. A leading `/` is accepted and ignored.
    pub fn parse_text(text: &str) -> Result<Self, HosterError> {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (trimmed, "")
        };

        match verb {
            "request" => Ok(RequestAccessCommand.into()),
            "approve" => {
                let principal = rest
                    .parse::<PrincipalId>()
                    .map_err(|_| HosterError::BadCommand(USAGE_APPROVE.to_string()))?;
                Ok(ApprovePrincipalCommand { principal }.into())
            }
            "deploy" => {
                let (repo_url, bot_token) = rest
                    .split_once('|')
                    .map(|(url, token)| (url.trim(), token.trim()))
                    .ok_or_else(|| HosterError::BadCommand(USAGE_DEPLOY.to_string()))?;
                if repo_url.is_empty() || bot_token.is_empty() {
                    return Err(HosterError::BadCommand(USAGE_DEPLOY.to_string()));
                }
                Ok(DeployBotCommand { repo_url: repo_url.to_string(), bot_token: bot_token.to_string() }.into())
            }
            "stop" => {
                if rest.is_empty() {
                    return Err(HosterError::BadCommand(USAGE_STOP.to_string()));
                }
                Ok(StopBotCommand { name: rest.to_string(), forced: false }.into())
            }
            "status" => Ok(BotStatusCommand.into()),
            other => Err(HosterError::BadCommand(format!("Unknown command: {other}")))
        }
    }

    /// Parse callback data from an interactive control.
    pub fn parse_callback(data: &str) -> Result<Self, HosterError> {
        if data == "refresh" {
            return Ok(BotStatusCommand.into());
        }
        if let Some(name) = data.strip_prefix("force_stop:") {
            return Ok(StopBotCommand { name: name.to_string(), forced: true }.into());
        }
        Err(HosterError::BadCommand(format!("Unknown control: {data}")))
    }

    /// Privilege the sender must hold. The forced/unforced stop asymmetry
    /// lives here instead of in duplicated handler code.
    pub fn privilege(&self) -> Privilege {
        match self {
            HosterCommand::RequestAccess(_) => Privilege::Any,
            HosterCommand::Approve(_) => Privilege::Owner,
            HosterCommand::Deploy(_) => Privilege::Approved,
            HosterCommand::Stop(cmd) => {
                if cmd.forced { Privilege::Owner } else { Privilege::Approved }
            }
            HosterCommand::Status(_) => Privilege::Approved
        }
    }

    /// Deployment name this command operates on, used to route it to the
    /// per-name processor that serializes lifecycle operations.
    pub fn deployment_key(&self) -> Option<DeploymentName> {
        match self {
            HosterCommand::Deploy(cmd) => DeploymentName::derive(&cmd.repo_url).ok(),
            HosterCommand::Stop(cmd) => DeploymentName::parse(&cmd.name).ok(),
            _ => None
        }
    }
}

impl From<RequestAccessCommand> for HosterCommand {
    fn from(val: RequestAccessCommand) -> Self {
        HosterCommand::RequestAccess(val)
    }
}

impl From<ApprovePrincipalCommand> for HosterCommand {
    fn from(val: ApprovePrincipalCommand) -> Self {
        HosterCommand::Approve(val)
    }
}

impl From<DeployBotCommand> for HosterCommand {
    fn from(val: DeployBotCommand) -> Self {
        HosterCommand::Deploy(val)
    }
}

impl From<StopBotCommand> for HosterCommand {
    fn from(val: StopBotCommand) -> Self {
        HosterCommand::Stop(val)
    }
}

impl From<BotStatusCommand> for HosterCommand {
    fn from(val: BotStatusCommand) -> Self {
        HosterCommand::Status(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deploy_with_pipe_separator() {
        let cmd = HosterCommand::parse_text("/deploy https://example.com/sample-bot.git | TOKEN123").unwrap();
        assert_eq!(
            cmd,
            HosterCommand::Deploy(DeployBotCommand {
                repo_url:  "https://example.com/sample-bot.git".to_string(),
                bot_token: "TOKEN123".to_string()
            })
        );
        assert_eq!(cmd.deployment_key().unwrap().as_str(), "sample-bot");
    }

    #[test]
    fn deploy_without_token_is_bad_command() {
        let err = HosterCommand::parse_text("/deploy https://example.com/sample-bot.git").unwrap_err();
        assert!(matches!(err, HosterError::BadCommand(msg) if msg == USAGE_DEPLOY));
    }

    #[test]
    fn approve_requires_numeric_id() {
        assert!(HosterCommand::parse_text("/approve 555").is_ok());
        assert!(matches!(
            HosterCommand::parse_text("/approve bob"),
            Err(HosterError::BadCommand(msg)) if msg == USAGE_APPROVE
        ));
        assert!(HosterCommand::parse_text("/approve").is_err());
    }

    #[test]
    fn stop_requires_name() {
        let cmd = HosterCommand::parse_text("stop sample-bot").unwrap();
        assert_eq!(cmd, HosterCommand::Stop(StopBotCommand { name: "sample-bot".to_string(), forced: false }));
        assert!(HosterCommand::parse_text("stop").is_err());
    }

    #[test]
    fn unknown_verb_is_rejected() {
        assert!(matches!(HosterCommand::parse_text("/restart x"), Err(HosterError::BadCommand(_))));
    }

    #[test]
    fn refresh_callback_maps_to_status() {
        assert_eq!(HosterCommand::parse_callback("refresh").unwrap(), HosterCommand::Status(BotStatusCommand));
    }

    #[test]
    fn force_stop_callback_is_owner_only() {
        let cmd = HosterCommand::parse_callback("force_stop:sample-bot").unwrap();
        assert_eq!(cmd, HosterCommand::Stop(StopBotCommand { name: "sample-bot".to_string(), forced: true }));
        assert_eq!(cmd.privilege(), Privilege::Owner);
    }

    #[test]
    fn plain_stop_needs_approval_only() {
        let cmd = HosterCommand::parse_text("/stop sample-bot").unwrap();
        assert_eq!(cmd.privilege(), Privilege::Approved);
    }

    #[test]
    fn request_access_is_open_to_anyone() {
        assert_eq!(HosterCommand::parse_text("/request").unwrap().privilege(), Privilege::Any);
    }
}
