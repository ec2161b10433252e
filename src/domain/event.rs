//! Audit events appended to the action log
//!
//! One event per completed lifecycle effect. Authorization and argument
//! failures never produce an event; the log records what happened, not what
//! was refused.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{deployment::DeploymentName, principal::PrincipalId};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Principal approved event - emitted when the owner adds an id to the allowlist
pub struct PrincipalApprovedEvent {
    pub event_id:  String,
    pub timestamp: DateTime<Utc>,
    pub actor:     PrincipalId,
    pub principal: PrincipalId
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Bot deployed event - emitted once the entry point is running and recorded
pub struct BotDeployedEvent {
    pub event_id:  String,
    pub timestamp: DateTime<Utc>,
    pub actor:     PrincipalId,
    pub name:      DeploymentName,
    pub repo_url:  String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Bot stopped event - emitted once the registry entry is removed
pub struct BotStoppedEvent {
    pub event_id:  String,
    pub timestamp: DateTime<Utc>,
    pub actor:     PrincipalId,
    pub name:      DeploymentName,
    pub forced:    bool
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Status viewed event - emitted when the status panel is rendered
pub struct StatusViewedEvent {
    pub event_id:  String,
    pub timestamp: DateTime<Utc>,
    pub actor:     PrincipalId
}

/// Unified event enum for all audited lifecycle actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HosterEvent {
    PrincipalApproved(PrincipalApprovedEvent),
    BotDeployed(BotDeployedEvent),
    BotStopped(BotStoppedEvent),
    StatusViewed(StatusViewedEvent)
}

impl HosterEvent {
    pub fn approved(actor: PrincipalId, principal: PrincipalId) -> Self {
        HosterEvent::PrincipalApproved(PrincipalApprovedEvent {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            actor,
            principal
        })
    }

    pub fn deployed(actor: PrincipalId, name: DeploymentName, repo_url: impl Into<String>) -> Self {
        HosterEvent::BotDeployed(BotDeployedEvent {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            actor,
            name,
            repo_url: repo_url.into()
        })
    }

    pub fn stopped(actor: PrincipalId, name: DeploymentName, forced: bool) -> Self {
        HosterEvent::BotStopped(BotStoppedEvent {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            actor,
            name,
            forced
        })
    }

    pub fn status_viewed(actor: PrincipalId) -> Self {
        HosterEvent::StatusViewed(StatusViewedEvent {
            event_id:  Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            actor
        })
    }

    /// Audit verb for the persisted log line
    pub fn verb(&self) -> &'static str {
        match self {
            HosterEvent::PrincipalApproved(_) => "APPROVE",
            HosterEvent::BotDeployed(_) => "DEPLOY",
            HosterEvent::BotStopped(e) => {
                if e.forced { "FORCE_STOP" } else { "STOP" }
            }
            HosterEvent::StatusViewed(_) => "STATUS"
        }
    }

    /// Principal that triggered the action
    pub fn actor(&self) -> PrincipalId {
        match self {
            HosterEvent::PrincipalApproved(e) => e.actor,
            HosterEvent::BotDeployed(e) => e.actor,
            HosterEvent::BotStopped(e) => e.actor,
            HosterEvent::StatusViewed(e) => e.actor
        }
    }

    /// What the action was applied to
    pub fn subject(&self) -> String {
        match self {
            HosterEvent::PrincipalApproved(e) => e.principal.to_string(),
            HosterEvent::BotDeployed(e) => e.name.to_string(),
            HosterEvent::BotStopped(e) => e.name.to_string(),
            HosterEvent::StatusViewed(_) => "-".to_string()
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            HosterEvent::PrincipalApproved(e) => e.timestamp,
            HosterEvent::BotDeployed(e) => e.timestamp,
            HosterEvent::BotStopped(e) => e.timestamp,
            HosterEvent::StatusViewed(e) => e.timestamp
        }
    }
}

impl Display for HosterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event_type = match self {
            HosterEvent::PrincipalApproved(_) => "PrincipalApproved",
            HosterEvent::BotDeployed(_) => "BotDeployed",
            HosterEvent::BotStopped(_) => "BotStopped",
            HosterEvent::StatusViewed(_) => "StatusViewed"
        };
        write!(f, "{}", event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_verb_depends_on_forced_flag() {
        let name = DeploymentName::parse("sample-bot").unwrap();
        assert_eq!(HosterEvent::stopped(1, name.clone(), false).verb(), "STOP");
        assert_eq!(HosterEvent::stopped(1, name, true).verb(), "FORCE_STOP");
    }

    #[test]
    fn subject_is_target_not_actor() {
        let event = HosterEvent::approved(100, 555);
        assert_eq!(event.actor(), 100);
        assert_eq!(event.subject(), "555");
        assert_eq!(event.verb(), "APPROVE");
    }
}
