//! Rendering-ready command replies
//!
//! The gateway owns presentation; the core hands it structured content.
//! Every command produces exactly one reply.

use crate::domain::deployment::DeploymentName;

/// Interactive control attached to a status panel
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyControl {
    /// Owner-only forced stop of one deployment
    ForceStop { name: DeploymentName },
    /// Re-run the status query
    Refresh
}

/// Snapshot of running deployments plus their controls
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusPanel {
    pub running:  Vec<DeploymentName>,
    pub controls: Vec<ReplyControl>
}

impl StatusPanel {
    pub fn new(running: Vec<DeploymentName>) -> Self {
        let mut controls: Vec<ReplyControl> =
            running.iter().map(|name| ReplyControl::ForceStop { name: name.clone() }).collect();
        controls.push(ReplyControl::Refresh);

        Self { running, controls }
    }
}

/// Body of a reply: plain text or an interactive panel
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Text(String),
    Status(StatusPanel)
}

/// Reply to the sender, optionally carrying a note addressed to the owner
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReply {
    pub body:       ReplyBody,
    pub owner_note: Option<String>
}

impl CommandReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { body: ReplyBody::Text(text.into()), owner_note: None }
    }

    pub fn status(panel: StatusPanel) -> Self {
        Self { body: ReplyBody::Status(panel), owner_note: None }
    }

    pub fn with_owner_note(mut self, note: impl Into<String>) -> Self {
        self.owner_note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_gets_one_force_stop_control_per_running_bot_plus_refresh() {
        let running =
            vec![DeploymentName::parse("alpha").unwrap(), DeploymentName::parse("beta").unwrap()];
        let panel = StatusPanel::new(running);

        assert_eq!(panel.controls.len(), 3);
        assert!(matches!(panel.controls.last(), Some(ReplyControl::Refresh)));
    }

    #[test]
    fn empty_panel_still_offers_refresh() {
        let panel = StatusPanel::new(Vec::new());
        assert_eq!(panel.controls, vec![ReplyControl::Refresh]);
    }
}
