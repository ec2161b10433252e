//! Line-oriented console gateway
//!
//! Stands in for a chat transport during local operation: each stdin line is
//! `<principal_id> <text>`, where text is a `/command` or `!<callback-data>`
//! for the interactive controls a panel advertises. Replies render to
//! stdout, addressed to their recipient.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{Level, event};

use crate::{
    domain::{
        constant::gateway,
        error::HosterError,
        principal::PrincipalId,
        reply::{CommandReply, ReplyBody, ReplyControl}
    },
    port::gateway::{CommandGateway, Inbound, InboundPayload}
};

/// Console implementation of the command gateway
pub struct ConsoleGateway {
    owner: PrincipalId,
    lines: Lines<BufReader<Stdin>>
}

impl ConsoleGateway {
    pub fn new(owner: PrincipalId) -> Self {
        Self { owner, lines: BufReader::new(tokio::io::stdin()).lines() }
    }

    /// Parse one input line into an inbound command envelope.
    fn parse_line(line: &str) -> Option<Inbound> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let (id, rest) = trimmed.split_once(char::is_whitespace)?;
        let sender = id.parse::<PrincipalId>().ok()?;
        let rest = rest.trim();
        if rest.is_empty() {
            return None;
        }

        let payload = match rest.strip_prefix('!') {
            Some(data) => InboundPayload::Callback(data.to_string()),
            None => InboundPayload::Text(rest.to_string())
        };

        Some(Inbound { sender, payload })
    }

    /// Render a reply body the way a chat surface would.
    fn render(reply: &CommandReply) -> String {
        match &reply.body {
            ReplyBody::Text(text) => text.clone(),
            ReplyBody::Status(panel) => {
                let mut out = String::from("📊 BOT STATUS PANEL\n\n🟢 Running Bots:\n");
                if panel.running.is_empty() {
                    out.push_str("• None\n");
                } else {
                    for name in &panel.running {
                        out.push_str(&format!("• `{name}`\n"));
                    }
                }
                for control in &panel.controls {
                    match control {
                        ReplyControl::ForceStop { name } => {
                            out.push_str(&format!("[⛔ Stop {name}] → send: !force_stop:{name}\n"));
                        }
                        ReplyControl::Refresh => out.push_str("[🔄 Refresh] → send: !refresh\n")
                    }
                }
                out.trim_end().to_string()
            }
        }
    }
}

#[async_trait]
impl CommandGateway for ConsoleGateway {
    async fn next(&mut self) -> Option<Inbound> {
        loop {
            let line = self.lines.next_line().await.ok()??;
            match Self::parse_line(&line) {
                Some(inbound) => return Some(inbound),
                None => {
                    if !line.trim().is_empty() {
                        event!(Level::DEBUG, event = gateway::LINE_IGNORED, line = %line.trim());
                    }
                }
            }
        }
    }

    async fn reply(&mut self, to: PrincipalId, reply: &CommandReply) -> Result<(), HosterError> {
        println!("→ {to}: {}", Self::render(reply));
        event!(Level::DEBUG, event = gateway::REPLY_SENT, to = %to);
        Ok(())
    }

    async fn reply_error(&mut self, to: PrincipalId, error: &HosterError) -> Result<(), HosterError> {
        println!("→ {to}: ❌ {error}");
        event!(Level::DEBUG, event = gateway::REPLY_SENT, to = %to);
        Ok(())
    }

    async fn notify_owner(&mut self, text: &str) -> Result<(), HosterError> {
        println!("→ {}: {text}", self.owner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{deployment::DeploymentName, reply::StatusPanel};

    #[test]
    fn parses_text_and_callback_lines() {
        let inbound = ConsoleGateway::parse_line("555 /deploy https://example.com/x.git | T").unwrap();
        assert_eq!(inbound.sender, 555);
        assert_eq!(inbound.payload, InboundPayload::Text("/deploy https://example.com/x.git | T".to_string()));

        let inbound = ConsoleGateway::parse_line("100 !force_stop:sample-bot").unwrap();
        assert_eq!(inbound.payload, InboundPayload::Callback("force_stop:sample-bot".to_string()));
    }

    #[test]
    fn ignores_unparseable_lines() {
        assert!(ConsoleGateway::parse_line("").is_none());
        assert!(ConsoleGateway::parse_line("not-a-number /status").is_none());
        assert!(ConsoleGateway::parse_line("555").is_none());
        assert!(ConsoleGateway::parse_line("555    ").is_none());
    }

    #[test]
    fn renders_panel_with_controls() {
        let panel = StatusPanel::new(vec![DeploymentName::parse("sample-bot").unwrap()]);
        let rendered = ConsoleGateway::render(&CommandReply::status(panel));

        assert!(rendered.contains("• `sample-bot`"));
        assert!(rendered.contains("!force_stop:sample-bot"));
        assert!(rendered.contains("!refresh"));
    }

    #[test]
    fn renders_empty_panel_as_none() {
        let rendered = ConsoleGateway::render(&CommandReply::status(StatusPanel::new(Vec::new())));
        assert!(rendered.contains("• None"));
    }
}
