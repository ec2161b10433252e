//! # Hoster Daemon
//!
//! Long-running manager binary: wires the file-backed stores, spawns the
//! actor system, serves the liveness endpoint and pumps the command gateway.
//!
//! ## Usage
//!
//! ```bash
//! # All required configuration comes from the environment
//! API_ID=12345 API_HASH=... BOT_TOKEN=... OWNER_ID=100 hosterd
//!
//! # Override where bots/, approved.txt and logs/ live
//! hosterd --data-dir /var/lib/hoster
//! ```
//!
//! Commands arrive on stdin as `<principal_id> <text>`, e.g.
//! `555 /deploy https://example.com/sample-bot.git | TOKEN123` or
//! `100 !force_stop:sample-bot` for interactive controls.

use std::{sync::Arc, time::Duration};

use clap::Parser;
use hoster::{
    AppContext, Settings,
    actor::{Guardian, GuardianMessage},
    adapter::gateway::ConsoleGateway,
    domain::{command::HosterCommand, error::HosterError},
    health,
    port::gateway::{CommandGateway, Inbound, InboundPayload}
};
use ractor::{
    ActorRef,
    rpc::{CallResult, call}
};
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Hosting manager daemon
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct HosterCli {
    /// Override the data directory (defaults to DATA_DIR or ".")
    #[arg(long)]
    data_dir: Option<std::path::PathBuf>
}

#[tokio::main]
async fn main() -> Result<(), HosterError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hoster=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = HosterCli::parse();
    let mut settings = Settings::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    let owner_id = settings.owner_id;
    let port = settings.port;

    let app = Arc::new(AppContext::init(settings)?);
    let guardian = Guardian::spawn_system(app).await?;

    // The system must answer a health check before the gateway opens.
    match call(&guardian, |reply| GuardianMessage::HealthCheck { reply }, Some(Duration::from_secs(10))).await {
        Ok(CallResult::Success(_)) => {}
        Ok(_) => return Err(HosterError::Generic("Actor system failed readiness check".to_string())),
        Err(e) => return Err(HosterError::Generic(format!("Actor system failed readiness check: {e}")))
    }

    let cancel = CancellationToken::new();
    let listener = health::bind(port).await?;
    let health_task = tokio::spawn(health::serve(listener, cancel.clone()));

    event!(Level::INFO, owner = %owner_id, "manager is live");

    let mut gateway = ConsoleGateway::new(owner_id);
    loop {
        tokio::select! {
            inbound = gateway.next() => {
                let Some(inbound) = inbound else { break };
                handle_inbound(&guardian, &mut gateway, inbound).await?;
            }
            _ = tokio::signal::ctrl_c() => break
        }
    }

    if let Err(e) = guardian.cast(GuardianMessage::Shutdown) {
        event!(Level::ERROR, error = ?e, "failed to shut down actor system");
    }
    cancel.cancel();
    if let Ok(result) = health_task.await {
        result?;
    }

    tokio::time::sleep(Duration::from_millis(100)).await;

    Ok(())
}

/// Parse, submit and answer one inbound command. Every inbound line gets
/// exactly one reply.
async fn handle_inbound(
    guardian: &ActorRef<GuardianMessage>,
    gateway: &mut ConsoleGateway,
    inbound: Inbound
) -> Result<(), HosterError> {
    let parsed = match &inbound.payload {
        InboundPayload::Text(text) => HosterCommand::parse_text(text),
        InboundPayload::Callback(data) => HosterCommand::parse_callback(data)
    };

    let command = match parsed {
        Ok(command) => command,
        Err(e) => return gateway.reply_error(inbound.sender, &e).await
    };

    // No outer timeout: every long-running step inside a deploy is already
    // individually bounded.
    let result = match call(
        guardian,
        |reply| GuardianMessage::SubmitCommand { sender: inbound.sender, command, reply },
        None
    )
    .await
    {
        Ok(CallResult::Success(result)) => result,
        Ok(CallResult::Timeout) => Err(HosterError::Timeout("Command processing timed out".to_string())),
        Ok(CallResult::SenderError) => Err(HosterError::Generic("Failed to deliver command".to_string())),
        Err(e) => Err(HosterError::Generic(format!("Failed to submit command: {e}")))
    };

    match result {
        Ok(reply) => {
            if let Some(note) = &reply.owner_note {
                gateway.notify_owner(note).await?;
            }
            gateway.reply(inbound.sender, &reply).await
        }
        Err(e) => gateway.reply_error(inbound.sender, &e).await
    }
}
