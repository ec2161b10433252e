//! Environment-based configuration
//!
//! Everything the manager needs arrives through the environment at startup;
//! missing or malformed values are a fatal startup error. Launcher settings
//! default to the conventional bot runtime (pip + `python3 app.py`) and can
//! be overridden per host.

use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::{error::HosterError, principal::PrincipalId};

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest_file() -> String {
    "requirements.txt".to_string()
}

fn default_install_command() -> String {
    "pip install -r requirements.txt".to_string()
}

fn default_entry_command() -> String {
    "python3 app.py".to_string()
}

fn default_clone_timeout_secs() -> u64 {
    300
}

fn default_install_timeout_secs() -> u64 {
    300
}

fn default_spawn_timeout_secs() -> u64 {
    30
}

/// Configuration for the hosting manager
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Platform API id, forwarded into every deployment's credential file
    pub api_id:   i64,
    /// Platform API hash, forwarded into every deployment's credential file
    pub api_hash: String,
    /// The manager's own bot token
    pub bot_token: String,
    /// The single privileged principal, immutable for the process lifetime
    pub owner_id: PrincipalId,
    /// Health endpoint listen port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Root under which `bots/`, `approved.txt` and `logs/` live
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Dependency manifest looked for inside a fresh clone
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// Installer invoked (cwd = deployment dir) when the manifest exists
    #[serde(default = "default_install_command")]
    pub install_command: String,
    /// Entry point invoked (cwd = deployment dir) to launch the bot
    #[serde(default = "default_entry_command")]
    pub entry_command: String,
    #[serde(default = "default_clone_timeout_secs")]
    pub clone_timeout_secs: u64,
    #[serde(default = "default_install_timeout_secs")]
    pub install_timeout_secs: u64,
    #[serde(default = "default_spawn_timeout_secs")]
    pub spawn_timeout_secs: u64
}

impl Settings {
    /// Load from the environment (`API_ID`, `API_HASH`, `BOT_TOKEN`,
    /// `OWNER_ID`, plus optional overrides).
    pub fn from_env() -> Result<Self, HosterError> {
        envy::from_env::<Settings>().map_err(|e| HosterError::Configuration(format!("Invalid environment: {e}")))
    }

    /// Directory holding one subdirectory per deployment
    pub fn bots_dir(&self) -> PathBuf {
        self.data_dir.join("bots")
    }

    /// Append-only allowlist, one principal id per line
    pub fn approved_file(&self) -> PathBuf {
        self.data_dir.join("approved.txt")
    }

    /// Append-only audit trail
    pub fn actions_log_file(&self) -> PathBuf {
        self.data_dir.join("logs").join("actions.log")
    }

    #[cfg(test)]
    pub(crate) fn for_tests(data_dir: PathBuf) -> Self {
        Self {
            api_id: 12345,
            api_hash: "test-hash".to_string(),
            bot_token: "test-manager-token".to_string(),
            owner_id: 100,
            port: 0,
            data_dir,
            manifest_file: default_manifest_file(),
            install_command: default_install_command(),
            entry_command: default_entry_command(),
            clone_timeout_secs: 5,
            install_timeout_secs: 5,
            spawn_timeout_secs: 5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_paths_hang_off_the_data_dir() {
        let settings = Settings::for_tests(PathBuf::from("/tmp/hoster"));

        assert_eq!(settings.bots_dir(), PathBuf::from("/tmp/hoster/bots"));
        assert_eq!(settings.approved_file(), PathBuf::from("/tmp/hoster/approved.txt"));
        assert_eq!(settings.actions_log_file(), PathBuf::from("/tmp/hoster/logs/actions.log"));
    }
}
