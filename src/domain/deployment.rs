//! Deployment identity and the per-deployment process record

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::HosterError;

/// Longest accepted deployment name. Anything longer is almost certainly a
/// mangled URL rather than a repository name.
const MAX_NAME_LEN: usize = 64;

/// Validated deployment name, safe to use as a directory name under the
/// deployments root.
///
/// Names are restricted to `[A-Za-z0-9._-]` with no leading dot, so a name
/// can never escape the deployments root or collide with hidden files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeploymentName(String);

impl DeploymentName {
    /// Derive the deployment name from a repository URL: the last path
    /// segment with a trailing `.git` suffix stripped.
    pub fn derive(repo_url: &str) -> Result<Self, HosterError> {
        let trimmed = repo_url.trim().trim_end_matches('/');
        let segment = trimmed.rsplit('/').next().unwrap_or_default();
        let segment = segment.rsplit(':').next().unwrap_or_default();
        let name = segment.strip_suffix(".git").unwrap_or(segment);
        Self::parse(name)
    }

    /// Validate a raw name (from a stop command or a directory scan).
    pub fn parse(raw: &str) -> Result<Self, HosterError> {
        let name = raw.trim();

        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(HosterError::BadCommand(format!("Invalid bot name: {raw}")));
        }
        if name.starts_with('.') {
            return Err(HosterError::BadCommand(format!("Invalid bot name: {raw}")));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
            return Err(HosterError::BadCommand(format!("Invalid bot name: {raw}")));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeploymentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DeploymentName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).map_err(|e| e.to_string())
    }
}

impl From<DeploymentName> for String {
    fn from(name: DeploymentName) -> Self {
        name.0
    }
}

/// Durable record linking a deployment name to its spawned process.
///
/// `started_at` is the OS-reported process start time captured at spawn.
/// It is compared against the live process before any signal is sent, so a
/// pid recycled by the OS for an unrelated process is never targeted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// OS process id of the spawned entry point
    pub pid:         u32,
    /// Process start time in unix seconds, as reported by the OS
    pub started_at:  i64,
    /// When the deploy operation recorded this entry
    pub deployed_at: DateTime<Utc>
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_from_https_url() {
        let name = DeploymentName::derive("https://example.com/owner/sample-bot.git").unwrap();
        assert_eq!(name.as_str(), "sample-bot");
    }

    #[test]
    fn derives_name_without_git_suffix() {
        let name = DeploymentName::derive("https://example.com/owner/sample-bot").unwrap();
        assert_eq!(name.as_str(), "sample-bot");
    }

    #[test]
    fn derives_name_from_trailing_slash_url() {
        let name = DeploymentName::derive("https://example.com/owner/sample-bot.git/").unwrap();
        assert_eq!(name.as_str(), "sample-bot");
    }

    #[test]
    fn derives_name_from_scp_style_url() {
        let name = DeploymentName::derive("git@example.com:sample-bot.git").unwrap();
        assert_eq!(name.as_str(), "sample-bot");
    }

    #[test]
    fn rejects_empty_name() {
        assert!(DeploymentName::derive("").is_err());
        assert!(DeploymentName::derive("https://example.com/.git").is_err());
        assert!(DeploymentName::parse("   ").is_err());
    }

    #[test]
    fn rejects_traversal_and_hidden_names() {
        assert!(DeploymentName::parse("..").is_err());
        assert!(DeploymentName::parse(".env").is_err());
        assert!(DeploymentName::parse("a/b").is_err());
        assert!(DeploymentName::parse("a b").is_err());
        assert!(DeploymentName::parse("name\u{0}").is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        let raw = "a".repeat(65);
        assert!(DeploymentName::parse(&raw).is_err());
        assert!(DeploymentName::parse(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn accepts_dots_dashes_and_underscores() {
        assert_eq!(DeploymentName::parse("my_bot-v1.2").unwrap().as_str(), "my_bot-v1.2");
    }
}
