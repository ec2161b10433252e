//! Tokio/nix implementation of the process host
//!
//! Children are spawned detached with their output tied to the per-deployment
//! log file. Liveness and termination go through the recorded pid, guarded by
//! the process start time so a pid recycled by the OS for an unrelated
//! process is never signaled.

use std::{path::Path, process::Stdio, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{process::Command, time};
use tracing::{Level, event};

use crate::{
    config::Settings,
    domain::{constant::process_host, deployment::ProcessRecord, error::HosterError}
};

/// How much installer stderr to carry into the error reply
const STDERR_TAIL: usize = 400;

/// Tolerated drift between recorded and observed start time, in seconds
const START_TIME_TOLERANCE: i64 = 1;

/// Query the OS-reported start time (unix seconds) for a pid.
#[cfg(unix)]
fn process_start_time(pid: u32) -> Option<i64> {
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

    let mut sys = System::new();
    let sysinfo_pid = Pid::from_u32(pid);
    sys.refresh_processes_specifics(ProcessesToUpdate::Some(&[sysinfo_pid]), false, ProcessRefreshKind::nothing());
    sys.process(sysinfo_pid).map(|p| p.start_time() as i64)
}

fn parse_argv(raw: &str, what: &str) -> Result<Vec<String>, HosterError> {
    let argv: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        return Err(HosterError::Configuration(format!("Empty {what} command")));
    }
    Ok(argv)
}

/// Process host backed by tokio::process and signal delivery via nix
pub struct TokioProcessHost {
    manifest_file:   String,
    install_argv:    Vec<String>,
    entry_argv:      Vec<String>,
    install_timeout: Duration,
    spawn_timeout:   Duration
}

impl TokioProcessHost {
    pub fn from_settings(settings: &Settings) -> Result<Self, HosterError> {
        Ok(Self {
            manifest_file:   settings.manifest_file.clone(),
            install_argv:    parse_argv(&settings.install_command, "install")?,
            entry_argv:      parse_argv(&settings.entry_command, "entry")?,
            install_timeout: Duration::from_secs(settings.install_timeout_secs),
            spawn_timeout:   Duration::from_secs(settings.spawn_timeout_secs)
        })
    }
}

#[async_trait]
impl crate::port::process::ProcessHost for TokioProcessHost {
    async fn install(&self, dir: &Path) -> Result<(), HosterError> {
        if !dir.join(&self.manifest_file).exists() {
            event!(Level::DEBUG, event = process_host::DEPENDENCIES_SKIPPED,
                   dir = %dir.display(), manifest = %self.manifest_file);
            return Ok(());
        }

        event!(Level::INFO, event = process_host::DEPENDENCIES_INSTALLING, dir = %dir.display());

        let output = Command::new(&self.install_argv[0])
            .args(&self.install_argv[1..])
            .current_dir(dir)
            .output();

        let output = match time::timeout(self.install_timeout, output).await {
            Ok(result) => {
                result.map_err(|e| HosterError::DependencyInstall(format!("Failed to run installer: {e}")))?
            }
            Err(_) => {
                return Err(HosterError::Timeout(format!(
                    "Dependency install did not finish within {}s",
                    self.install_timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail_start = stderr.len().saturating_sub(STDERR_TAIL);
            let tail = stderr.get(tail_start..).unwrap_or(&stderr).trim();
            return Err(HosterError::DependencyInstall(format!("Installer exited with {}: {tail}", output.status)));
        }

        Ok(())
    }

    async fn launch(&self, dir: &Path, log_file: &Path) -> Result<ProcessRecord, HosterError> {
        let spawn = async {
            // The log file stays open as the child's stdout/stderr for its
            // whole lifetime; the manager keeps no handle to it.
            let log = std::fs::File::create(log_file)
                .map_err(|e| HosterError::SpawnFailed(format!("Failed to create log file: {e}")))?;
            let log_err = log
                .try_clone()
                .map_err(|e| HosterError::SpawnFailed(format!("Failed to clone log handle: {e}")))?;

            let mut child = Command::new(&self.entry_argv[0])
                .args(&self.entry_argv[1..])
                .current_dir(dir)
                .stdin(Stdio::null())
                .stdout(Stdio::from(log))
                .stderr(Stdio::from(log_err))
                .spawn()
                .map_err(|e| HosterError::SpawnFailed(format!("Failed to spawn entry point: {e}")))?;

            let pid = child
                .id()
                .ok_or_else(|| HosterError::SpawnFailed("Spawned process exited before a pid was assigned".to_string()))?;

            #[cfg(unix)]
            let started_at = process_start_time(pid).unwrap_or_else(|| Utc::now().timestamp());
            #[cfg(not(unix))]
            let started_at = Utc::now().timestamp();

            event!(Level::INFO, event = process_host::PROCESS_SPAWNED, pid = %pid, dir = %dir.display());

            // Reap the child when it exits so it never lingers as a zombie.
            tokio::spawn(async move {
                match child.wait().await {
                    Ok(status) => {
                        event!(Level::INFO, event = process_host::PROCESS_EXITED, pid = %pid, status = %status)
                    }
                    Err(e) => event!(Level::WARN, event = process_host::PROCESS_EXITED, pid = %pid, error = %e)
                }
            });

            Ok(ProcessRecord { pid, started_at, deployed_at: Utc::now() })
        };

        match time::timeout(self.spawn_timeout, spawn).await {
            Ok(result) => result,
            Err(_) => Err(HosterError::Timeout(format!(
                "Spawn did not finish within {}s",
                self.spawn_timeout.as_secs()
            )))
        }
    }

    async fn terminate(&self, record: &ProcessRecord) -> Result<(), HosterError> {
        #[cfg(unix)]
        {
            use nix::{
                errno::Errno,
                sys::signal::{Signal, kill},
                unistd::Pid
            };

            // A dead pid or one recycled by an unrelated process counts as
            // already stopped; removal of the registry entry proceeds.
            if !self.probe(record) {
                event!(Level::DEBUG, event = process_host::STALE_PID_SKIPPED, pid = %record.pid);
                return Ok(());
            }

            match kill(Pid::from_raw(record.pid as i32), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {
                    event!(Level::INFO, event = process_host::PROCESS_KILLED, pid = %record.pid);
                    Ok(())
                }
                Err(e) => {
                    Err(HosterError::ProcessControl(format!("Failed to signal pid {}: {e}", record.pid)))
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = record;
            Err(HosterError::ProcessControl("Process termination is not supported on this platform".to_string()))
        }
    }

    fn probe(&self, record: &ProcessRecord) -> bool {
        #[cfg(unix)]
        {
            use nix::{sys::signal::kill, unistd::Pid};

            // Signal 0 probes existence without touching the process.
            if kill(Pid::from_raw(record.pid as i32), None).is_err() {
                return false;
            }

            // Start-time check guards against pid reuse.
            match process_start_time(record.pid) {
                Some(actual) => (actual - record.started_at).abs() <= START_TIME_TOLERANCE,
                None => false
            }
        }

        #[cfg(not(unix))]
        {
            let _ = record;
            false
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::port::process::ProcessHost;

    fn host(install: &str, entry: &str) -> TokioProcessHost {
        let mut settings = Settings::for_tests(PathBuf::from("."));
        settings.install_command = install.to_string();
        settings.entry_command = entry.to_string();
        TokioProcessHost::from_settings(&settings).unwrap()
    }

    #[test]
    fn empty_commands_are_rejected_at_construction() {
        let mut settings = Settings::for_tests(PathBuf::from("."));
        settings.entry_command = "   ".to_string();
        assert!(TokioProcessHost::from_settings(&settings).is_err());
    }

    #[tokio::test]
    async fn install_skips_when_manifest_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        // "false" would fail if it ran; skipping means Ok
        host("false", "sleep 30").install(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn failing_installer_aborts_with_dependency_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "something\n").unwrap();

        let err = host("false", "sleep 30").install(dir.path()).await.unwrap_err();
        assert!(matches!(err, HosterError::DependencyInstall(_)));
    }

    #[tokio::test]
    async fn succeeding_installer_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "something\n").unwrap();

        host("true", "sleep 30").install(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn launch_probe_terminate_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("logs.txt");
        let h = host("true", "sleep 30");

        let record = h.launch(dir.path(), &log_file).await.unwrap();
        assert!(log_file.exists());
        assert!(h.probe(&record));

        h.terminate(&record).await.unwrap();

        // SIGKILL plus reaping is asynchronous; poll briefly.
        for _ in 0..40 {
            if !h.probe(&record) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("process {} still alive after terminate", record.pid);
    }

    #[tokio::test]
    async fn probe_rejects_recycled_pid() {
        let own_pid = std::process::id();
        let actual = process_start_time(own_pid).unwrap();

        let live = ProcessRecord { pid: own_pid, started_at: actual, deployed_at: Utc::now() };
        let recycled = ProcessRecord { pid: own_pid, started_at: actual - 3600, deployed_at: Utc::now() };

        let h = host("true", "sleep 30");
        assert!(h.probe(&live));
        assert!(!h.probe(&recycled));
    }

    #[tokio::test]
    async fn terminate_on_dead_pid_is_success() {
        let h = host("true", "sleep 30");
        let record = ProcessRecord { pid: 4_000_000, started_at: 0, deployed_at: Utc::now() };
        h.terminate(&record).await.unwrap();
    }

    #[tokio::test]
    async fn failing_entry_point_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let h = host("true", "/nonexistent-entry-point");
        let err = h.launch(dir.path(), &dir.path().join("logs.txt")).await.unwrap_err();
        assert!(matches!(err, HosterError::SpawnFailed(_)));
    }
}
