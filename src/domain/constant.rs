//! Domain Events - Structured events for internal monitoring and debugging

/// Guardian Actor Events
pub mod guardian {
    pub const GUARDIAN_STARTED: &str = "guardian.started";
    pub const CHILDREN_SPAWNING: &str = "children.spawning";
    pub const CHILDREN_SPAWNED: &str = "children.spawned";
    pub const CHILDREN_SPAWN_FAILED: &str = "children.spawn_failed";
    pub const SYSTEM_INITIALIZED: &str = "system.initialized";
    pub const SYSTEM_SHUTDOWN_STARTED: &str = "system.shutdown_started";
    pub const SYSTEM_SHUTDOWN_COMPLETED: &str = "system.shutdown_completed";
    pub const HEALTH_CHECK_COMPLETED: &str = "health.check_completed";
    pub const COMMAND_SUBMITTED: &str = "command.submitted";
}

/// DeploymentManager Actor Events
pub mod deployment_manager {
    pub const MANAGER_STARTED: &str = "manager.started";
    pub const COMMAND_SUBMITTED: &str = "command.submitted";
    pub const SWEEP_STARTED: &str = "registry.sweep_started";
    pub const SWEEP_ENTRY_DROPPED: &str = "registry.sweep_entry_dropped";
    pub const SWEEP_COMPLETED: &str = "registry.sweep_completed";
    pub const PROCESSOR_SPAWNED: &str = "processor.spawned";
    pub const PROCESSOR_SPAWN_FAILED: &str = "processor.spawn_failed";
}

/// CommandProcessor Actor Events
pub mod command_processor {
    pub const PROCESSOR_STARTED: &str = "processor.started";
    pub const COMMAND_RECEIVED: &str = "command.received";
    pub const COMMAND_PROCESSED: &str = "command.processed";
    pub const COMMAND_FAILED: &str = "command.failed";
}

/// Command Engine Events
pub mod engine {
    pub const COMMAND_EXECUTED: &str = "command.executed";
    pub const COMMAND_REJECTED: &str = "command.rejected";
    pub const AUDIT_WRITE_FAILED: &str = "audit.write_failed";
}

/// Process Host Events
pub mod process_host {
    pub const DEPENDENCIES_INSTALLING: &str = "dependencies.installing";
    pub const DEPENDENCIES_SKIPPED: &str = "dependencies.skipped";
    pub const PROCESS_SPAWNED: &str = "process.spawned";
    pub const PROCESS_EXITED: &str = "process.exited";
    pub const PROCESS_KILLED: &str = "process.killed";
    pub const STALE_PID_SKIPPED: &str = "process.stale_pid_skipped";
}

/// Health Endpoint Events
pub mod health {
    pub const SERVER_STARTED: &str = "health.server_started";
    pub const SERVER_STOPPED: &str = "health.server_stopped";
}

/// Command Gateway Events
pub mod gateway {
    pub const LINE_IGNORED: &str = "gateway.line_ignored";
    pub const REPLY_SENT: &str = "gateway.reply_sent";
}
