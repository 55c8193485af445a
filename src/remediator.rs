//! Remediation boundary
//!
//! The restart action sits behind a narrow capability interface so the
//! control loop and its tests never depend on a real child process; the
//! production implementation execs the configured script and reports its
//! exit status.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{error, info};

/// Outcome of one remediation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationOutcome {
    Success,
    Failed,
}

/// Capability to invoke the external restart action.
#[async_trait]
pub trait Remediator: Send + Sync {
    /// Invoke the restart action and wait for it to finish.
    ///
    /// Implementations log the outcome themselves; a failure must never
    /// panic or abort the caller.
    async fn execute(&self) -> RemediationOutcome;
}

/// Runs a pre-configured executable with no arguments.
///
/// Exit status 0 is success; a non-zero exit or a launch failure both count
/// as [`RemediationOutcome::Failed`].
pub struct RestartScript {
    path: PathBuf,
}

impl RestartScript {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Remediator for RestartScript {
    async fn execute(&self) -> RemediationOutcome {
        match Command::new(&self.path).status().await {
            Ok(status) if status.success() => {
                info!("✅ restart script executed successfully");
                RemediationOutcome::Success
            }
            Ok(status) => {
                error!("❌ restart script exited with {status}");
                RemediationOutcome::Failed
            }
            Err(e) => {
                error!(
                    "❌ failed to launch restart script {}: {e}",
                    self.path.display()
                );
                RemediationOutcome::Failed
            }
        }
    }
}
