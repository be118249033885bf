// Health reporter: latest persistence outcome, held in a state cell and mirrored to a file
// that external liveness probes poll. Only the most recent value is kept.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::models::HealthStatus;

pub const DEFAULT_HEALTH_PATH: &str = "/tmp/health_status";

const PENDING: u8 = 0;
const OK: u8 = 1;
const FAIL: u8 = 2;

/// Read-only view of the reporter's state, cheap to clone into HTTP handlers.
#[derive(Debug, Clone)]
pub struct HealthHandle {
    state: Arc<AtomicU8>,
}

impl HealthHandle {
    /// `None` until the first cycle has reported.
    pub fn status(&self) -> Option<HealthStatus> {
        match self.state.load(Ordering::Acquire) {
            OK => Some(HealthStatus::Ok),
            FAIL => Some(HealthStatus::Fail),
            _ => None,
        }
    }
}

pub struct HealthReporter {
    state: Arc<AtomicU8>,
    path: Option<PathBuf>,
}

impl HealthReporter {
    /// Reporter that mirrors every status to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
            path: Some(path.into()),
        }
    }

    /// Reporter with no file projection (state cell only).
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
            path: None,
        }
    }

    pub fn handle(&self) -> HealthHandle {
        HealthHandle {
            state: self.state.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn status(&self) -> Option<HealthStatus> {
        self.handle().status()
    }

    /// Overwrite the status with the outcome of the latest insert. Never fails:
    /// a file write error is logged and dropped.
    pub async fn report(&self, success: bool) {
        let status = HealthStatus::from_success(success);
        let raw = match status {
            HealthStatus::Ok => OK,
            HealthStatus::Fail => FAIL,
        };
        self.state.store(raw, Ordering::Release);

        if let Some(path) = &self.path
            && let Err(e) = tokio::fs::write(path, status.as_str()).await
        {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                operation = "write_health_status",
                "failed to write health status"
            );
        }
        tracing::debug!(status = %status, "health status reported");
    }
}
