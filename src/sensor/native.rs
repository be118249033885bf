// In-process CPU and RAM probes via sysinfo (no external utilities required).

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use sysinfo::System;
use tracing::instrument;

use super::{SensorError, SensorReader};

pub struct NativeCpu {
    sys: Arc<Mutex<System>>,
}

impl Default for NativeCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeCpu {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        Self {
            sys: Arc::new(Mutex::new(sys)),
        }
    }
}

#[async_trait]
impl SensorReader for NativeCpu {
    fn name(&self) -> &str {
        "sysinfo-cpu"
    }

    #[instrument(skip(self), fields(sensor = "sysinfo-cpu"))]
    async fn read(&self) -> Result<f64, SensorError> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| SensorError::Native(format!("sysinfo lock poisoned: {}", e)))?;
            // Usage is a delta between two refreshes at least MINIMUM_CPU_UPDATE_INTERVAL apart.
            sys.refresh_cpu_usage();
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            sys.refresh_cpu_usage();
            Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
        })
        .await
        .map_err(|e| SensorError::Native(format!("sysinfo task join: {}", e)))?
    }
}

pub struct NativeRam {
    sys: Arc<Mutex<System>>,
}

impl Default for NativeRam {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRam {
    pub fn new() -> Self {
        Self {
            sys: Arc::new(Mutex::new(System::new())),
        }
    }
}

#[async_trait]
impl SensorReader for NativeRam {
    fn name(&self) -> &str {
        "sysinfo-ram"
    }

    #[instrument(skip(self), fields(sensor = "sysinfo-ram"))]
    async fn read(&self) -> Result<f64, SensorError> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| SensorError::Native(format!("sysinfo lock poisoned: {}", e)))?;
            sys.refresh_memory();

            let total = sys.total_memory();
            if total == 0 {
                return Err(SensorError::Native("total memory reported as 0".into()));
            }
            let used = total.saturating_sub(sys.available_memory());
            Ok((used as f64 / total as f64) * 100.0)
        })
        .await
        .map_err(|e| SensorError::Native(format!("sysinfo task join: {}", e)))?
    }
}
