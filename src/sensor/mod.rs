// Sensor readers: one probe per metric behind a common trait.
// Probe output parsing lives next to each probe so a source can be swapped without
// touching the aggregator.

mod command;
mod native;
mod thermal;

pub use command::{CommandProbe, parse_first_float};
pub use native::{NativeCpu, NativeRam};
pub use thermal::{DEFAULT_THERMAL_ZONE, ThermalZone, parse_millidegrees};

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::models::MetricKind;

/// Why a single probe produced no value. Recovered locally by the aggregator.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to spawn probe `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("probe `{command}` exited with {status}: {stderr}")]
    ExitStatus {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("probe `{command}` produced no numeric output")]
    NoValue { command: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unparseable reading {raw:?} in {}", path.display())]
    Parse { path: PathBuf, raw: String },

    #[error("native probe: {0}")]
    Native(String),
}

/// A read-only probe for one metric.
#[async_trait]
pub trait SensorReader: Send + Sync {
    /// Short label for logs (e.g. "mpstat", "thermal_zone0").
    fn name(&self) -> &str;

    async fn read(&self) -> Result<f64, SensorError>;
}

/// Where CPU and RAM readings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorBackend {
    /// `mpstat` / `free` / `iostat` piped through awk.
    #[default]
    Shell,
    /// In-process CPU and RAM via sysinfo; I/O still comes from iostat.
    Native,
}

impl SensorBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shell" => Some(SensorBackend::Shell),
            "native" => Some(SensorBackend::Native),
            _ => None,
        }
    }
}

/// The four readers sampled on every sub-sample, in a fixed order.
pub struct SensorSet {
    pub cpu: Box<dyn SensorReader>,
    pub ram: Box<dyn SensorReader>,
    pub io: Box<dyn SensorReader>,
    pub temperature: Box<dyn SensorReader>,
}

impl SensorSet {
    pub fn new(
        cpu: Box<dyn SensorReader>,
        ram: Box<dyn SensorReader>,
        io: Box<dyn SensorReader>,
        temperature: Box<dyn SensorReader>,
    ) -> Self {
        Self {
            cpu,
            ram,
            io,
            temperature,
        }
    }

    /// Build the production readers for `backend`, reading temperature from `thermal_path`.
    pub fn for_backend(backend: SensorBackend, thermal_path: impl Into<PathBuf>) -> Self {
        let temperature = Box::new(ThermalZone::new(thermal_path));
        let io = Box::new(CommandProbe::io());
        match backend {
            SensorBackend::Shell => Self::new(
                Box::new(CommandProbe::cpu()),
                Box::new(CommandProbe::ram()),
                io,
                temperature,
            ),
            SensorBackend::Native => Self::new(
                Box::new(NativeCpu::new()),
                Box::new(NativeRam::new()),
                io,
                temperature,
            ),
        }
    }

    pub fn reader(&self, kind: MetricKind) -> &dyn SensorReader {
        match kind {
            MetricKind::Cpu => self.cpu.as_ref(),
            MetricKind::Ram => self.ram.as_ref(),
            MetricKind::Io => self.io.as_ref(),
            MetricKind::Temperature => self.temperature.as_ref(),
        }
    }
}
