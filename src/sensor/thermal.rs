// Thermal zone probe: sysfs exposes temperature as an integer in millidegrees Celsius.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{SensorError, SensorReader};

pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

pub struct ThermalZone {
    path: PathBuf,
    name: String,
}

impl ThermalZone {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        // ".../thermal_zone0/temp" -> "thermal_zone0"
        let name = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SensorReader for ThermalZone {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<f64, SensorError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SensorError::Read {
                path: self.path.clone(),
                source,
            })?;
        parse_millidegrees(&raw).ok_or_else(|| SensorError::Parse {
            path: self.path.clone(),
            raw: raw.trim().to_string(),
        })
    }
}

/// Parse a millidegree integer (e.g. "48312\n") into degrees Celsius.
pub fn parse_millidegrees(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .map(|milli| milli as f64 / 1000.0)
}
