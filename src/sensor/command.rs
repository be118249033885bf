// Shell probes: run a text-producing command and take the first numeric line.

use async_trait::async_trait;
use tokio::process::Command;

use super::{SensorError, SensorReader};

const CPU_COMMAND: &str = "mpstat 1 1 | awk '/^Average/ {print 100 - $NF}'";
const RAM_COMMAND: &str = "free | awk '/Mem:/ {printf \"%.2f\", $3/$2 * 100.0}'";
const IO_COMMAND: &str = "iostat -d 1 2 | awk '/Device/ {report++} report==2 && /^[^ ]/ && !/Device:/ {sum += $2} END{print sum}'";

pub struct CommandProbe {
    name: String,
    command: String,
}

impl CommandProbe {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }

    /// Total CPU utilisation in percent (100 - idle) over a one second mpstat window.
    pub fn cpu() -> Self {
        Self::new("mpstat", CPU_COMMAND)
    }

    /// Used memory as a percentage of total.
    pub fn ram() -> Self {
        Self::new("free", RAM_COMMAND)
    }

    /// Transfers per second summed over all devices, from the second iostat report.
    pub fn io() -> Self {
        Self::new("iostat", IO_COMMAND)
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl SensorReader for CommandProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<f64, SensorError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SensorError::Spawn {
                command: self.name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SensorError::ExitStatus {
                command: self.name.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_first_float(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            SensorError::NoValue {
                command: self.name.clone(),
            }
        })
    }
}

/// First line of `text` that parses as a finite float.
pub fn parse_first_float(text: &str) -> Option<f64> {
    text.lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .find(|v| v.is_finite())
}
