// Domain models: metric kinds, single readings, per-cycle aggregates, health status

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::sensor::SensorError;

/// The four metrics sampled every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cpu,
    Ram,
    Io,
    Temperature,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Cpu,
        MetricKind::Ram,
        MetricKind::Io,
        MetricKind::Temperature,
    ];

    /// Field name used in the persisted record.
    pub fn field_name(self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu_total",
            MetricKind::Ram => "ram",
            MetricKind::Io => "io_requests",
            MetricKind::Temperature => "temperature",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// One observation of one metric. Consumed by the aggregator, never persisted.
#[derive(Debug)]
pub struct Reading {
    pub kind: MetricKind,
    pub value: Result<f64, SensorError>,
    pub captured_at: DateTime<Utc>,
}

impl Reading {
    /// Value to accumulate: the reading itself, or NaN when the probe failed.
    pub fn value_or_nan(&self) -> f64 {
        match self.value {
            Ok(v) => v,
            Err(_) => f64::NAN,
        }
    }
}

/// One document per reporting cycle. NaN marks a metric whose cycle contained a failed reading.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateRecord {
    pub timestamp: DateTime<Utc>,
    pub cpu_total: f64,
    pub ram: f64,
    pub io_requests: f64,
    pub temperature: f64,
}

impl AggregateRecord {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Cpu => self.cpu_total,
            MetricKind::Ram => self.ram,
            MetricKind::Io => self.io_requests,
            MetricKind::Temperature => self.temperature,
        }
    }

    /// Metrics whose aggregate is NaN for this cycle.
    pub fn unreliable_metrics(&self) -> Vec<MetricKind> {
        MetricKind::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_nan())
            .collect()
    }
}

/// Outcome of the most recent persistence attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAIL")]
    Fail,
}

impl HealthStatus {
    pub fn from_success(success: bool) -> Self {
        if success {
            HealthStatus::Ok
        } else {
            HealthStatus::Fail
        }
    }

    /// Literal text written to the health file.
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Ok => "OK",
            HealthStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
