// Sample aggregator: N sub-samples of every sensor, averaged per metric.
// A failed reading adds NaN to its metric's sum, so one failure makes that metric's
// cycle mean NaN while the other metrics are unaffected.

use chrono::Utc;
use std::time::Duration;

use crate::models::{AggregateRecord, MetricKind, Reading};
use crate::sensor::SensorSet;

/// Running per-metric sums for one cycle.
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    cpu_total: f64,
    ram: f64,
    io_requests: f64,
    temperature: f64,
}

impl Accumulator {
    fn add(&mut self, reading: &Reading) {
        let v = reading.value_or_nan();
        match reading.kind {
            MetricKind::Cpu => self.cpu_total += v,
            MetricKind::Ram => self.ram += v,
            MetricKind::Io => self.io_requests += v,
            MetricKind::Temperature => self.temperature += v,
        }
    }

    fn mean(self, num_samples: u32) -> AggregateRecord {
        let n = num_samples as f64;
        AggregateRecord {
            timestamp: Utc::now(),
            cpu_total: self.cpu_total / n,
            ram: self.ram / n,
            io_requests: self.io_requests / n,
            temperature: self.temperature / n,
        }
    }
}

/// Read every sensor once, in metric order. Failures are returned inside the readings.
pub async fn sample_once(sensors: &SensorSet) -> Vec<Reading> {
    let mut readings = Vec::with_capacity(MetricKind::ALL.len());
    for kind in MetricKind::ALL {
        let reader = sensors.reader(kind);
        let value = reader.read().await;
        match &value {
            Ok(v) => tracing::debug!(metric = %kind, sensor = reader.name(), value = v, "reading"),
            Err(e) => tracing::warn!(
                metric = %kind,
                sensor = reader.name(),
                error = %e,
                "sensor read failed"
            ),
        }
        readings.push(Reading {
            kind,
            value,
            captured_at: Utc::now(),
        });
    }
    readings
}

/// Take `num_samples` sub-samples `interval` apart and average them into one record.
/// No delay follows the final sub-sample; the record is stamped when it is assembled.
pub async fn collect(sensors: &SensorSet, num_samples: u32, interval: Duration) -> AggregateRecord {
    let num_samples = num_samples.max(1);
    let mut acc = Accumulator::default();

    for i in 0..num_samples {
        for reading in sample_once(sensors).await {
            acc.add(&reading);
        }
        if i + 1 < num_samples {
            tokio::time::sleep(interval).await;
        }
    }

    acc.mean(num_samples)
}
