// Shared test helpers: scripted sensors and an in-memory store
#![allow(dead_code)]

use async_trait::async_trait;
use hostlogger::models::AggregateRecord;
use hostlogger::sensor::{SensorError, SensorReader, SensorSet};
use hostlogger::store::{MetricStore, SchemaState, StoreError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Returns the scripted values in order (`None` = failed read), then a constant fallback.
pub struct ScriptedSensor {
    values: Mutex<VecDeque<Option<f64>>>,
    fallback: Option<f64>,
    calls: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl ScriptedSensor {
    pub fn new(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
            fallback: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn constant(value: f64) -> Self {
        Self {
            values: Mutex::new(VecDeque::new()),
            fallback: Some(value),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every read fails.
    pub fn failing() -> Self {
        Self::new(Vec::<Option<f64>>::new())
    }

    /// Instants (tokio clock) at which `read` was called.
    pub fn calls(&self) -> Arc<Mutex<Vec<tokio::time::Instant>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl SensorReader for ScriptedSensor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn read(&self) -> Result<f64, SensorError> {
        self.calls.lock().unwrap().push(tokio::time::Instant::now());
        let next = self.values.lock().unwrap().pop_front();
        match next {
            Some(Some(v)) => Ok(v),
            Some(None) => Err(SensorError::Native("scripted failure".into())),
            None => self
                .fallback
                .ok_or_else(|| SensorError::Native("script exhausted".into())),
        }
    }
}

pub fn constant_sensors(cpu: f64, ram: f64, io: f64, temperature: f64) -> SensorSet {
    SensorSet::new(
        Box::new(ScriptedSensor::constant(cpu)),
        Box::new(ScriptedSensor::constant(ram)),
        Box::new(ScriptedSensor::constant(io)),
        Box::new(ScriptedSensor::constant(temperature)),
    )
}

/// Keeps inserted records in memory. Inserts fail once `fail_after` records are stored.
pub struct MemoryStore {
    records: Mutex<Vec<AggregateRecord>>,
    fail_after: Option<usize>,
    insert_attempts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            fail_after: None,
            insert_attempts: AtomicUsize::new(0),
        })
    }

    pub fn failing_after(n: usize) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            fail_after: Some(n),
            insert_attempts: AtomicUsize::new(0),
        })
    }

    pub fn records(&self) -> Vec<AggregateRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn collection(&self) -> &str {
        "test"
    }

    async fn ensure_schema(&self) -> Result<SchemaState, StoreError> {
        Ok(SchemaState::AlreadyPresent)
    }

    async fn insert(&self, record: &AggregateRecord) -> Result<(), StoreError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        if self.fail_after.is_some_and(|n| records.len() >= n) {
            return Err(StoreError::Write("connection reset".into()));
        }
        records.push(record.clone());
        Ok(())
    }
}
