// Cycle scheduler: Sampling (collect -> insert -> health) then Idle, until shutdown.
// Shutdown is honored while sampling and while idle; an abandoned cycle writes nothing.
// A failed insert marks health FAIL and ends the loop with the error.

use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::instrument;

use crate::aggregator;
use crate::config::SamplingConfig;
use crate::health::{HealthHandle, HealthReporter};
use crate::models::AggregateRecord;
use crate::sensor::SensorSet;
use crate::store::{MetricStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Sampling,
    Idle,
}

pub struct CycleScheduler {
    sensors: SensorSet,
    store: Arc<dyn MetricStore>,
    health: HealthReporter,
    sampling: SamplingConfig,
}

impl CycleScheduler {
    pub fn new(
        sensors: SensorSet,
        store: Arc<dyn MetricStore>,
        health: HealthReporter,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            sensors,
            store,
            health,
            sampling,
        }
    }

    pub fn health(&self) -> HealthHandle {
        self.health.handle()
    }

    /// One full Sampling pass.
    pub async fn run_cycle(&self) -> Result<AggregateRecord, StoreError> {
        let record = self.collect().await;
        self.persist(record).await
    }

    async fn collect(&self) -> AggregateRecord {
        aggregator::collect(
            &self.sensors,
            self.sampling.num_samples,
            self.sampling.sample_interval(),
        )
        .await
    }

    /// Insert and report the outcome. Not cancelled by shutdown once started.
    async fn persist(&self, record: AggregateRecord) -> Result<AggregateRecord, StoreError> {
        let result = self.store.insert(&record).await;
        self.health.report(result.is_ok()).await;
        result.map(|()| record)
    }

    /// Alternate Sampling and Idle until `shutdown_rx` fires (returns the number of stored
    /// records) or an insert fails (returns the error after health is set to FAIL).
    #[instrument(
        skip_all,
        fields(
            store = self.store.backend(),
            collection = self.store.collection(),
            num_samples = self.sampling.num_samples,
            sample_interval_secs = self.sampling.sample_interval_secs,
            sleep_duration_secs = self.sampling.sleep_duration_secs,
        )
    )]
    pub async fn run(&self, mut shutdown_rx: oneshot::Receiver<()>) -> Result<u64, StoreError> {
        let mut stored: u64 = 0;
        let mut state = CycleState::Sampling;

        loop {
            match state {
                CycleState::Sampling => {
                    let record = tokio::select! {
                        record = self.collect() => record,
                        _ = &mut shutdown_rx => {
                            tracing::info!("shutdown while sampling; cycle abandoned");
                            return Ok(stored);
                        }
                    };
                    match self.persist(record).await {
                        Ok(record) => {
                            stored += 1;
                            tracing::info!(
                                cpu_total = record.cpu_total,
                                ram = record.ram,
                                io_requests = record.io_requests,
                                temperature = record.temperature,
                                unreliable = ?record.unreliable_metrics(),
                                "record stored"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, operation = "insert", "persisting record failed");
                            return Err(e);
                        }
                    }
                    state = CycleState::Idle;
                }
                CycleState::Idle => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.sampling.sleep_duration()) => {}
                        _ = &mut shutdown_rx => {
                            tracing::info!("shutdown while idle");
                            return Ok(stored);
                        }
                    }
                    state = CycleState::Sampling;
                }
            }
        }
    }
}
