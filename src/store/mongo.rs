// MongoDB backend: time-series collection keyed on `timestamp`.

use async_trait::async_trait;
use mongodb::bson::{self, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::TimeseriesOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::instrument;

use super::{MetricStore, SchemaState, StoreError, TIME_FIELD};
use crate::models::AggregateRecord;

/// Server error code for "collection already exists".
const NAMESPACE_EXISTS: i32 = 48;

pub struct MongoStore {
    db: Database,
    collection: String,
    records: Collection<Document>,
}

impl MongoStore {
    /// Connect and ping, so an unreachable server fails at startup rather than on the first insert.
    #[instrument(skip(uri), fields(store = "mongodb", operation = "connect"))]
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(StoreError::connect)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::connect)?;
        let records = db.collection::<Document>(collection);
        Ok(Self {
            db,
            collection: collection.to_string(),
            records,
        })
    }

    /// BSON shape of one aggregate record. NaN fields stay BSON doubles.
    pub fn document(record: &AggregateRecord) -> Document {
        doc! {
            "timestamp": bson::DateTime::from_millis(record.timestamp.timestamp_millis()),
            "cpu_total": record.cpu_total,
            "ram": record.ram,
            "io_requests": record.io_requests,
            "temperature": record.temperature,
        }
    }
}

fn is_namespace_exists(e: &mongodb::error::Error) -> bool {
    matches!(e.kind.as_ref(), ErrorKind::Command(c) if c.code == NAMESPACE_EXISTS)
}

#[async_trait]
impl MetricStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    #[instrument(skip(self), fields(store = "mongodb", operation = "ensure_schema", collection = %self.collection))]
    async fn ensure_schema(&self) -> Result<SchemaState, StoreError> {
        let existing = self
            .db
            .list_collection_names()
            .filter(doc! { "name": self.collection.as_str() })
            .await
            .map_err(StoreError::schema)?;
        if !existing.is_empty() {
            return Ok(SchemaState::AlreadyPresent);
        }

        let timeseries = TimeseriesOptions::builder()
            .time_field(TIME_FIELD.to_string())
            .build();
        match self
            .db
            .create_collection(&self.collection)
            .timeseries(timeseries)
            .await
        {
            Ok(()) => {}
            // Another instance created it between the listing and the create.
            Err(e) if is_namespace_exists(&e) => return Ok(SchemaState::AlreadyPresent),
            Err(e) => return Err(StoreError::schema(e)),
        }

        let index = IndexModel::builder()
            .keys(doc! { "timestamp": 1 })
            .build();
        self.records
            .create_index(index)
            .await
            .map_err(StoreError::schema)?;
        Ok(SchemaState::Created)
    }

    #[instrument(skip(self, record), fields(store = "mongodb", operation = "insert"))]
    async fn insert(&self, record: &AggregateRecord) -> Result<(), StoreError> {
        self.records
            .insert_one(Self::document(record))
            .await
            .map_err(StoreError::write)?;
        Ok(())
    }
}
