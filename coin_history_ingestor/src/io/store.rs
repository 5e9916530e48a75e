//! Loads fetched payloads into the relational store.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use coin_store::{
    DayWrite, NewDayRecord, StoreConnection, StoreError,
    db::migrate,
    repo::record_day,
};
use snafu::{OptionExt, ResultExt};
use tracing::info;

use crate::{
    io::sink::{PayloadSink, PriceMissingSnafu, SerializeSnafu, SinkError, StoreSnafu, TaskJoinSnafu},
    models::{
        job::FetchJob,
        payload::{REFERENCE_CURRENCY, RawPayload},
    },
};

/// Writes day records and month aggregates through one shared connection.
///
/// Diesel connections are blocking, so each write runs on the blocking pool while
/// holding the connection lock. Writes are therefore serialized.
#[derive(Clone)]
pub struct StoreSink {
    conn: Arc<Mutex<StoreConnection>>,
}

impl StoreSink {
    pub fn new(conn: StoreConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Connects to `database_url` and applies pending migrations.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let mut conn = StoreConnection::establish(database_url)?;
        migrate::run_pending(&mut conn)?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl PayloadSink for StoreSink {
    type Output = DayWrite;

    async fn write(&self, job: &FetchJob, payload: &RawPayload) -> Result<DayWrite, SinkError> {
        let price = payload
            .current_price(REFERENCE_CURRENCY)
            .context(PriceMissingSnafu {
                currency: REFERENCE_CURRENCY,
            })?;
        let json = serde_json::to_string(payload).context(SerializeSnafu)?;

        let conn = Arc::clone(&self.conn);
        let coin = job.coin().to_owned();
        let date = job.date();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            record_day(
                &mut conn,
                &NewDayRecord {
                    coin: &coin,
                    date,
                    price,
                    json: &json,
                },
            )
        })
        .await
        .context(TaskJoinSnafu)?
        .context(StoreSnafu)?;

        match outcome {
            DayWrite::Inserted => {
                info!(coin = job.coin(), date = %date, price, "Data loaded to database");
            }
            DayWrite::Duplicate => {
                info!(coin = job.coin(), date = %date, "Day already stored, kept first price, month bounds updated");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use coin_store::repo::{day_record, month_aggregate};
    use serde_json::json;

    use super::*;

    fn payload(price: f64) -> RawPayload {
        RawPayload::new(json!({ "market_data": { "current_price": { "usd": price } } }))
    }

    fn open(dir: &tempfile::TempDir) -> (String, StoreSink) {
        let url = format!("sqlite://{}", dir.path().join("coins.db").display());
        let sink = StoreSink::connect(&url).unwrap();
        (url, sink)
    }

    #[tokio::test]
    async fn stores_price_and_reports_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let (url, sink) = open(&dir);
        let job = FetchJob::new("bitcoin", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());

        assert_eq!(sink.write(&job, &payload(29_000.0)).await.unwrap(), DayWrite::Inserted);
        assert_eq!(sink.write(&job, &payload(1.0)).await.unwrap(), DayWrite::Duplicate);

        let mut conn = StoreConnection::establish(&url).unwrap();
        let row = day_record(&mut conn, "bitcoin", job.date()).unwrap().unwrap();
        assert_eq!(row.price, 29_000.0);
        let agg = month_aggregate(&mut conn, "bitcoin", 2021, 1).unwrap().unwrap();
        assert_eq!((agg.min_price, agg.max_price), (1.0, 29_000.0));
    }

    #[tokio::test]
    async fn payload_without_price_is_rejected_before_touching_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let (url, sink) = open(&dir);
        let job = FetchJob::new("bitcoin", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());

        let err = sink
            .write(&job, &RawPayload::new(json!({ "id": "bitcoin" })))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::PriceMissing { .. }), "{err}");

        let mut conn = StoreConnection::establish(&url).unwrap();
        assert!(day_record(&mut conn, "bitcoin", job.date()).unwrap().is_none());
    }
}
