//! Ingestion service for upstream open-data feeds
//!
//! Pulls the Montpellier eco-counter catalogue and per-counter timeseries,
//! plus hourly weather for the metro area, into the local store. Sync is
//! incremental: each counter resumes from its latest stored reading.
//! A failing counter never aborts the pass; errors are logged and the
//! remaining counters still sync.

mod counters;
mod weather;

pub use counters::{CounterMeta, parse_catalogue, parse_timeseries};
pub use weather::parse_hourly_weather;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::config::IngestConfig;
use crate::core::constants::{
    INGEST_HTTP_TIMEOUT_SECS, MIN_INGEST_INTERVAL_MINUTES, MONTPELLIER_LATITUDE,
    MONTPELLIER_LONGITUDE, WEATHER_ZONE_MONTPELLIER,
};
use crate::data::sqlite::repositories::{counters as counter_repo, readings, weather as weather_repo};
use crate::data::sqlite::{SqliteError, SqliteService};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Database error: {0}")]
    Database(#[from] SqliteError),
    #[error("Failed to parse upstream payload: {0}")]
    Parse(String),
}

/// Outcome of one full sync pass, for logging and the CLI one-shot
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncReport {
    pub counters_seen: usize,
    pub counters_failed: usize,
    pub readings_inserted: u64,
    pub weather_rows: u64,
}

/// Background ingestion service
pub struct IngestService {
    http: reqwest::Client,
    database: Arc<SqliteService>,
    config: IngestConfig,
}

impl IngestService {
    pub fn new(database: Arc<SqliteService>, config: IngestConfig) -> Result<Arc<Self>, IngestError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(INGEST_HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Arc::new(Self {
            http,
            database,
            config,
        }))
    }

    /// One full sync pass: catalogue, per-counter timeseries, weather
    pub async fn sync(&self) -> SyncReport {
        let mut report = SyncReport::default();

        let catalogue = match self.fetch_catalogue().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Counter catalogue fetch failed, skipping pass");
                return report;
            }
        };
        report.counters_seen = catalogue.len();

        let now = chrono::Utc::now().timestamp();
        for meta in &catalogue {
            if let Err(e) = self.sync_counter(meta, now, &mut report).await {
                report.counters_failed += 1;
                tracing::warn!(counter = %meta.id, error = %e, "Counter sync failed");
            }
        }

        match counter_repo::mark_stale_inactive(self.database.pool(), now).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(count = n, "Marked stale counters inactive"),
            Err(e) => tracing::warn!(error = %e, "Stale counter sweep failed"),
        }

        match self.sync_weather().await {
            Ok(rows) => report.weather_rows = rows,
            Err(e) => tracing::warn!(error = %e, "Weather sync failed"),
        }

        tracing::info!(
            counters = report.counters_seen,
            failed = report.counters_failed,
            readings = report.readings_inserted,
            weather = report.weather_rows,
            "Ingest pass complete"
        );
        report
    }

    async fn fetch_catalogue(&self) -> Result<Vec<CounterMeta>, IngestError> {
        let body = self
            .http
            .get(&self.config.counters_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_catalogue(&body)
    }

    async fn sync_counter(
        &self,
        meta: &CounterMeta,
        now: i64,
        report: &mut SyncReport,
    ) -> Result<(), IngestError> {
        counter_repo::upsert_counter(
            self.database.pool(),
            &meta.id,
            &meta.name,
            meta.latitude,
            meta.longitude,
            meta.serial.as_deref(),
            now,
        )
        .await?;

        // Resume after the newest stored reading; first sync backfills
        let from = match readings::latest_timestamp(self.database.pool(), &meta.id).await? {
            Some(latest) => latest + 1,
            None => now - (self.config.backfill_days as i64) * 86_400,
        };

        let fmt = "%Y-%m-%dT%H:%M:%S";
        let url = format!(
            "{}/{}/attrs/intensity?fromDate={}&toDate={}",
            self.config.timeseries_url,
            meta.id,
            crate::utils::time::secs_to_datetime(from).format(fmt),
            crate::utils::time::secs_to_datetime(now).format(fmt),
        );
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let rows = parse_timeseries(&body)?;
        let inserted = readings::insert_readings(self.database.pool(), &meta.id, &rows).await?;
        report.readings_inserted += inserted;

        tracing::debug!(counter = %meta.id, fetched = rows.len(), inserted, "Counter synced");
        Ok(())
    }

    async fn sync_weather(&self) -> Result<u64, IngestError> {
        let url = format!(
            "{}?latitude={}&longitude={}&hourly=temperature_2m,precipitation&past_days=2&timezone=UTC",
            self.config.weather_url, MONTPELLIER_LATITUDE, MONTPELLIER_LONGITUDE
        );
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let rows = parse_hourly_weather(&body)?;
        let written =
            weather_repo::upsert_weather(self.database.pool(), WEATHER_ZONE_MONTPELLIER, &rows)
                .await?;
        Ok(written)
    }

    /// Start the periodic sync task
    ///
    /// Returns `None` when ingestion is disabled. The first pass runs
    /// immediately; subsequent passes follow the configured interval,
    /// clamped to the minimum.
    pub fn start_sync_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            tracing::info!("Ingestion disabled");
            return None;
        }

        let minutes = self.config.interval_minutes.max(MIN_INGEST_INTERVAL_MINUTES);
        let interval = Duration::from_secs(minutes.saturating_mul(60));
        let service = Arc::clone(self);

        Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("Ingest task shutting down");
                            break;
                        }
                    }
                    _ = timer.tick() => {
                        service.sync().await;
                    }
                }
            }
        }))
    }
}
