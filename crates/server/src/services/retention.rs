//! Retention sweep and its daily scheduler.
//!
//! The sweep removes every slip whose delivery date is older than the
//! retention window, from both the image store and the record store. Image
//! deletions are best effort; record deletion always follows.
//!
//! The scheduler runs inside the server and sweeps at most once per local
//! calendar day, remembering the last run in the settings table. Running the
//! sweep twice is harmless, so the marker is only an optimization.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::instrument;

use slipdesk_core::SlipId;
use slipdesk_core::retention::{cutoff_date, select_expired};

use crate::db::{RepositoryError, SettingsStore, SlipStore};
use crate::images::ImageStore;

/// Settings key holding the date of the last completed sweep.
pub const LAST_RUN_KEY: &str = "retention.last_run";

/// Outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Rows the record store reported as deleted.
    pub deleted_count: u64,
    /// Slips that fell outside the window.
    pub selected: usize,
    /// Image deletions that failed and were skipped.
    pub image_failures: usize,
    /// Oldest delivery date that was kept.
    pub cutoff: NaiveDate,
}

/// Deletes expired slips and their images.
#[derive(Clone)]
pub struct RetentionSweeper {
    slips: Arc<dyn SlipStore>,
    images: Arc<dyn ImageStore>,
}

impl RetentionSweeper {
    #[must_use]
    pub fn new(slips: Arc<dyn SlipStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { slips, images }
    }

    /// Delete every slip delivered before `today - retention_days`.
    ///
    /// Slips whose delivery date cannot be parsed are never deleted. Image
    /// deletions run concurrently; failures are logged and counted but never
    /// stop the record deletion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if listing or deleting slips fails. A failed
    /// listing deletes nothing.
    #[instrument(skip(self))]
    pub async fn sweep(
        &self,
        retention_days: u32,
        today: NaiveDate,
    ) -> Result<SweepReport, RepositoryError> {
        let cutoff = cutoff_date(today, retention_days);
        let slips = self.slips.list().await?;
        let expired = select_expired(&slips, cutoff);

        if expired.is_empty() {
            tracing::info!(%cutoff, "Retention sweep found nothing to delete");
            return Ok(SweepReport {
                deleted_count: 0,
                selected: 0,
                image_failures: 0,
                cutoff,
            });
        }

        let deletions = expired
            .iter()
            .filter(|slip| !slip.image_url.trim().is_empty())
            .map(|slip| async move {
                let result = self.images.delete(&slip.image_url).await;
                if let Err(e) = &result {
                    tracing::warn!(
                        slip_id = %slip.id,
                        url = %slip.image_url,
                        error = %e,
                        "Failed to delete slip image"
                    );
                }
                result.is_ok()
            });
        let image_failures = join_all(deletions).await.into_iter().filter(|ok| !ok).count();

        let ids: Vec<SlipId> = expired.iter().map(|slip| slip.id).collect();
        let deleted_count = self.slips.delete_many(&ids).await?;

        tracing::info!(
            %cutoff,
            selected = ids.len(),
            deleted_count,
            image_failures,
            "Retention sweep complete"
        );

        Ok(SweepReport {
            deleted_count,
            selected: ids.len(),
            image_failures,
            cutoff,
        })
    }
}

/// Result of a scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerOutcome {
    /// A sweep already completed today.
    AlreadyRan,
    /// A sweep ran now.
    Swept(SweepReport),
}

/// Runs the sweeper at most once per calendar day.
#[derive(Clone)]
pub struct RetentionScheduler {
    sweeper: RetentionSweeper,
    settings: Arc<dyn SettingsStore>,
    retention_days: u32,
}

impl RetentionScheduler {
    #[must_use]
    pub fn new(
        sweeper: RetentionSweeper,
        settings: Arc<dyn SettingsStore>,
        retention_days: u32,
    ) -> Self {
        Self {
            sweeper,
            settings,
            retention_days,
        }
    }

    /// Sweep unless the marker says today's sweep already ran.
    ///
    /// The marker is written only after a successful sweep, so a failed run
    /// is retried on the next tick.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if reading the marker, sweeping, or writing
    /// the marker fails.
    #[instrument(skip(self))]
    pub async fn run_if_due(&self, today: NaiveDate) -> Result<SchedulerOutcome, RepositoryError> {
        if self.last_run().await? == Some(today) {
            tracing::debug!("Retention sweep already ran today");
            return Ok(SchedulerOutcome::AlreadyRan);
        }

        let report = self.sweeper.sweep(self.retention_days, today).await?;
        self.settings
            .set(LAST_RUN_KEY, &serde_json::Value::String(today.to_string()))
            .await?;

        Ok(SchedulerOutcome::Swept(report))
    }

    async fn last_run(&self) -> Result<Option<NaiveDate>, RepositoryError> {
        let value = self.settings.get(LAST_RUN_KEY).await?;
        Ok(value
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|s| s.parse().ok()))
    }

    /// Check once per `interval` in a background task, starting immediately.
    ///
    /// Errors are logged and the loop keeps going.
    #[must_use]
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match self.run_if_due(Local::now().date_naive()).await {
                    Ok(SchedulerOutcome::Swept(report)) => {
                        tracing::info!(deleted = report.deleted_count, "Scheduled retention sweep ran");
                    }
                    Ok(SchedulerOutcome::AlreadyRan) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled retention sweep failed");
                    }
                }
            }
        })
    }
}
