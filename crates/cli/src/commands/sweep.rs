//! One-off retention sweep.
//!
//! # Usage
//!
//! ```bash
//! slipdesk sweep            # uses RETENTION_DAYS, default 5
//! slipdesk sweep --days 30
//! ```
//!
//! Deletes slips whose delivery date is before `today - days`, along with
//! their images. Requires the same `CLOUDINARY_*` variables as the server.

use std::sync::Arc;

use chrono::Local;
use slipdesk_server::config::{CloudinaryConfig, ConfigError, DEFAULT_RETENTION_DAYS};
use slipdesk_server::db::{PgSlipStore, RepositoryError};
use slipdesk_server::images::{CloudinaryImageStore, ImageStoreError};
use slipdesk_server::services::{RetentionSweeper, SweepReport};
use thiserror::Error;

use super::ConnectError;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Image store setup failed: {0}")]
    ImageStore(#[from] ImageStoreError),

    #[error("Sweep failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// Run the sweep once against the configured database and image store.
///
/// # Errors
///
/// Returns `SweepError` if configuration is incomplete or the slip store
/// fails. Individual image deletion failures are only logged.
pub async fn run(days: Option<u32>) -> Result<SweepReport, SweepError> {
    let pool = super::connect().await?;
    let images = CloudinaryImageStore::new(CloudinaryConfig::from_env()?)?;
    let sweeper = RetentionSweeper::new(Arc::new(PgSlipStore::new(pool)), Arc::new(images));

    let days = days.unwrap_or(DEFAULT_RETENTION_DAYS);
    let today = Local::now().date_naive();
    tracing::info!("Sweeping slips delivered before {} days ago...", days);

    let report = sweeper.sweep(days, today).await?;

    tracing::info!(
        "Sweep complete! Deleted {} of {} expired slips (cutoff {}, {} image failures)",
        report.deleted_count,
        report.selected,
        report.cutoff,
        report.image_failures
    );

    Ok(report)
}
