//! Slip workflows: listing with filters, creation with image upload, and
//! role-gated status changes.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use slipdesk_core::{
    ParseEnumError, Role, Slip, SlipFilter, SlipId, SlipStatus, StatusChangeDenied,
    authorize_status_change, filter_slips,
};

use crate::db::{RepositoryError, SlipStore};
use crate::images::{ImageStore, ImageStoreError, ImageUpload};
use crate::models::{SlipForm, SlipFormError};

/// Errors from slip operations.
#[derive(Debug, Error)]
pub enum SlipError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The acting role may not make this change.
    #[error(transparent)]
    Permission(#[from] StatusChangeDenied),

    #[error("slip {0} not found")]
    NotFound(SlipId),

    /// The record store failed.
    #[error("slip store unavailable: {0}")]
    StoreUnavailable(#[from] RepositoryError),

    /// The image store failed during upload.
    #[error("image upload failed: {0}")]
    ExternalStore(#[from] ImageStoreError),
}

impl From<SlipFormError> for SlipError {
    fn from(err: SlipFormError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ParseEnumError> for SlipError {
    fn from(err: ParseEnumError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Slip operations over a record store and an image store.
#[derive(Clone)]
pub struct SlipService {
    slips: Arc<dyn SlipStore>,
    images: Arc<dyn ImageStore>,
}

impl SlipService {
    #[must_use]
    pub fn new(slips: Arc<dyn SlipStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { slips, images }
    }

    /// All slips (newest first) narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// Returns `SlipError::StoreUnavailable` if the store cannot be read.
    #[instrument(skip(self))]
    pub async fn list_slips(&self, filter: &SlipFilter) -> Result<Vec<Slip>, SlipError> {
        let slips = self.slips.list().await?;
        let total = slips.len();
        let matched = filter_slips(slips, filter);
        tracing::debug!(total, matched = matched.len(), "Slips listed");
        Ok(matched)
    }

    /// Validate the form, upload the image, then store the slip as `pending`.
    ///
    /// Nothing is uploaded when validation fails, and nothing is stored when
    /// the upload fails.
    ///
    /// # Errors
    ///
    /// - `SlipError::Validation` for a missing image or bad field
    /// - `SlipError::ExternalStore` if the upload fails
    /// - `SlipError::StoreUnavailable` if the insert fails
    #[instrument(skip(self, form, image), fields(bill = ?form.bill_number))]
    pub async fn create_slip(
        &self,
        form: &SlipForm,
        image: Option<ImageUpload>,
    ) -> Result<Slip, SlipError> {
        let image = image
            .filter(|i| !i.bytes.is_empty())
            .ok_or_else(|| SlipError::Validation("slip image is required".to_string()))?;
        let draft = form.validate()?;

        let image_url = self.images.upload(image).await.inspect_err(|e| {
            tracing::error!(error = %e, "Slip image upload failed");
        })?;

        let slip = self.slips.create(draft.with_image(image_url)).await?;
        tracing::info!(slip_id = %slip.id, branch = %slip.branch, "Slip created");
        Ok(slip)
    }

    /// Change a slip's status if `role` is allowed to set `status`.
    ///
    /// The permission check runs before the store is touched. Any permitted
    /// target is accepted from any current status.
    ///
    /// # Errors
    ///
    /// - `SlipError::Validation` if `status` is not a known status
    /// - `SlipError::Permission` if the role may not set it
    /// - `SlipError::NotFound` for an unknown id
    /// - `SlipError::StoreUnavailable` if the update fails
    #[instrument(skip(self))]
    pub async fn set_slip_status(
        &self,
        id: SlipId,
        status: &str,
        role: Option<Role>,
    ) -> Result<Slip, SlipError> {
        let status: SlipStatus = status.parse()?;
        authorize_status_change(role, status).inspect_err(|e| {
            tracing::warn!(error = %e, "Status change denied");
        })?;

        let slip = self
            .slips
            .update_status(id, status)
            .await?
            .ok_or(SlipError::NotFound(id))?;

        tracing::info!(slip_id = %id, status = %status, "Slip status updated");
        Ok(slip)
    }
}
