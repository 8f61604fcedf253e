//! Slip repository.
//!
//! The store only does CRUD. Filtering, permission checks and retention
//! selection live in `slipdesk_core` and the services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use slipdesk_core::{Branch, CakeType, DeliveryType, Slip, SlipId, SlipStatus};

use super::RepositoryError;

/// A validated slip ready to be inserted.
///
/// `delivery_date` is already canonical and `image_url` already points at
/// the uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlip {
    pub branch: Branch,
    pub delivery_date: String,
    pub delivery_time: String,
    pub delivery_type: DeliveryType,
    pub cake_type: CakeType,
    pub customer_name: String,
    pub customer_number: String,
    pub bill_number: String,
    pub hamper: Option<bool>,
    pub topper: Option<bool>,
    pub image_url: String,
}

/// Persistent slip storage.
#[async_trait]
pub trait SlipStore: Send + Sync {
    /// Insert a slip with status `pending`.
    async fn create(&self, slip: NewSlip) -> Result<Slip, RepositoryError>;

    /// Every readable slip, newest first. Rows that fail to decode are
    /// logged and left out.
    async fn list(&self) -> Result<Vec<Slip>, RepositoryError>;

    /// Set the status of one slip. `None` when the id is unknown.
    async fn update_status(
        &self,
        id: SlipId,
        status: SlipStatus,
    ) -> Result<Option<Slip>, RepositoryError>;

    /// Delete the given ids and return how many rows were removed.
    async fn delete_many(&self, ids: &[SlipId]) -> Result<u64, RepositoryError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SlipRow {
    id: i32,
    branch: String,
    delivery_date: String,
    delivery_time: String,
    delivery_type: String,
    cake_type: String,
    customer_name: String,
    customer_number: String,
    bill_number: String,
    hamper: Option<bool>,
    topper: Option<bool>,
    image_url: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn corrupt(id: i32, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("slip {id}: {err}"))
}

impl TryFrom<SlipRow> for Slip {
    type Error = RepositoryError;

    fn try_from(row: SlipRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: SlipId::new(id),
            branch: row.branch.parse().map_err(|e| corrupt(id, e))?,
            delivery_date: row.delivery_date,
            delivery_time: row.delivery_time,
            delivery_type: row.delivery_type.parse().map_err(|e| corrupt(id, e))?,
            cake_type: row.cake_type.parse().map_err(|e| corrupt(id, e))?,
            customer_name: row.customer_name,
            customer_number: row.customer_number,
            bill_number: row.bill_number,
            hamper: row.hamper,
            topper: row.topper,
            image_url: row.image_url,
            status: row.status.parse().map_err(|e| corrupt(id, e))?,
            created_at: row.created_at,
        })
    }
}

/// Decode listed rows, skipping the ones that no longer match the slip model.
fn decode_rows(rows: Vec<SlipRow>) -> Vec<Slip> {
    rows.into_iter()
        .filter_map(|row| match Slip::try_from(row) {
            Ok(slip) => Some(slip),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable slip row");
                None
            }
        })
        .collect()
}

const SLIP_COLUMNS: &str = "id, branch, delivery_date, delivery_time, delivery_type, cake_type, \
     customer_name, customer_number, bill_number, hamper, topper, image_url, status, created_at";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL`-backed [`SlipStore`].
#[derive(Clone)]
pub struct PgSlipStore {
    pool: PgPool,
}

impl PgSlipStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlipStore for PgSlipStore {
    async fn create(&self, slip: NewSlip) -> Result<Slip, RepositoryError> {
        let row = sqlx::query_as::<_, SlipRow>(&format!(
            r"
            INSERT INTO slips (branch, delivery_date, delivery_time, delivery_type, cake_type,
                               customer_name, customer_number, bill_number, hamper, topper,
                               image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SLIP_COLUMNS}
            "
        ))
        .bind(slip.branch.as_str())
        .bind(&slip.delivery_date)
        .bind(&slip.delivery_time)
        .bind(slip.delivery_type.as_str())
        .bind(slip.cake_type.as_str())
        .bind(&slip.customer_name)
        .bind(&slip.customer_number)
        .bind(&slip.bill_number)
        .bind(slip.hamper)
        .bind(slip.topper)
        .bind(&slip.image_url)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list(&self) -> Result<Vec<Slip>, RepositoryError> {
        let rows = sqlx::query_as::<_, SlipRow>(&format!(
            "SELECT {SLIP_COLUMNS} FROM slips ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(decode_rows(rows))
    }

    async fn update_status(
        &self,
        id: SlipId,
        status: SlipStatus,
    ) -> Result<Option<Slip>, RepositoryError> {
        let row = sqlx::query_as::<_, SlipRow>(&format!(
            "UPDATE slips SET status = $2 WHERE id = $1 RETURNING {SLIP_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete_many(&self, ids: &[SlipId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let result = sqlx::query("DELETE FROM slips WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> SlipRow {
        SlipRow {
            id: 7,
            branch: "khamla".to_string(),
            delivery_date: "2024-03-01".to_string(),
            delivery_time: "4 PM".to_string(),
            delivery_type: "pickup".to_string(),
            cake_type: "semi-fondant".to_string(),
            customer_name: "Asha".to_string(),
            customer_number: "9800000000".to_string(),
            bill_number: "B-7".to_string(),
            hamper: Some(false),
            topper: None,
            image_url: "https://img.example/7.jpg".to_string(),
            status: "in kitchen".to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_row_converts_to_slip() {
        let slip = Slip::try_from(row()).unwrap();
        assert_eq!(slip.id, SlipId::new(7));
        assert_eq!(slip.cake_type, CakeType::SemiFondant);
        assert_eq!(slip.status, SlipStatus::InKitchen);
    }

    #[test]
    fn test_unknown_status_is_data_corruption() {
        let bad = SlipRow {
            status: "lost".to_string(),
            ..row()
        };
        let err = Slip::try_from(bad).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(msg) if msg.starts_with("slip 7")));
    }

    #[test]
    fn test_unreadable_rows_do_not_hide_the_rest() {
        let rows = vec![
            SlipRow { id: 9, ..row() },
            SlipRow {
                id: 8,
                branch: "Khamla Branch".to_string(),
                ..row()
            },
            row(),
        ];

        let ids: Vec<_> = decode_rows(rows).iter().map(|s| s.id).collect();

        assert_eq!(ids, vec![SlipId::new(9), SlipId::new(7)]);
    }
}
