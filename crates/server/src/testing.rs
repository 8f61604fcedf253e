//! In-memory store fakes for tests.
//!
//! Available to this crate's unit tests and, through the `test-util`
//! feature, to the integration tests. Every fake can be switched into a
//! failing mode to exercise error paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value as JsonValue;

use slipdesk_core::{
    Branch, CakeType, DeliveryType, Email, Slip, SlipId, SlipStatus, UserId,
};

use crate::db::{
    NewSlip, NewUser, RepositoryError, SettingsStore, SlipStore, UserChanges, UserStore,
};
use crate::images::{ImageStore, ImageStoreError, ImageUpload};
use crate::models::{SlipForm, User};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

/// A complete, valid slip form dated `01-01-2024`.
#[must_use]
pub fn sample_form() -> SlipForm {
    let mut form = SlipForm::default();
    for (name, value) in [
        ("branch", "khamla"),
        ("deliveryDate", "01-01-2024"),
        ("deliveryTime", "5 PM"),
        ("deliveryType", "delivery"),
        ("cakeType", "cream"),
        ("customerName", "Ravi"),
        ("customerNumber", "9000000000"),
        ("billNumber", "B-101"),
    ] {
        form.set(name, value.to_string());
    }
    form
}

/// A small JPEG-labelled upload.
#[must_use]
pub fn sample_image() -> ImageUpload {
    ImageUpload {
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        filename: "slip.jpg".to_string(),
        content_type: Some("image/jpeg".to_string()),
    }
}

// =============================================================================
// Slips
// =============================================================================

/// In-memory [`SlipStore`]. `created_at` increases with each insert.
#[derive(Debug, Default)]
pub struct MemorySlipStore {
    slips: Mutex<Vec<Slip>>,
    next_id: AtomicI32,
    failing: AtomicBool,
}

impl MemorySlipStore {
    /// Make every call fail with a database error.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    /// Every stored slip, newest first.
    #[must_use]
    pub fn all(&self) -> Vec<Slip> {
        let mut slips = lock(&self.slips).clone();
        slips.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        slips
    }

    #[must_use]
    pub fn get(&self, id: SlipId) -> Option<Slip> {
        lock(&self.slips).iter().find(|s| s.id == id).cloned()
    }

    fn insert(&self, slip: NewSlip) -> Slip {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created_at = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_default()
            + Duration::seconds(i64::from(id));
        let slip = Slip {
            id: SlipId::new(id),
            branch: slip.branch,
            delivery_date: slip.delivery_date,
            delivery_time: slip.delivery_time,
            delivery_type: slip.delivery_type,
            cake_type: slip.cake_type,
            customer_name: slip.customer_name,
            customer_number: slip.customer_number,
            bill_number: slip.bill_number,
            hamper: slip.hamper,
            topper: slip.topper,
            image_url: slip.image_url,
            status: SlipStatus::Pending,
            created_at,
        };
        lock(&self.slips).push(slip.clone());
        slip
    }

    /// Insert a slip with the given stored delivery date text.
    pub fn insert_dated(&self, delivery_date: &str) -> Slip {
        let n = self.next_id.load(Ordering::SeqCst) + 1;
        self.insert(NewSlip {
            branch: Branch::Khamla,
            delivery_date: delivery_date.to_string(),
            delivery_time: "5 PM".to_string(),
            delivery_type: DeliveryType::Delivery,
            cake_type: CakeType::Cream,
            customer_name: format!("Customer {n}"),
            customer_number: format!("90000000{n:02}"),
            bill_number: format!("B-{n}"),
            hamper: None,
            topper: None,
            image_url: format!("https://res.cloudinary.com/test/image/upload/v1/cake_slips/slip-{n}.webp"),
        })
    }

    /// Insert a fully specified slip.
    pub fn insert_slip(&self, slip: NewSlip) -> Slip {
        self.insert(slip)
    }
}

#[async_trait]
impl SlipStore for MemorySlipStore {
    async fn create(&self, slip: NewSlip) -> Result<Slip, RepositoryError> {
        self.check()?;
        Ok(self.insert(slip))
    }

    async fn list(&self) -> Result<Vec<Slip>, RepositoryError> {
        self.check()?;
        Ok(self.all())
    }

    async fn update_status(
        &self,
        id: SlipId,
        status: SlipStatus,
    ) -> Result<Option<Slip>, RepositoryError> {
        self.check()?;
        let mut slips = lock(&self.slips);
        Ok(slips.iter_mut().find(|s| s.id == id).map(|slip| {
            slip.status = status;
            slip.clone()
        }))
    }

    async fn delete_many(&self, ids: &[SlipId]) -> Result<u64, RepositoryError> {
        self.check()?;
        let mut slips = lock(&self.slips);
        let before = slips.len();
        slips.retain(|s| !ids.contains(&s.id));
        Ok((before - slips.len()) as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }
}

// =============================================================================
// Images
// =============================================================================

/// In-memory [`ImageStore`] that records every delete attempt.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    stored: Mutex<HashSet<String>>,
    delete_attempts: Mutex<Vec<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    uploads: AtomicUsize,
    failing_uploads: AtomicBool,
}

impl MemoryImageStore {
    /// Pretend `url` was uploaded earlier.
    pub fn seed(&self, url: &str) {
        lock(&self.stored).insert(url.to_string());
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        lock(&self.stored).contains(url)
    }

    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// URLs passed to `delete`, sorted.
    #[must_use]
    pub fn delete_attempts(&self) -> Vec<String> {
        let mut attempts = lock(&self.delete_attempts).clone();
        attempts.sort();
        attempts
    }

    pub fn fail_uploads(&self, failing: bool) {
        self.failing_uploads.store(failing, Ordering::SeqCst);
    }

    /// Make deleting `url` fail.
    pub fn fail_delete(&self, url: &str) {
        lock(&self.failing_deletes).insert(url.to_string());
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError> {
        if self.failing_uploads.load(Ordering::SeqCst) {
            return Err(ImageStoreError::Api {
                status: 503,
                message: "upload unavailable".to_string(),
            });
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        let url = format!(
            "https://res.cloudinary.com/test/image/upload/v1/cake_slips/{n}-{}",
            image.filename
        );
        lock(&self.stored).insert(url.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
        lock(&self.delete_attempts).push(url.to_string());
        if lock(&self.failing_deletes).contains(url) {
            return Err(ImageStoreError::Api {
                status: 500,
                message: "destroy failed".to_string(),
            });
        }
        lock(&self.stored).remove(url);
        Ok(())
    }
}

// =============================================================================
// Users
// =============================================================================

/// In-memory [`UserStore`] enforcing unique usernames and emails.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<(User, String)>>,
    next_id: AtomicI32,
}

impl MemoryUserStore {
    fn taken(users: &[(User, String)], except: Option<UserId>, username: &str, email: &Email) -> bool {
        users.iter().any(|(u, _)| {
            Some(u.id) != except && (u.username == username || &u.email == email)
        })
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = lock(&self.users);
        if Self::taken(&users, None, &user.username, &user.email) {
            return Err(RepositoryError::Conflict("username or email already exists".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(id),
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push((created.clone(), user.password_hash));
        Ok(created)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users)
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn get_with_password(
        &self,
        login: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let login = login.trim();
        let users = lock(&self.users);
        let by_email = users
            .iter()
            .find(|(u, _)| u.email.as_str() == login.to_lowercase());
        Ok(by_email
            .or_else(|| users.iter().find(|(u, _)| u.username == login))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(lock(&self.users).iter().map(|(u, _)| u.clone()).collect())
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut users = lock(&self.users);
        let Some(current) = users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()) else {
            return Ok(None);
        };
        let username = changes.username.unwrap_or(current.username);
        let email = changes.email.unwrap_or(current.email);
        if Self::taken(&users, Some(id), &username, &email) {
            return Err(RepositoryError::Conflict("username or email already exists".to_string()));
        }
        let Some((user, _)) = users.iter_mut().find(|(u, _)| u.id == id) else {
            return Ok(None);
        };
        user.username = username;
        user.email = email;
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut users = lock(&self.users);
        let before = users.len();
        users.retain(|(u, _)| u.id != id);
        Ok(users.len() < before)
    }
}

// =============================================================================
// Settings
// =============================================================================

/// In-memory [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, JsonValue>>,
    failing: AtomicBool,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn value(&self, key: &str) -> Option<JsonValue> {
        lock(&self.values).get(key).cloned()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &JsonValue) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        lock(&self.values).insert(key.to_string(), value.clone());
        Ok(())
    }
}
