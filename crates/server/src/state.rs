//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::RetentionConfig;
use crate::db::{
    PgSettingsStore, PgSlipStore, PgUserStore, SettingsStore, SlipStore, UserStore,
};
use crate::images::ImageStore;
use crate::services::{
    AuthService, RetentionScheduler, RetentionSweeper, SlipService, UserAdminService,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    slip_store: Arc<dyn SlipStore>,
    settings: Arc<dyn SettingsStore>,
    retention: RetentionConfig,
    slips: SlipService,
    sweeper: RetentionSweeper,
    auth: AuthService,
    users: UserAdminService,
}

impl AppState {
    /// Wire the services over the given stores.
    #[must_use]
    pub fn new(
        slip_store: Arc<dyn SlipStore>,
        user_store: Arc<dyn UserStore>,
        settings: Arc<dyn SettingsStore>,
        images: Arc<dyn ImageStore>,
        retention: RetentionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                slips: SlipService::new(slip_store.clone(), images.clone()),
                sweeper: RetentionSweeper::new(slip_store.clone(), images),
                auth: AuthService::new(user_store.clone()),
                users: UserAdminService::new(user_store),
                slip_store,
                settings,
                retention,
            }),
        }
    }

    /// State backed by `PostgreSQL` stores.
    #[must_use]
    pub fn from_pool(pool: &PgPool, images: Arc<dyn ImageStore>, retention: RetentionConfig) -> Self {
        Self::new(
            Arc::new(PgSlipStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgSettingsStore::new(pool.clone())),
            images,
            retention,
        )
    }

    #[must_use]
    pub fn slips(&self) -> &SlipService {
        &self.inner.slips
    }

    #[must_use]
    pub fn sweeper(&self) -> &RetentionSweeper {
        &self.inner.sweeper
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn users(&self) -> &UserAdminService {
        &self.inner.users
    }

    #[must_use]
    pub fn retention(&self) -> &RetentionConfig {
        &self.inner.retention
    }

    /// Raw slip store, for readiness checks.
    #[must_use]
    pub fn slip_store(&self) -> &Arc<dyn SlipStore> {
        &self.inner.slip_store
    }

    /// Daily scheduler over this state's stores.
    #[must_use]
    pub fn scheduler(&self) -> RetentionScheduler {
        RetentionScheduler::new(
            self.inner.sweeper.clone(),
            self.inner.settings.clone(),
            self.inner.retention.days,
        )
    }
}
