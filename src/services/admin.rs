//! Database maintenance: startup initialization, resets and status

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    repository::{seed, ResetMode, Store, StoreStatus},
};

/// Migration state as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub can_connect: bool,
    pub applied_migrations: Vec<String>,
    pub pending_migrations: Vec<String>,
    pub total_applied_migrations: usize,
}

impl From<StoreStatus> for DatabaseStatus {
    fn from(status: StoreStatus) -> Self {
        Self {
            can_connect: status.can_connect,
            total_applied_migrations: status.applied_migrations.len(),
            applied_migrations: status.applied_migrations,
            pending_migrations: status.pending_migrations,
        }
    }
}

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn Store>,
}

impl AdminService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Run pending migrations and, if asked, link the seed books
    pub async fn initialize(&self, seed: bool) -> AppResult<()> {
        self.store.migrate().await?;
        if seed {
            seed::seed(self.store.as_ref()).await?;
        }
        Ok(())
    }

    /// Throw the data away, migrate from scratch and seed again
    pub async fn reset(&self, mode: ResetMode) -> AppResult<()> {
        tracing::warn!(?mode, "Database reset requested");
        self.store.reset(mode).await?;
        seed::seed(self.store.as_ref()).await?;
        tracing::info!("Database reset completed");
        Ok(())
    }

    pub async fn status(&self) -> AppResult<DatabaseStatus> {
        Ok(self.store.status().await?.into())
    }

    /// Readiness probe: whether the store answers at all
    pub async fn is_ready(&self) -> bool {
        match self.store.status().await {
            Ok(status) => status.can_connect,
            Err(e) => {
                tracing::warn!("Readiness check failed: {}", e);
                false
            }
        }
    }
}
