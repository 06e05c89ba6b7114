//! Read-mostly cache of active alerts.
//!
//! Readers take a cheap `Arc` clone of the current snapshot. Writers go
//! through [`AlertCache::refresh_on`], which performs the write against the
//! store and then swaps in a freshly loaded snapshot, so the cache can never
//! be observed ahead of the store.

use std::future::Future;
use std::sync::{Arc, RwLock};

use tracing::debug;

use rally_core::result::AppResult;
use rally_entity::Alert;

use crate::traits::AlertStore;

/// Snapshot cache in front of an [`AlertStore`].
pub struct AlertCache {
    store: Arc<dyn AlertStore>,
    active: RwLock<Arc<[Alert]>>,
}

impl std::fmt::Debug for AlertCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertCache")
            .field("active", &self.read().len())
            .finish()
    }
}

impl AlertCache {
    /// Load the initial snapshot.
    pub async fn init(store: Arc<dyn AlertStore>) -> AppResult<Self> {
        let alerts = store.active_alerts().await?;
        Ok(Self {
            store,
            active: RwLock::new(alerts.into()),
        })
    }

    /// Current snapshot of active alerts.
    pub fn read(&self) -> Arc<[Alert]> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Reload the snapshot from the store.
    pub async fn reload(&self) -> AppResult<()> {
        let alerts: Arc<[Alert]> = self.store.active_alerts().await?.into();
        debug!(count = alerts.len(), "Alert cache refreshed");
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = alerts;
        Ok(())
    }

    /// Run a write against the store, then refresh the snapshot.
    ///
    /// The snapshot is left untouched when the write fails.
    pub async fn refresh_on<T, F, Fut>(&self, write: F) -> AppResult<T>
    where
        F: FnOnce(Arc<dyn AlertStore>) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let out = write(Arc::clone(&self.store)).await?;
        self.reload().await?;
        Ok(out)
    }
}
