//! [`AlertStore`] for [`MemoryStore`].

use async_trait::async_trait;
use chrono::Utc;

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::AlertId;
use rally_entity::Alert;

use super::MemoryStore;
use crate::traits::{AlertStore, NewAlert};

#[async_trait]
impl AlertStore for MemoryStore {
    async fn active_alerts(&self) -> AppResult<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.value().clone())
            .collect();
        alerts.sort_by_key(|a| a.created_at);
        Ok(alerts)
    }

    async fn create_alert(&self, new: NewAlert) -> AppResult<Alert> {
        if new.name.trim().is_empty() {
            return Err(AppError::validation("Alert name is required"));
        }
        let alert = Alert {
            id: AlertId::new(),
            name: new.name,
            content: new.content,
            level: new.level,
            active: true,
            dismissible: new.dismissible,
            created_at: Utc::now(),
        };
        self.alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn delete_alert(&self, alert_id: AlertId) -> AppResult<()> {
        self.alerts
            .remove(&alert_id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Alert {alert_id} not found")))
    }
}
