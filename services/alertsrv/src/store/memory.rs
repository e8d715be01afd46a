//! In-memory alert store
//!
//! Uses DashMap for concurrent access; each update happens under the entry's
//! shard lock, so concurrent writes to one alert are last-write-wins.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Alert, AlertFilter, AlertPage, AlertPatch, NewAlert, PageRequest};
use crate::error::{AlertError, Result};
use crate::store::AlertStore;

struct Record {
    /// Insertion sequence, breaks `created_at` ties
    seq: u64,
    alert: Alert,
}

/// In-memory alert store
pub struct MemoryAlertStore {
    alerts: DashMap<Uuid, Record>,
    next_seq: AtomicU64,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self {
            alerts: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl Default for MemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, filter: &AlertFilter, page: PageRequest) -> Result<AlertPage> {
        let mut matched: Vec<(u64, Alert)> = self
            .alerts
            .iter()
            .filter(|entry| filter.matches(&entry.alert))
            .map(|entry| (entry.seq, entry.alert.clone()))
            .collect();

        matched.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });

        let total = matched.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let alerts = matched
            .into_iter()
            .skip(offset)
            .take(page.limit() as usize)
            .map(|(_, alert)| alert)
            .collect::<Vec<_>>();

        debug!(
            "Listed {} of {} alerts (page {}, limit {})",
            alerts.len(),
            total,
            page.page(),
            page.limit()
        );
        Ok(AlertPage { alerts, total })
    }

    async fn get(&self, id: Uuid) -> Result<Alert> {
        self.alerts
            .get(&id)
            .map(|entry| entry.alert.clone())
            .ok_or_else(|| AlertError::not_found(id))
    }

    async fn create(&self, input: NewAlert) -> Result<Alert> {
        let alert = Alert::new(input.validate()?);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.alerts.insert(
            alert.id,
            Record {
                seq,
                alert: alert.clone(),
            },
        );
        Ok(alert)
    }

    async fn update(&self, id: Uuid, patch: AlertPatch) -> Result<Alert> {
        let patch = patch.validate()?;
        let mut entry = self
            .alerts
            .get_mut(&id)
            .ok_or_else(|| AlertError::not_found(id))?;
        patch.apply(&mut entry.alert);
        Ok(entry.alert.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.alerts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AlertError::not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AlertStatus;

    #[tokio::test]
    async fn test_create_and_len() {
        let store = MemoryAlertStore::new();
        assert!(store.is_empty());

        store
            .create(NewAlert::new("France", "Paris", "Tourist"))
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_unchanged() {
        let store = MemoryAlertStore::new();
        let alert = store
            .create(NewAlert::new("France", "Paris", "Tourist"))
            .await
            .unwrap();

        let patch = AlertPatch {
            status: Some("Booked".to_string()),
            visa_type: Some("Transit".to_string()),
            ..Default::default()
        };
        assert!(store.update(alert.id, patch).await.is_err());

        let stored = store.get(alert.id).await.unwrap();
        assert_eq!(stored, alert);
        assert_eq!(stored.status, AlertStatus::Active);
    }

    #[tokio::test]
    async fn test_same_timestamp_orders_by_insertion() {
        let store = MemoryAlertStore::new();
        let first = store
            .create(NewAlert::new("France", "Paris", "Tourist"))
            .await
            .unwrap();
        let second = store
            .create(NewAlert::new("France", "Lyon", "Tourist"))
            .await
            .unwrap();

        // Pin both to one instant so only the insertion sequence differs
        let instant = first.created_at;
        for mut entry in store.alerts.iter_mut() {
            entry.alert.created_at = instant;
        }

        let page = store
            .list(&AlertFilter::new(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.alerts[0].id, second.id);
        assert_eq!(page.alerts[1].id, first.id);
    }
}
