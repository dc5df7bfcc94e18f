//! In-memory `Store` implementation backed by `dashmap`, the way the
//! teacher crate backs its DNS cache (`cache.rs`) with a concurrent map.
//! Stands in for the out-of-scope external backing store in tests and as
//! a zero-dependency default.

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;

use crate::error::Result;
use crate::model::{CurrentScan, Domain, Scan};

use super::{NotificationThresholds, Store};

#[derive(Default)]
pub struct InMemoryStore {
    domains: DashMap<String, Domain>,
    current_scan: Mutex<Option<CurrentScan>>,
    scans: Mutex<Vec<Scan>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, domain: Domain) {
        self.domains.insert(domain.fqdn.clone(), domain);
    }

    pub fn get(&self, fqdn: &str) -> Option<Domain> {
        self.domains.get(fqdn).map(|entry| entry.value().clone())
    }

    pub fn current_scan(&self) -> Option<CurrentScan> {
        self.current_scan.lock().clone()
    }

    pub fn scans(&self) -> Vec<Scan> {
        self.scans.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn find_all_stream(&self) -> BoxStream<'_, Result<Domain>> {
        let snapshot: Vec<Domain> = self.domains.iter().map(|entry| entry.value().clone()).collect();
        Box::pin(stream::iter(snapshot.into_iter().map(Ok)))
    }

    fn find_all_to_be_notified(&self, thresholds: NotificationThresholds) -> BoxStream<'_, Result<Domain>> {
        let snapshot: Vec<Domain> = self
            .domains
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|domain| domain.is_near_dnssec_expiration(thresholds.max_expiration_alert_days, thresholds.now))
            .collect();
        Box::pin(stream::iter(snapshot.into_iter().map(Ok)))
    }

    async fn save(&self, domain: &Domain) -> Result<()> {
        self.domains.insert(domain.fqdn.clone(), domain.clone());
        Ok(())
    }

    async fn save_current_scan(&self, scan: &CurrentScan) -> Result<()> {
        *self.current_scan.lock() = Some(scan.clone());
        Ok(())
    }

    async fn save_scan(&self, scan: &Scan) -> Result<()> {
        self.scans.lock().push(scan.clone());
        Ok(())
    }

    async fn current_scan(&self) -> Option<CurrentScan> {
        self.current_scan.lock().clone()
    }

    async fn latest_scan(&self) -> Option<Scan> {
        self.scans.lock().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn save_then_find_all_round_trips() {
        let store = InMemoryStore::new();
        store.insert(Domain::new("example."));

        let found: Vec<Domain> = store.find_all_stream().filter_map(|r| async { r.ok() }).collect().await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fqdn, "example.");
    }

    #[tokio::test]
    async fn save_current_scan_overwrites_previous() {
        let store = InMemoryStore::new();
        let first = CurrentScan::new(chrono::Utc::now());
        store.save_current_scan(&first).await.unwrap();
        assert_eq!(store.current_scan().unwrap().domains_scanned, 0);
    }
}
