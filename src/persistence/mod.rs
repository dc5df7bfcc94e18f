//! Persistence abstraction the core consumes (spec §1, §6): the provider
//! contract is `findAllStream`, `findAllToBeNotified` (unused by the core —
//! a notification-layer concern, kept here only because it is part of the
//! documented provider contract), `save`, `saveCurrentScan`, `saveScan`.
//! The real backing store and its wire encoding are out of scope (spec
//! §1); `memory` supplies an in-process implementation used by tests and
//! as the default store when no external one is configured.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

pub use memory::InMemoryStore;

use crate::error::Result;
use crate::model::{CurrentScan, Domain, Scan};

/// Thresholds the notification layer uses to select domains to alert on;
/// the core never calls `find_all_to_be_notified` but the trait carries it
/// because it is part of the persistence provider contract (spec §6).
#[derive(Debug, Clone, Copy)]
pub struct NotificationThresholds {
    pub max_expiration_alert_days: i64,
    pub now: DateTime<Utc>,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Lazily enumerates every domain in the catalog; order is irrelevant
    /// (spec §4.5 "streamed in pages, order irrelevant").
    fn find_all_stream(&self) -> BoxStream<'_, Result<Domain>>;

    /// Unused by the scan core; retained only to document the full provider
    /// contract (spec §6).
    fn find_all_to_be_notified(&self, thresholds: NotificationThresholds) -> BoxStream<'_, Result<Domain>>;

    /// Upserts keyed by FQDN; idempotent on (FQDN, LastCheckAt) (spec §6).
    async fn save(&self, domain: &Domain) -> Result<()>;

    async fn save_current_scan(&self, scan: &CurrentScan) -> Result<()>;

    async fn save_scan(&self, scan: &Scan) -> Result<()>;

    /// Reads back the progress record the Collector maintains during a scan
    /// (spec §4.6); the ambient status surface polls this.
    async fn current_scan(&self) -> Option<CurrentScan>;

    /// Reads back the most recently finished scan's persisted record
    /// (spec §6 "Persisted scan record"); the ambient metrics surface
    /// exposes its counters.
    async fn latest_scan(&self) -> Option<Scan>;
}
