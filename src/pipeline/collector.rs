//! Collector (spec §4.6): persists scanned domains and maintains a running
//! `CurrentScan` progress record the out-of-scope REST layer polls.
//! Terminates after observing one poison pill per querier.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::debug;

use crate::model::{CurrentScan, Domain, Scan};
use crate::persistence::Store;

pub struct CollectorOutcome {
    pub domains_scanned: u64,
    pub domains_with_dnssec: u64,
    pub nameserver_statistics: HashMap<String, u64>,
    pub ds_statistics: HashMap<String, u64>,
}

/// Consumes scanned domains from `rx`, persisting each and updating
/// `CurrentScan` as it goes, until `queriers` poison pills have been seen.
pub async fn run(
    store: &dyn Store,
    mut rx: mpsc::Receiver<Option<Domain>>,
    queriers: usize,
    started_at: DateTime<Utc>,
) -> CollectorOutcome {
    let mut sentinels_seen = 0usize;
    let mut domains_scanned = 0u64;
    let mut domains_with_dnssec = 0u64;
    let mut nameserver_statistics: HashMap<String, u64> = HashMap::new();
    let mut ds_statistics: HashMap<String, u64> = HashMap::new();

    while sentinels_seen < queriers {
        match rx.recv().await {
            Some(Some(domain)) => {
                for ns in &domain.nameservers {
                    *nameserver_statistics.entry(format!("{:?}", ns.last_status)).or_insert(0) += 1;
                }
                if !domain.ds_set.is_empty() {
                    domains_with_dnssec += 1;
                    for ds in &domain.ds_set {
                        *ds_statistics.entry(format!("{:?}", ds.last_status)).or_insert(0) += 1;
                    }
                }
                domains_scanned += 1;

                if let Err(e) = store.save(&domain).await {
                    tracing::warn!("failed to persist scanned domain {}: {}", domain.fqdn, e);
                }

                let progress = CurrentScan {
                    started_at,
                    domains_scanned,
                    last_domain_checked_at: domain.last_check_at,
                };
                if let Err(e) = store.save_current_scan(&progress).await {
                    tracing::warn!("failed to persist scan progress: {}", e);
                }
            }
            Some(None) => {
                sentinels_seen += 1;
            }
            None => break,
        }
    }

    debug!("collector received all {} sentinels, {} domains scanned", queriers, domains_scanned);

    CollectorOutcome {
        domains_scanned,
        domains_with_dnssec,
        nameserver_statistics,
        ds_statistics,
    }
}

impl CollectorOutcome {
    pub fn into_scan(self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Scan {
        Scan {
            id: uuid::Uuid::new_v4(),
            started_at,
            finished_at,
            domains_scanned: self.domains_scanned,
            domains_with_dnssec: self.domains_with_dnssec,
            nameserver_statistics: self.nameserver_statistics,
            ds_statistics: self.ds_statistics,
        }
    }
}
