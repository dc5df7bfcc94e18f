//! Scan Controller (spec §4.7): wires the three pipeline stages for a
//! single cycle, waits for the Collector to terminate, and finalizes the
//! scan record. Cancellation follows the teacher's `graceful_shutdown.rs`
//! pattern — a `broadcast::channel(1)` every stage subscribes to and
//! checks at each channel operation (spec §5 "Cancellation").

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::info;

use crate::clock::Clock;
use crate::model::{Domain, Scan};
use crate::persistence::Store;

use super::injector::{self, VerificationThresholds};
use super::querier::{self, QuerierSettings};
use super::collector;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub number_of_queriers: usize,
    pub domains_buffer_size: usize,
    pub udp_max_size: u16,
    pub dns_port: u16,
    pub query_timeout: Duration,
    pub max_ok_verification_days: i64,
    pub max_error_verification_days: i64,
    pub max_expiration_alert_days: i64,
}

pub struct CycleSummary {
    pub scan: Scan,
}

/// Runs exactly one scan cycle end to end: creates the two bounded
/// channels, launches `N` queriers and one collector sharing them, launches
/// the injector against `store`, and waits for the collector to drain
/// (spec §4.7).
pub async fn run_cycle(
    store: Arc<dyn Store>,
    config: &PipelineConfig,
    clock: &dyn Clock,
    cancel: &broadcast::Sender<()>,
) -> CycleSummary {
    let started_at = clock.now();
    info!("starting scan cycle at {}", started_at);

    let (candidate_tx, candidate_rx) = mpsc::channel::<Option<Domain>>(config.domains_buffer_size);
    let (scanned_tx, scanned_rx) = mpsc::channel::<Option<Domain>>(config.domains_buffer_size);
    let candidate_rx = Arc::new(Mutex::new(candidate_rx));

    let querier_settings = QuerierSettings {
        dns_port: config.dns_port,
        udp_max_size: config.udp_max_size,
        query_timeout: config.query_timeout,
    };

    let mut querier_handles = Vec::with_capacity(config.number_of_queriers);
    for _ in 0..config.number_of_queriers {
        let rx = candidate_rx.clone();
        let tx = scanned_tx.clone();
        let settings = querier_settings;
        let cancel_rx = cancel.subscribe();
        querier_handles.push(tokio::spawn(async move {
            querier::run(rx, tx, settings, started_at, cancel_rx).await;
        }));
    }
    drop(scanned_tx);

    let injector_store = store.clone();
    let thresholds = VerificationThresholds {
        max_ok_days: config.max_ok_verification_days,
        max_error_days: config.max_error_verification_days,
        max_expiration_alert_days: config.max_expiration_alert_days,
    };
    let injector_cancel = cancel.subscribe();
    let number_of_queriers = config.number_of_queriers;
    let injector_handle = tokio::spawn(async move {
        injector::run(
            injector_store.as_ref(),
            thresholds,
            started_at,
            candidate_tx,
            number_of_queriers,
            injector_cancel,
        )
        .await;
    });

    let outcome = collector::run(store.as_ref(), scanned_rx, config.number_of_queriers, started_at).await;

    let _ = injector_handle.await;
    for handle in querier_handles {
        if let Err(e) = handle.await {
            tracing::error!("querier task panicked, affected domain dropped from this cycle: {}", e);
        }
    }

    let finished_at = clock.now();
    let scan = outcome.into_scan(started_at, finished_at);
    if let Err(e) = store.save_scan(&scan).await {
        tracing::warn!("failed to persist scan record: {}", e);
    }

    info!(
        "scan cycle finished: {} domains scanned, {} with DNSSEC",
        scan.domains_scanned, scan.domains_with_dnssec
    );

    CycleSummary { scan }
}
