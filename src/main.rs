use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use warden::clock::SystemClock;
use warden::config_reload::ConfigWatcher;
use warden::persistence::{InMemoryStore, Store};
use warden::pipeline::{run_cycle, PipelineConfig};

/// DNS/DNSSEC zone configuration auditor.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "warden.toml")]
    config: PathBuf,

    /// Seconds to wait between scan cycles.
    #[arg(long, default_value_t = 3600)]
    cycle_interval_secs: u64,

    /// Run exactly one scan cycle and exit, instead of looping forever.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let watcher = match ConfigWatcher::start(cli.config.clone()).await {
        Ok(watcher) => watcher,
        Err(e) => {
            error!("failed to load configuration from {}: {}", cli.config.display(), e);
            return std::process::ExitCode::FAILURE;
        }
    };

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let clock = SystemClock;
    let (cancel_tx, _) = broadcast::channel(1);

    let http_config = watcher.snapshot().http;
    if http_config.enabled {
        let http_store = store.clone();
        let bind_addr = http_config.bind_addr;
        tokio::spawn(async move {
            if let Err(e) = warden::http::serve(bind_addr, http_store).await {
                error!("http status surface stopped: {}", e);
            }
        });
    }

    let shutdown_cancel = cancel_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received interrupt, cancelling in-flight scan cycle");
            let _ = shutdown_cancel.send(());
        }
    });

    // Subscribed once before the loop: a broadcast receiver only observes
    // values sent after it subscribes, so a fresh `subscribe()` each
    // iteration could miss a Ctrl-C that fired while a cycle was still
    // running and sit through the full interval before checking again.
    let mut shutdown_rx = cancel_tx.subscribe();

    loop {
        let scan_config = watcher.snapshot().scan;
        let pipeline_config = PipelineConfig {
            number_of_queriers: scan_config.number_of_queriers,
            domains_buffer_size: scan_config.domains_buffer_size,
            udp_max_size: scan_config.udp_max_size,
            dns_port: scan_config.dns_port,
            query_timeout: scan_config.query_timeout(),
            max_ok_verification_days: scan_config.max_ok_verification_days,
            max_error_verification_days: scan_config.max_error_verification_days,
            max_expiration_alert_days: scan_config.max_expiration_alert_days,
        };

        let summary = run_cycle(store.clone(), &pipeline_config, &clock, &cancel_tx).await;
        info!(
            "cycle {} complete: {} domains scanned, {} with DNSSEC",
            summary.scan.id, summary.scan.domains_scanned, summary.scan.domains_with_dnssec
        );

        if cli.once {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(cli.cycle_interval_secs)) => {}
            _ = shutdown_rx.recv() => {
                info!("cancelled between cycles, exiting");
                break;
            }
        }
    }

    std::process::ExitCode::SUCCESS
}
