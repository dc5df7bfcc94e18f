//! Ambient HTTP status surface (spec §6 "the REST server ... out of
//! scope"; this is not that server — it is the thin health/progress
//! surface an operator or orchestrator polls, grounded on the teacher's
//! `http_server.rs` route/`AppState` shape and `metrics.rs` naming
//! conventions, but reporting only the counters this auditor actually
//! keeps: a hand-rolled Prometheus exposition rather than pulling in the
//! teacher's `prometheus` registry for two gauges and two maps).

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::persistence::Store;

#[derive(Clone)]
struct AppState {
    store: Arc<dyn Store>,
}

pub async fn serve(bind_addr: SocketAddr, store: Arc<dyn Store>) -> std::io::Result<()> {
    let state = AppState { store };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/status/current-scan", get(current_scan))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("http status surface listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn current_scan(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.current_scan().await {
        Some(progress) => (StatusCode::OK, Json(json!(progress))).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "no scan has run yet"}))).into_response(),
    }
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let mut out = String::new();

    if let Some(scan) = state.store.latest_scan().await {
        let _ = writeln!(
            out,
            "# HELP warden_domains_scanned_total Domains scanned in the most recent cycle.\n\
             # TYPE warden_domains_scanned_total counter\n\
             warden_domains_scanned_total {}",
            scan.domains_scanned
        );
        let _ = writeln!(
            out,
            "# HELP warden_domains_with_dnssec_total Domains carrying at least one DS record.\n\
             # TYPE warden_domains_with_dnssec_total counter\n\
             warden_domains_with_dnssec_total {}",
            scan.domains_with_dnssec
        );

        let _ = writeln!(
            out,
            "# HELP warden_nameserver_status_total Nameservers observed per status in the most recent cycle.\n\
             # TYPE warden_nameserver_status_total gauge"
        );
        for (status, count) in &scan.nameserver_statistics {
            let _ = writeln!(out, "warden_nameserver_status_total{{status=\"{}\"}} {}", status, count);
        }

        let _ = writeln!(
            out,
            "# HELP warden_ds_status_total DS records observed per status in the most recent cycle.\n\
             # TYPE warden_ds_status_total gauge"
        );
        for (status, count) in &scan.ds_statistics {
            let _ = writeln!(out, "warden_ds_status_total{{status=\"{}\"}} {}", status, count);
        }
    }

    (StatusCode::OK, [("content-type", "text/plain; version=0.0.4")], out)
}
