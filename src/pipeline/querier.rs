//! Querier (spec §4.4): for each candidate domain, probes every nameserver
//! with a SOA query, aggregates observed serials to catch out-of-sync
//! secondaries, then probes DNSKEY/RRSIG for DS verification when the
//! domain carries DS records and at least one nameserver answered
//! authoritatively.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use crate::dns::{DNSPacket, DNSResourceType, EdnsOpt};
use crate::model::{Domain, DsStatus, NameserverStatus};
use crate::policy::{ds as ds_policy, nameserver as nameserver_policy, ProbeOutcome};
use crate::resolve::resolve_nameserver_ip;
use crate::transport;

#[derive(Debug, Clone, Copy)]
pub struct QuerierSettings {
    pub dns_port: u16,
    pub udp_max_size: u16,
    pub query_timeout: Duration,
}

/// Runs one querier loop: pulls candidates off the shared `rx` (all
/// queriers in the pool lock the same receiver to consume from one input
/// channel, per spec §4.4 "All share the input and output channels"),
/// processes each, and forwards the scanned domain on `tx`. Forwards
/// exactly one poison pill per sentinel received (spec §4.4 "forwards
/// exactly one nil per distinct sentinel it receives, then exits").
pub async fn run(
    rx: std::sync::Arc<tokio::sync::Mutex<mpsc::Receiver<Option<Domain>>>>,
    tx: mpsc::Sender<Option<Domain>>,
    settings: QuerierSettings,
    cycle_start: DateTime<Utc>,
    mut cancel: broadcast::Receiver<()>,
) {
    loop {
        let item = tokio::select! {
            _ = cancel.recv() => {
                debug!("querier observed cancellation");
                break;
            }
            item = async { rx.lock().await.recv().await } => item,
        };

        match item {
            Some(Some(domain)) => {
                let scanned = process_domain(domain, &settings, cycle_start).await;
                if tx.send(Some(scanned)).await.is_err() {
                    break;
                }
            }
            Some(None) => {
                let _ = tx.send(None).await;
                break;
            }
            None => break,
        }
    }
}

async fn process_domain(mut domain: Domain, settings: &QuerierSettings, scan_epoch: DateTime<Utc>) -> Domain {
    let zone = domain.fqdn.clone();

    let mut resolved_ips: Vec<Option<IpAddr>> = Vec::with_capacity(domain.nameservers.len());
    let mut serials: Vec<(usize, u32, String)> = Vec::new();

    for (index, ns) in domain.nameservers.iter_mut().enumerate() {
        let ip = nameserver_ip(ns.ipv4.map(IpAddr::V4), ns.ipv6.map(IpAddr::V6), &ns.host).await;
        let outcome = match ip {
            None => ProbeOutcome::UnknownHost,
            Some(ip) => {
                let server = SocketAddr::new(ip, settings.dns_port);
                let query = DNSPacket::new_query(&zone, DNSResourceType::SOA, None);
                let result = transport::query(server, &query, settings.udp_max_size, settings.query_timeout).await;
                ProbeOutcome::from(result)
            }
        };

        if let ProbeOutcome::Response(ref response) = outcome {
            if let Some(serial) = nameserver_policy::soa_serial(response, &zone) {
                serials.push((index, serial, ns.host.clone()));
            }
        }

        let status = nameserver_policy::evaluate(&outcome, &zone);
        ns.apply_status(status, scan_epoch);
        resolved_ips.push(ip);
    }

    downgrade_out_of_sync(&mut domain, &serials);

    if !domain.ds_set.is_empty() {
        let ds_nameserver = domain
            .nameservers
            .iter()
            .enumerate()
            .find(|(_, ns)| ns.last_status == NameserverStatus::Ok)
            .and_then(|(index, _)| resolved_ips[index].map(|ip| (index, ip)));

        match ds_nameserver {
            Some((_, ip)) => {
                let server = SocketAddr::new(ip, settings.dns_port);
                let query = DNSPacket::new_query(
                    &zone,
                    DNSResourceType::DNSKEY,
                    Some(EdnsOpt::new(settings.udp_max_size, true)),
                );
                let result = transport::query(server, &query, settings.udp_max_size, settings.query_timeout).await;
                let outcome = ProbeOutcome::from(result);
                ds_policy::evaluate_all(&mut domain.ds_set, &outcome, &zone, scan_epoch);
            }
            None => {
                for ds in domain.ds_set.iter_mut() {
                    ds.last_status = DsStatus::DnsError;
                }
            }
        }
        for ds in domain.ds_set.iter_mut() {
            ds.last_check_at = Some(scan_epoch);
            if ds.last_status == DsStatus::Ok {
                ds.last_ok_at = Some(scan_epoch);
            }
        }
    }

    domain.last_check_at = Some(scan_epoch);
    domain
}

async fn nameserver_ip(ipv4: Option<IpAddr>, ipv6: Option<IpAddr>, host: &str) -> Option<IpAddr> {
    if let Some(ip) = ipv4.or(ipv6) {
        return Some(ip);
    }
    resolve_nameserver_ip(host).await
}

/// Downgrades any `Ok` nameserver whose observed SOA serial disagrees with
/// the plurality serial to `NotSynchronized` (spec §4.2.5, §4.4.3). Ties
/// are broken in favor of the lexicographically first host, matching the
/// literal S5 scenario ("the second lexicographically on a tie").
fn downgrade_out_of_sync(domain: &mut Domain, serials: &[(usize, u32, String)]) {
    if serials.len() < 2 {
        return;
    }

    let mut counts: HashMap<u32, Vec<&str>> = HashMap::new();
    for (_, serial, host) in serials {
        counts.entry(*serial).or_default().push(host);
    }

    let majority_serial = counts
        .iter()
        .max_by(|a, b| {
            a.1.len().cmp(&b.1.len()).then_with(|| {
                let a_min = a.1.iter().min().copied().unwrap_or_default();
                let b_min = b.1.iter().min().copied().unwrap_or_default();
                b_min.cmp(a_min)
            })
        })
        .map(|(serial, _)| *serial);

    let Some(majority_serial) = majority_serial else { return };

    for (index, serial, _) in serials {
        if *serial != majority_serial {
            if let Some(ns) = domain.nameservers.get_mut(*index) {
                ns.last_status = NameserverStatus::NotSynchronized;
            }
        }
    }
}
