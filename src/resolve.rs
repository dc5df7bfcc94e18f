//! External nameserver IP resolution (spec §4.4.2: "if host has no IP and
//! is outside the zone being scanned, attempt an external resolution").
//! Delegates to the OS resolver via `tokio::net::lookup_host`; this is
//! plain hostname resolution, not the recursive DNS resolution spec.md §1
//! excludes from the core's scope.

use std::net::IpAddr;

use tracing::debug;

/// Resolves `host` to an IP address by asking the system resolver,
/// preferring IPv4 when both families are returned. `None` means the
/// caller should record `UnknownHost` without invoking the transport
/// (spec §4.1 edge case).
pub async fn resolve_nameserver_ip(host: &str) -> Option<IpAddr> {
    let lookup_target = format!("{}:0", host.trim_end_matches('.'));
    match tokio::net::lookup_host(&lookup_target).await {
        Ok(addrs) => {
            let mut addrs: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
            addrs.sort_by_key(|ip| !ip.is_ipv4());
            addrs.into_iter().next()
        }
        Err(e) => {
            debug!("failed to resolve nameserver host {}: {}", host, e);
            None
        }
    }
}
