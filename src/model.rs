//! The persisted data model (spec §3): `Domain`, `Nameserver`, `DsRecord`,
//! their status enums, and the scan bookkeeping records (`Scan`,
//! `CurrentScan`) the collector writes and the out-of-scope REST layer
//! reads. Domain, Nameserver and DsRecord form a tree with no
//! back-references (design note, spec §9): owners are plain values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::dnssec::{DigestType, DnsSecAlgorithm};

/// A domain registered for continuous DNS/DNSSEC auditing. Mutated by the
/// scan core only in its status fields, timestamps, and DS expiry; created
/// and deleted only by the (out-of-scope) REST layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    pub id: Uuid,
    pub fqdn: String,
    pub nameservers: Vec<Nameserver>,
    pub ds_set: Vec<DsRecord>,
    pub owners: Vec<Owner>,
    pub last_check_at: Option<DateTime<Utc>>,
}

impl Domain {
    pub fn new(fqdn: impl Into<String>) -> Self {
        Domain {
            id: Uuid::new_v4(),
            fqdn: fqdn.into(),
            nameservers: Vec::new(),
            ds_set: Vec::new(),
            owners: Vec::new(),
            last_check_at: None,
        }
    }

    /// True when every nameserver has last been observed `OK`. Used by the
    /// injector's admission rule (spec §4.5) to widen the verification
    /// interval for healthy domains.
    pub fn all_nameservers_ok(&self) -> bool {
        !self.nameservers.is_empty()
            && self
                .nameservers
                .iter()
                .all(|ns| ns.last_status == NameserverStatus::Ok)
    }

    pub fn all_ds_ok(&self) -> bool {
        self.ds_set.iter().all(|ds| ds.last_status == DsStatus::Ok)
    }

    pub fn days_since_last_check(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_check_at
            .map(|last| (now - last).num_hours() / 24)
    }

    pub fn is_near_dnssec_expiration(&self, max_expiration_alert_days: i64, now: DateTime<Utc>) -> bool {
        self.ds_set.iter().any(|ds| match ds.expires_at {
            Some(expires_at) => (expires_at - now).num_days() <= max_expiration_alert_days,
            None => false,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub email: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nameserver {
    pub host: String,
    pub ipv4: Option<std::net::Ipv4Addr>,
    pub ipv6: Option<std::net::Ipv6Addr>,
    pub last_status: NameserverStatus,
    pub last_check_at: Option<DateTime<Utc>>,
    pub last_ok_at: Option<DateTime<Utc>>,
}

impl Nameserver {
    pub fn new(host: impl Into<String>) -> Self {
        Nameserver {
            host: host.into(),
            ipv4: None,
            ipv6: None,
            last_status: NameserverStatus::Uninitialized,
            last_check_at: None,
            last_ok_at: None,
        }
    }

    /// Applies a new status at `scan_epoch`, advancing `last_ok_at` only
    /// when the status transitions to `Ok` (spec §3 invariant: "LastOKAt is
    /// monotonic").
    pub fn apply_status(&mut self, status: NameserverStatus, scan_epoch: DateTime<Utc>) {
        self.last_check_at = Some(scan_epoch);
        if status == NameserverStatus::Ok {
            self.last_ok_at = Some(scan_epoch);
        }
        self.last_status = status;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameserverStatus {
    Uninitialized,
    Ok,
    Timeout,
    NoAuthority,
    UnknownDomainName,
    UnknownHost,
    ServerFailure,
    QueryRefused,
    ConnectionFailure,
    CanonicalName,
    NotSynchronized,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DsRecord {
    pub keytag: u16,
    pub algorithm: DnsSecAlgorithm,
    pub digest_type: DigestType,
    pub digest: String,
    pub last_status: DsStatus,
    pub last_check_at: Option<DateTime<Utc>>,
    pub last_ok_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl DsRecord {
    pub fn apply_status(&mut self, status: DsStatus, scan_epoch: DateTime<Utc>) {
        self.last_check_at = Some(scan_epoch);
        if status == DsStatus::Ok {
            self.last_ok_at = Some(scan_epoch);
        }
        self.last_status = status;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DsStatus {
    Uninitialized,
    Ok,
    Timeout,
    NoSignature,
    ExpiredSignature,
    NoKey,
    NoSep,
    SignatureError,
    DnsError,
}

/// Final record of a completed scan cycle, persisted via
/// `persistence::Store::save_scan` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub domains_scanned: u64,
    pub domains_with_dnssec: u64,
    pub nameserver_statistics: HashMap<String, u64>,
    pub ds_statistics: HashMap<String, u64>,
}

/// Running progress record the out-of-scope REST layer polls mid-cycle via
/// `persistence::Store::save_current_scan` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentScan {
    pub started_at: DateTime<Utc>,
    pub domains_scanned: u64,
    pub last_domain_checked_at: Option<DateTime<Utc>>,
}

impl CurrentScan {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        CurrentScan {
            started_at,
            domains_scanned: 0,
            last_domain_checked_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_ok_at_advances_only_on_ok() {
        let mut ns = Nameserver::new("ns1.example.");
        let t1 = Utc::now();
        ns.apply_status(NameserverStatus::Ok, t1);
        assert_eq!(ns.last_ok_at, Some(t1));

        let t2 = t1 + chrono::Duration::days(1);
        ns.apply_status(NameserverStatus::Timeout, t2);
        assert_eq!(ns.last_check_at, Some(t2));
        assert_eq!(ns.last_ok_at, Some(t1), "LastOKAt must not regress");
    }

    #[test]
    fn all_nameservers_ok_is_false_when_empty() {
        let domain = Domain::new("example.");
        assert!(!domain.all_nameservers_ok());
    }
}
