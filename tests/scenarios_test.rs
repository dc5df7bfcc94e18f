//! End-to-end scenario tests (spec §8, S1-S6): each drives the real
//! three-stage pipeline (`pipeline::run_cycle`) against an in-process UDP
//! stub nameserver instead of the network, the way the teacher crate's own
//! integration tests stand up a resolver against hand-built packets rather
//! than live DNS.

mod common;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::broadcast;

use warden::clock::{Clock, FixedClock, SystemClock};
use warden::dns::DNSResourceType;
use warden::dnssec::{compute_ds_digest, DigestType, DnsSecAlgorithm};
use warden::dns::resource::DnskeyData;
use warden::model::{Domain, DsRecord, DsStatus, Nameserver, NameserverStatus};
use warden::persistence::{InMemoryStore, Store};
use warden::pipeline::{run_cycle, PipelineConfig};

use common::{encode_response, encode_rr, soa_rdata, spawn_stub, TestKey};

fn base_pipeline_config(dns_port: u16) -> PipelineConfig {
    PipelineConfig {
        number_of_queriers: 2,
        domains_buffer_size: 8,
        udp_max_size: 4096,
        dns_port,
        query_timeout: Duration::from_millis(500),
        max_ok_verification_days: 30,
        max_error_verification_days: 7,
        max_expiration_alert_days: 7,
    }
}

async fn run_single_cycle(store: Arc<InMemoryStore>, config: PipelineConfig) {
    run_single_cycle_at(store, config, &SystemClock).await;
}

/// Like [`run_single_cycle`] but pins "now" to `clock` instead of the
/// system clock, so the RRSIG inception/expiration window a scenario
/// signs against (s2, s6) is checked against the same instant the test
/// asserts on rather than whatever `Utc::now()` happens to read when the
/// cycle actually runs.
async fn run_single_cycle_at(store: Arc<InMemoryStore>, config: PipelineConfig, clock: &dyn Clock) {
    let dyn_store: Arc<dyn Store> = store;
    let (cancel_tx, _) = broadcast::channel(1);
    run_cycle(dyn_store, &config, clock, &cancel_tx).await;
}

#[tokio::test]
async fn s1_happy_path_no_dnssec() {
    let stub = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = stub.local_addr().unwrap().port();
    drop(stub);
    let bind_addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    spawn_stub(bind_addr, |request| {
        encode_response(request, true, 0, &[encode_rr("br.", DNSResourceType::SOA, 3600, &soa_rdata(2013112600))])
    });

    let store = Arc::new(InMemoryStore::new());
    let mut domain = Domain::new("br.");
    let mut ns = Nameserver::new("ns1.br.");
    ns.ipv4 = Some(Ipv4Addr::LOCALHOST);
    domain.nameservers.push(ns);
    store.insert(domain);

    run_single_cycle(store.clone(), base_pipeline_config(port)).await;

    let scanned = store.get("br.").unwrap();
    assert_eq!(scanned.nameservers[0].last_status, NameserverStatus::Ok);
    assert!(scanned.nameservers[0].last_ok_at.is_some());
}

#[tokio::test]
async fn s2_happy_dnssec() {
    let key = TestKey::generate();
    let zone = "br.";
    let now = chrono::Utc::now().timestamp() as u32;
    let rrsig_rdata = key.sign_dnskey_rrset(zone, now - 60, now + 10);

    let dnskey = DnskeyData {
        flags: key.flags,
        protocol: key.protocol,
        algorithm: key.algorithm,
        public_key: key.public_key.clone(),
    };
    let digest = compute_ds_digest(zone, &dnskey, DigestType::Sha256).unwrap();
    let ds = DsRecord {
        keytag: key.key_tag(),
        algorithm: DnsSecAlgorithm::Ed25519,
        digest_type: DigestType::Sha256,
        digest,
        last_status: DsStatus::Uninitialized,
        last_check_at: None,
        last_ok_at: None,
        expires_at: None,
    };

    let stub = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = stub.local_addr().unwrap().port();
    drop(stub);
    let bind_addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    let dnskey_rdata = key.dnskey_rdata();
    spawn_stub(bind_addr, move |request| {
        let qtype = request.questions[0].qtype;
        if qtype == DNSResourceType::SOA {
            encode_response(request, true, 0, &[encode_rr("br.", DNSResourceType::SOA, 3600, &soa_rdata(1))])
        } else {
            encode_response(
                request,
                true,
                0,
                &[
                    encode_rr("br.", DNSResourceType::DNSKEY, 3600, &dnskey_rdata),
                    encode_rr("br.", DNSResourceType::RRSIG, 3600, &rrsig_rdata),
                ],
            )
        }
    });

    let store = Arc::new(InMemoryStore::new());
    let mut domain = Domain::new("br.");
    let mut ns = Nameserver::new("ns1.br.");
    ns.ipv4 = Some(Ipv4Addr::LOCALHOST);
    domain.nameservers.push(ns);
    domain.ds_set.push(ds);
    store.insert(domain);

    // Pin "now" to the same instant the RRSIG was signed against, rather
    // than whatever wall-clock time the cycle happens to run at, so the
    // signature window check is deterministic.
    let fixed_now = chrono::DateTime::from_timestamp(now as i64, 0).unwrap();
    run_single_cycle_at(store.clone(), base_pipeline_config(port), &FixedClock(fixed_now)).await;

    let scanned = store.get("br.").unwrap();
    assert_eq!(scanned.nameservers[0].last_status, NameserverStatus::Ok);
    assert_eq!(scanned.ds_set[0].last_status, DsStatus::Ok);
    let expected_expiration = chrono::DateTime::from_timestamp((now + 10) as i64, 0).unwrap();
    assert_eq!(scanned.ds_set[0].expires_at, Some(expected_expiration));
}

#[tokio::test]
async fn s3_timeout() {
    // A bound but never-serviced socket: the client's datagram is received
    // into the kernel buffer but nothing calls recv(), so the query times
    // out instead of erroring immediately.
    let reserved = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = reserved.local_addr().unwrap().port();

    let store = Arc::new(InMemoryStore::new());
    let mut domain = Domain::new("example.");
    let mut ns = Nameserver::new("unreachable.example.");
    ns.ipv4 = Some(Ipv4Addr::LOCALHOST);
    domain.nameservers.push(ns);
    store.insert(domain);

    let mut config = base_pipeline_config(port);
    config.query_timeout = Duration::from_millis(150);
    run_single_cycle(store.clone(), config).await;
    drop(reserved);

    let scanned = store.get("example.").unwrap();
    assert_eq!(scanned.nameservers[0].last_status, NameserverStatus::Timeout);
}

#[tokio::test]
async fn s4_unknown_host() {
    let store = Arc::new(InMemoryStore::new());
    let mut domain = Domain::new("br.br.");
    // No literal IPv4/IPv6 glue and a name under the IANA-reserved
    // `.invalid` TLD (RFC 2606), which is guaranteed never to resolve.
    let ns = Nameserver::new("nameserver.invalid.");
    domain.nameservers.push(ns);
    store.insert(domain);

    run_single_cycle(store.clone(), base_pipeline_config(15999)).await;

    let scanned = store.get("br.br.").unwrap();
    assert_eq!(scanned.nameservers[0].last_status, NameserverStatus::UnknownHost);
}

#[tokio::test]
async fn s5_out_of_sync_serials_downgrades_second_lexicographically() {
    let stub_a = UdpSocket::bind("127.0.0.2:0").await.unwrap();
    let port = stub_a.local_addr().unwrap().port();
    drop(stub_a);
    let addr_a: SocketAddr = format!("127.0.0.2:{port}").parse().unwrap();
    let addr_b: SocketAddr = format!("127.0.0.3:{port}").parse().unwrap();

    spawn_stub(addr_a, |request| {
        encode_response(request, true, 0, &[encode_rr("example.", DNSResourceType::SOA, 3600, &soa_rdata(100))])
    });
    spawn_stub(addr_b, |request| {
        encode_response(request, true, 0, &[encode_rr("example.", DNSResourceType::SOA, 3600, &soa_rdata(101))])
    });

    let store = Arc::new(InMemoryStore::new());
    let mut domain = Domain::new("example.");
    let mut ns1 = Nameserver::new("ns1.example.");
    ns1.ipv4 = Some(Ipv4Addr::new(127, 0, 0, 2));
    let mut ns2 = Nameserver::new("ns2.example.");
    ns2.ipv4 = Some(Ipv4Addr::new(127, 0, 0, 3));
    domain.nameservers.push(ns1);
    domain.nameservers.push(ns2);
    store.insert(domain);

    run_single_cycle(store.clone(), base_pipeline_config(port)).await;

    let scanned = store.get("example.").unwrap();
    assert_eq!(scanned.nameservers[0].last_status, NameserverStatus::Ok, "first lexicographically keeps its status");
    assert_eq!(scanned.nameservers[1].last_status, NameserverStatus::NotSynchronized);
}

#[tokio::test]
async fn s6_expired_signature() {
    let key = TestKey::generate();
    let zone = "br.";
    // Expired well before "now": inception and expiration both in 1970.
    let rrsig_rdata = key.sign_dnskey_rrset(zone, 0, 1);

    let dnskey = DnskeyData {
        flags: key.flags,
        protocol: key.protocol,
        algorithm: key.algorithm,
        public_key: key.public_key.clone(),
    };
    let digest = compute_ds_digest(zone, &dnskey, DigestType::Sha256).unwrap();
    let ds = DsRecord {
        keytag: key.key_tag(),
        algorithm: DnsSecAlgorithm::Ed25519,
        digest_type: DigestType::Sha256,
        digest,
        last_status: DsStatus::Uninitialized,
        last_check_at: None,
        last_ok_at: None,
        expires_at: None,
    };

    let stub = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = stub.local_addr().unwrap().port();
    drop(stub);
    let bind_addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    let dnskey_rdata = key.dnskey_rdata();
    spawn_stub(bind_addr, move |request| {
        let qtype = request.questions[0].qtype;
        if qtype == DNSResourceType::SOA {
            encode_response(request, true, 0, &[encode_rr("br.", DNSResourceType::SOA, 3600, &soa_rdata(1))])
        } else {
            encode_response(
                request,
                true,
                0,
                &[
                    encode_rr("br.", DNSResourceType::DNSKEY, 3600, &dnskey_rdata),
                    encode_rr("br.", DNSResourceType::RRSIG, 3600, &rrsig_rdata),
                ],
            )
        }
    });

    let store = Arc::new(InMemoryStore::new());
    let mut domain = Domain::new("br.");
    let mut ns = Nameserver::new("ns1.br.");
    ns.ipv4 = Some(Ipv4Addr::LOCALHOST);
    domain.nameservers.push(ns);
    domain.ds_set.push(ds);
    store.insert(domain);

    // Pin "now" well after the 1970 expiration instead of relying on the
    // system clock always having moved past it.
    let fixed_now = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    run_single_cycle_at(store.clone(), base_pipeline_config(port), &FixedClock(fixed_now)).await;

    let scanned = store.get("br.").unwrap();
    assert_eq!(scanned.ds_set[0].last_status, DsStatus::ExpiredSignature);
    assert_eq!(scanned.ds_set[0].expires_at, chrono::DateTime::from_timestamp(1, 0));
}
