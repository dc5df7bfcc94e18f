//! DS policy chain (spec §4.3): network-error classifier, DNS header
//! policy, then independent per-DS verification. Grounded directly on the
//! original `dspolicy.go` — same ordering, same pre-publish rollover
//! tolerance (a DNSKEY with no covering RRSIG is not fatal), same
//! whitespace-stripping before any cryptographic step.

use chrono::{DateTime, TimeZone, Utc};

use crate::dns::enums::{DNSResourceType, ResponseCode};
use crate::dns::resource::{DnskeyData, RrsigData};
use crate::dnssec::{compute_ds_digest, verify_dnskey_rrset};
use crate::model::{DsRecord, DsStatus};

use super::ProbeOutcome;

/// Runs the DS policy chain for every DS record of `zone` against a single
/// DNSKEY-query outcome, mutating each record's status and `expires_at` in
/// place (spec §4.3 "evaluate independently").
pub fn evaluate_all(ds_set: &mut [DsRecord], outcome: &ProbeOutcome, zone: &str, now: DateTime<Utc>) {
    let response = match network_error_policy(outcome) {
        Ok(response) => response,
        Err(status) => {
            for ds in ds_set.iter_mut() {
                ds.last_status = status;
            }
            return;
        }
    };

    if let Err(status) = dns_header_policy(response) {
        for ds in ds_set.iter_mut() {
            ds.last_status = status;
        }
        return;
    }

    let dnskeys: Vec<DnskeyData> = response
        .answers
        .iter()
        .filter(|rr| rr.rtype == DNSResourceType::DNSKEY)
        .filter_map(|rr| rr.as_dnskey())
        .collect();
    let dnskey_rdatas: Vec<Vec<u8>> = response
        .answers
        .iter()
        .filter(|rr| rr.rtype == DNSResourceType::DNSKEY)
        .map(|rr| rr.rdata.clone())
        .collect();
    let rrsigs: Vec<RrsigData> = response
        .answers
        .iter()
        .filter(|rr| rr.rtype == DNSResourceType::RRSIG)
        .filter_map(|rr| rr.as_rrsig())
        .filter(|rrsig| rrsig.type_covered == DNSResourceType::DNSKEY)
        .collect();

    for ds in ds_set.iter_mut() {
        let (status, expires_at) = evaluate_one(ds, zone, &dnskeys, &dnskey_rdatas, &rrsigs, now);
        ds.last_status = status;
        if let Some(expires_at) = expires_at {
            ds.expires_at = Some(expires_at);
        }
    }
}

fn network_error_policy(outcome: &ProbeOutcome) -> Result<&crate::dns::DNSPacket, DsStatus> {
    match outcome {
        ProbeOutcome::Response(packet) => Ok(packet),
        ProbeOutcome::UnknownHost | ProbeOutcome::ConnectionFailure => Err(DsStatus::DnsError),
        ProbeOutcome::Timeout => Err(DsStatus::Timeout),
    }
}

fn dns_header_policy(response: &crate::dns::DNSPacket) -> Result<(), DsStatus> {
    if response.rcode() == ResponseCode::NoError && response.header.aa {
        Ok(())
    } else {
        Err(DsStatus::DnsError)
    }
}

/// Evaluates a single DS record per spec §4.3.3 steps (b)–(g). Returns the
/// terminal status and, when observed, the signature expiration to record
/// (preserved unchanged when no RRSIG was present, per the pre-publish
/// rollover tolerance).
fn evaluate_one(
    ds: &DsRecord,
    zone: &str,
    dnskeys: &[DnskeyData],
    dnskey_rdatas: &[Vec<u8>],
    rrsigs: &[RrsigData],
    now: DateTime<Utc>,
) -> (DsStatus, Option<DateTime<Utc>>) {
    let selected_dnskey = match dnskeys
        .iter()
        .find(|k| crate::dnssec::calculate_key_tag(k.flags, k.protocol, k.algorithm, &k.stripped_public_key()) == ds.keytag)
    {
        Some(k) => k,
        None => return (DsStatus::NoKey, None),
    };

    if !selected_dnskey.is_sep() {
        return (DsStatus::NoSep, None);
    }

    let selected_rrsig = rrsigs.iter().find(|r| r.key_tag == ds.keytag);

    let mut expires_at = None;

    if let Some(rrsig) = selected_rrsig {
        let expiration = Utc
            .timestamp_opt(rrsig.expiration as i64, 0)
            .single()
            .unwrap_or(ds.expires_at.unwrap_or(now));
        expires_at = Some(expiration);

        let inception = Utc.timestamp_opt(rrsig.inception as i64, 0).single();
        let within_window = inception.map(|i| now >= i).unwrap_or(true) && now <= expiration;
        if !within_window {
            return (DsStatus::ExpiredSignature, expires_at);
        }

        if verify_dnskey_rrset(rrsig, zone, dnskey_rdatas, selected_dnskey).is_err() {
            return (DsStatus::SignatureError, expires_at);
        }
    }

    let computed = compute_ds_digest(zone, selected_dnskey, ds.digest_type);
    match computed {
        Some(digest) if digest.eq_ignore_ascii_case(&ds.digest) => (DsStatus::Ok, expires_at),
        _ => (DsStatus::NoKey, expires_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnssec::{calculate_key_tag, DigestType, DnsSecAlgorithm};

    fn sep_dnskey() -> DnskeyData {
        DnskeyData {
            flags: 0x0101, // KSK + SEP
            protocol: 3,
            algorithm: 5,
            public_key: vec![1, 2, 3, 4, 5, 6, 7, 8],
        }
    }

    fn ds_for(zone: &str, dnskey: &DnskeyData, digest_type: DigestType) -> DsRecord {
        let keytag = calculate_key_tag(
            dnskey.flags,
            dnskey.protocol,
            dnskey.algorithm,
            &dnskey.stripped_public_key(),
        );
        let digest = compute_ds_digest(zone, dnskey, digest_type).unwrap();
        DsRecord {
            keytag,
            algorithm: DnsSecAlgorithm::RsaSha1,
            digest_type,
            digest,
            last_status: DsStatus::Uninitialized,
            last_check_at: None,
            last_ok_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn matching_dnskey_without_rrsig_is_ok_prepublish_tolerant() {
        let dnskey = sep_dnskey();
        let ds = ds_for("example.", &dnskey, DigestType::Sha256);
        let (status, expires_at) = evaluate_one(&ds, "example.", &[dnskey], &[], &[], Utc::now());
        assert_eq!(status, DsStatus::Ok);
        assert_eq!(expires_at, None, "ExpiresAt is preserved, not overwritten, when no RRSIG is present");
    }

    #[test]
    fn missing_sep_flag_is_no_sep() {
        let mut dnskey = sep_dnskey();
        dnskey.flags = 0x0100; // KSK bit without SEP
        let ds = ds_for("example.", &dnskey, DigestType::Sha256);
        let (status, _) = evaluate_one(&ds, "example.", &[dnskey], &[], &[], Utc::now());
        assert_eq!(status, DsStatus::NoSep);
    }

    #[test]
    fn no_matching_dnskey_is_no_key() {
        let dnskey = sep_dnskey();
        let ds = ds_for("example.", &dnskey, DigestType::Sha256);
        let (status, _) = evaluate_one(&ds, "example.", &[], &[], &[], Utc::now());
        assert_eq!(status, DsStatus::NoKey);
    }

    #[test]
    fn digest_mismatch_is_no_key() {
        let dnskey = sep_dnskey();
        let mut ds = ds_for("example.", &dnskey, DigestType::Sha256);
        ds.digest = "0000000000000000000000000000000000000000000000000000000000000000".to_string();
        let (status, _) = evaluate_one(&ds, "example.", &[dnskey], &[], &[], Utc::now());
        assert_eq!(status, DsStatus::NoKey);
    }
}
