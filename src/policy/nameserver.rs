//! Nameserver policy chain (spec §4.2): network-error classifier, RCODE
//! policy, authority policy, CNAME policy, SOA presence — in that order,
//! the first failing check short-circuits the rest. Serial-mismatch
//! downgrading to `NotSynchronized` is a post-aggregation pass the Querier
//! runs across all nameservers of a domain (spec §4.2.5, §4.4.3), not part
//! of this per-nameserver chain.

use crate::dns::enums::{DNSResourceType, ResponseCode};
use crate::model::NameserverStatus;

use super::ProbeOutcome;

/// Runs the ordered policy chain against a single nameserver's probe
/// outcome for `zone` (the apex name queried). Returns the terminal status;
/// callers are responsible for setting `LastCheckAt`/`LastOKAt` (spec §3
/// invariant) since those depend on the scan epoch, not the policy result.
pub fn evaluate(outcome: &ProbeOutcome, zone: &str) -> NameserverStatus {
    let response = match network_error_policy(outcome) {
        Ok(response) => response,
        Err(status) => return status,
    };

    if let Err(status) = rcode_policy(response) {
        return status;
    }
    if let Err(status) = authority_policy(response) {
        return status;
    }
    if let Err(status) = cname_policy(response, zone) {
        return status;
    }
    if let Err(status) = soa_presence_policy(response, zone) {
        return status;
    }

    NameserverStatus::Ok
}

fn network_error_policy(outcome: &ProbeOutcome) -> Result<&crate::dns::DNSPacket, NameserverStatus> {
    match outcome {
        ProbeOutcome::Response(packet) => Ok(packet),
        ProbeOutcome::UnknownHost => Err(NameserverStatus::UnknownHost),
        ProbeOutcome::Timeout => Err(NameserverStatus::Timeout),
        ProbeOutcome::ConnectionFailure => Err(NameserverStatus::ConnectionFailure),
    }
}

fn rcode_policy(response: &crate::dns::DNSPacket) -> Result<(), NameserverStatus> {
    match response.rcode() {
        ResponseCode::NoError => Ok(()),
        ResponseCode::NameError => Err(NameserverStatus::UnknownDomainName),
        ResponseCode::ServerFailure => Err(NameserverStatus::ServerFailure),
        ResponseCode::Refused => Err(NameserverStatus::QueryRefused),
        ResponseCode::Other(_) => Err(NameserverStatus::Error),
    }
}

fn authority_policy(response: &crate::dns::DNSPacket) -> Result<(), NameserverStatus> {
    if response.header.aa {
        Ok(())
    } else {
        Err(NameserverStatus::NoAuthority)
    }
}

fn cname_policy(response: &crate::dns::DNSPacket, zone: &str) -> Result<(), NameserverStatus> {
    let apex = zone.trim_end_matches('.').to_ascii_lowercase();
    let has_apex_cname = response.answers.iter().any(|rr| {
        rr.rtype == DNSResourceType::CNAME && rr.name().trim_end_matches('.').to_ascii_lowercase() == apex
    });
    if has_apex_cname {
        Err(NameserverStatus::CanonicalName)
    } else {
        Ok(())
    }
}

fn soa_presence_policy(response: &crate::dns::DNSPacket, zone: &str) -> Result<(), NameserverStatus> {
    if soa_serial(response, zone).is_some() {
        Ok(())
    } else {
        Err(NameserverStatus::Error)
    }
}

/// Extracts the SOA serial for `zone` from a response's answer section, for
/// both the presence check above and the Querier's cross-nameserver serial
/// comparison (spec §4.4.3).
pub fn soa_serial(response: &crate::dns::DNSPacket, zone: &str) -> Option<u32> {
    let apex = zone.trim_end_matches('.').to_ascii_lowercase();
    response
        .answers
        .iter()
        .find(|rr| {
            rr.rtype == DNSResourceType::SOA && rr.name().trim_end_matches('.').to_ascii_lowercase() == apex
        })
        .and_then(|rr| rr.as_soa())
        .map(|soa| soa.serial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::header::DNSHeader;
    use crate::dns::{DNSPacket, DNSQuestion, DNSResource, DNSResourceClass};

    fn base_header() -> DNSHeader {
        DNSHeader {
            id: 1,
            qr: true,
            opcode: 0,
            aa: true,
            tc: false,
            rd: false,
            ra: false,
            z: 0,
            rcode: 0,
            qdcount: 1,
            ancount: 1,
            nscount: 0,
            arcount: 0,
        }
    }

    fn soa_answer(zone: &str, serial: u32) -> DNSResource {
        let mut rdata = Vec::new();
        rdata.push(0); // MNAME root
        rdata.push(0); // RNAME root
        rdata.extend_from_slice(&serial.to_be_bytes());
        rdata.extend_from_slice(&0u32.to_be_bytes()); // refresh
        rdata.extend_from_slice(&0u32.to_be_bytes()); // retry
        rdata.extend_from_slice(&0u32.to_be_bytes()); // expire
        rdata.extend_from_slice(&0u32.to_be_bytes()); // minimum
        DNSResource {
            labels: zone.trim_end_matches('.').split('.').map(str::to_string).collect(),
            rtype: DNSResourceType::SOA,
            rclass: DNSResourceClass::IN,
            ttl: 3600,
            rdata,
        }
    }

    #[test]
    fn happy_path_is_ok() {
        let response = DNSPacket {
            header: base_header(),
            questions: vec![DNSQuestion::new("br.", DNSResourceType::SOA)],
            answers: vec![soa_answer("br.", 2013112600)],
            authorities: vec![],
            additional: vec![],
        };
        let outcome = ProbeOutcome::Response(response);
        assert_eq!(evaluate(&outcome, "br."), NameserverStatus::Ok);
    }

    #[test]
    fn timeout_short_circuits() {
        assert_eq!(evaluate(&ProbeOutcome::Timeout, "br."), NameserverStatus::Timeout);
    }

    #[test]
    fn unknown_host_short_circuits_before_transport() {
        assert_eq!(
            evaluate(&ProbeOutcome::UnknownHost, "br.br."),
            NameserverStatus::UnknownHost
        );
    }

    #[test]
    fn missing_authority_bit_is_no_authority() {
        let mut header = base_header();
        header.aa = false;
        let response = DNSPacket {
            header,
            questions: vec![DNSQuestion::new("br.", DNSResourceType::SOA)],
            answers: vec![soa_answer("br.", 1)],
            authorities: vec![],
            additional: vec![],
        };
        assert_eq!(
            evaluate(&ProbeOutcome::Response(response), "br."),
            NameserverStatus::NoAuthority
        );
    }

    #[test]
    fn nxdomain_maps_to_unknown_domain_name() {
        let mut header = base_header();
        header.rcode = 3;
        header.ancount = 0;
        let response = DNSPacket {
            header,
            questions: vec![DNSQuestion::new("br.", DNSResourceType::SOA)],
            answers: vec![],
            authorities: vec![],
            additional: vec![],
        };
        assert_eq!(
            evaluate(&ProbeOutcome::Response(response), "br."),
            NameserverStatus::UnknownDomainName
        );
    }
}
