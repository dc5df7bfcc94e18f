//! Cryptographic RRSIG verification over a DNSKEY RRset (RFC 4034 §3.1.8.1,
//! §6.3). This is the "DNS library" primitive spec.md §1's Non-goals say
//! the core depends on rather than hand-rolls; `ring` supplies the actual
//! signature algorithms, this module only builds the canonical signed
//! octet stream around them.

use crate::dns::common::name_to_wire;
use crate::dns::enums::DNSResourceType;
use crate::dns::resource::{DnskeyData, RrsigData};

use super::algorithm::DnsSecAlgorithm;
use super::errors::DnsSecError;

/// Verifies `rrsig` over `dnskey_rdatas` (the raw wire RDATA of every
/// DNSKEY in the RRset, including the signing key itself), signed by
/// `signer` at owner name `owner`.
pub fn verify_dnskey_rrset(
    rrsig: &RrsigData,
    owner: &str,
    dnskey_rdatas: &[Vec<u8>],
    signer: &DnskeyData,
) -> Result<(), DnsSecError> {
    let algorithm = DnsSecAlgorithm::from_u8(rrsig.algorithm)
        .ok_or(DnsSecError::UnsupportedAlgorithm(rrsig.algorithm))?;
    let verification_algorithm = algorithm
        .ring_algorithm()
        .ok_or(DnsSecError::UnsupportedAlgorithm(rrsig.algorithm))?;

    let message = signed_data(rrsig, owner, dnskey_rdatas);
    let public_key = ring_public_key(algorithm, &signer.stripped_public_key());
    let signature = rrsig.stripped_signature();

    ring::signature::UnparsedPublicKey::new(verification_algorithm, &public_key)
        .verify(&message, &signature)
        .map_err(|_| DnsSecError::SignatureVerificationFailed)
}

/// RSA public keys arrive in DNSKEY wire form as `exponent_len | exponent |
/// modulus` (RFC 3110 §2); `ring` wants the PKCS#1 `modulus | exponent`
/// encoding it parses internally from an ASN.1-free concatenation, so for
/// RSA we just hand it exponent+modulus split the same way the DNSKEY RDATA
/// already is. ECDSA/Ed25519 keys are raw point/scalar encodings `ring`
/// accepts as-is.
fn ring_public_key(algorithm: DnsSecAlgorithm, raw: &[u8]) -> Vec<u8> {
    match algorithm {
        DnsSecAlgorithm::RsaSha1 | DnsSecAlgorithm::RsaSha256 | DnsSecAlgorithm::RsaSha512 => {
            rsa_exponent_modulus_to_der_free(raw)
        }
        _ => raw.to_vec(),
    }
}

/// Re-packs RFC 3110 `(exponent_len, exponent, modulus)` into the plain
/// `(modulus, exponent)` byte concatenation `ring::signature::RSA_PKCS1_*`
/// verification expects via `UnparsedPublicKey`... in practice `ring`
/// expects a DER `RSAPublicKey`; building one from the two integers here
/// keeps the DNSSEC-specific parsing local to this module.
fn rsa_exponent_modulus_to_der_free(raw: &[u8]) -> Vec<u8> {
    if raw.is_empty() {
        return Vec::new();
    }
    let (exp_len, exp_start) = if raw[0] == 0 {
        if raw.len() < 3 {
            return Vec::new();
        }
        (u16::from_be_bytes([raw[1], raw[2]]) as usize, 3)
    } else {
        (raw[0] as usize, 1)
    };
    if exp_start + exp_len > raw.len() {
        return Vec::new();
    }
    let exponent = &raw[exp_start..exp_start + exp_len];
    let modulus = &raw[exp_start + exp_len..];
    encode_rsa_der(modulus, exponent)
}

fn encode_rsa_der(modulus: &[u8], exponent: &[u8]) -> Vec<u8> {
    fn encode_integer(value: &[u8]) -> Vec<u8> {
        let mut bytes = value.to_vec();
        if bytes.first().map(|b| b & 0x80 != 0).unwrap_or(false) {
            bytes.insert(0, 0);
        }
        let mut out = vec![0x02];
        encode_length(&mut out, bytes.len());
        out.extend_from_slice(&bytes);
        out
    }
    fn encode_length(out: &mut Vec<u8>, len: usize) {
        if len < 0x80 {
            out.push(len as u8);
        } else {
            let bytes = len.to_be_bytes();
            let significant: Vec<u8> = bytes
                .iter()
                .copied()
                .skip_while(|&b| b == 0)
                .collect();
            out.push(0x80 | significant.len() as u8);
            out.extend_from_slice(&significant);
        }
    }

    let modulus_int = encode_integer(modulus);
    let exponent_int = encode_integer(exponent);
    let mut body = Vec::new();
    body.extend_from_slice(&modulus_int);
    body.extend_from_slice(&exponent_int);

    let mut out = vec![0x30];
    encode_length(&mut out, body.len());
    out.extend_from_slice(&body);
    out
}

/// Builds the octet stream RFC 4034 §3.1.8.1 signs: the RRSIG RDATA minus
/// the signature, followed by each RR in the covered RRset in canonical
/// form (lower-cased owner name, original TTL, ascending RDATA order).
fn signed_data(rrsig: &RrsigData, owner: &str, dnskey_rdatas: &[Vec<u8>]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&u16::from(rrsig.type_covered).to_be_bytes());
    data.push(rrsig.algorithm);
    data.push(rrsig.labels);
    data.extend_from_slice(&rrsig.original_ttl.to_be_bytes());
    data.extend_from_slice(&rrsig.expiration.to_be_bytes());
    data.extend_from_slice(&rrsig.inception.to_be_bytes());
    data.extend_from_slice(&rrsig.key_tag.to_be_bytes());
    data.extend_from_slice(&canonical_name(&rrsig.signer_name));

    let canonical_owner = canonical_name(owner);
    let mut sorted_rdatas: Vec<&Vec<u8>> = dnskey_rdatas.iter().collect();
    sorted_rdatas.sort();

    for rdata in sorted_rdatas {
        data.extend_from_slice(&canonical_owner);
        data.extend_from_slice(&u16::from(DNSResourceType::DNSKEY).to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes()); // class IN
        data.extend_from_slice(&rrsig.original_ttl.to_be_bytes());
        data.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        data.extend_from_slice(rdata);
    }

    data
}

fn canonical_name(name: &str) -> Vec<u8> {
    name_to_wire(&name.to_ascii_lowercase())
}
