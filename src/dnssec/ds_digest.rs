//! DS digest computation (RFC 4034 §5.1.4): hash of the owner name followed
//! by the DNSKEY RDATA, used by the DS policy chain's digest-match step
//! (spec §4.3.g).

use crate::dns::common::name_to_wire;
use crate::dns::resource::DnskeyData;

use super::digest::DigestType;

/// Computes the DS digest for `owner`'s DNSKEY, matching what an
/// authoritative parent zone would publish as the DS record's Digest
/// field. Returns lowercase hex, as spec §4.3.g compares case-insensitively
/// anyway but downstream storage (`DsRecord.digest`) is always lowercase.
pub fn compute_ds_digest(owner: &str, dnskey: &DnskeyData, digest_type: DigestType) -> Option<String> {
    let mut rdata = Vec::new();
    rdata.extend_from_slice(&dnskey.flags.to_be_bytes());
    rdata.push(dnskey.protocol);
    rdata.push(dnskey.algorithm);
    rdata.extend_from_slice(&dnskey.stripped_public_key());

    let mut message = name_to_wire(&owner.to_ascii_lowercase());
    message.extend_from_slice(&rdata);

    digest_type.digest(&message).map(hex::encode)
}
