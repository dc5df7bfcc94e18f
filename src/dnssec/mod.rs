//! DNSSEC semantic validation primitives: KeyTag computation, DS digest
//! computation, and RRSIG signature verification — the three things spec.md
//! §1 requires the core depend on a DNS library for rather than hand-roll.
//! Cryptographic primitives come from `ring`; this module wires RFC 4034
//! framing around them. The per-DS policy chain that drives these
//! primitives lives in `crate::policy::ds`.

pub mod algorithm;
pub mod digest;
pub mod ds_digest;
pub mod errors;
pub mod key_tag;
pub mod rrsig;

pub use algorithm::DnsSecAlgorithm;
pub use digest::DigestType;
pub use ds_digest::compute_ds_digest;
pub use errors::DnsSecError;
pub use key_tag::calculate_key_tag;
pub use rrsig::verify_dnskey_rrset;
