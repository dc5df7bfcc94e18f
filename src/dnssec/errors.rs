/// Errors surfaced while evaluating a single DS record against a DNSKEY/RRSIG
/// response. The DS policy chain (`crate::policy::ds`) maps each of these to
/// a `DsStatus`; nothing here ever aborts a scan cycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DnsSecError {
    #[error("no DNSKEY record matches the DS keytag")]
    NoDnsKey,
    #[error("matching DNSKEY does not have the SEP bit set")]
    NoSep,
    #[error("DNSSEC signature has expired or is not yet valid")]
    SignatureExpired,
    #[error("unsupported DNSSEC algorithm: {0}")]
    UnsupportedAlgorithm(u8),
    #[error("unsupported DS digest type: {0}")]
    UnsupportedDigestType(u8),
    #[error("DNSSEC signature verification failed")]
    SignatureVerificationFailed,
    #[error("DS record digest does not match the selected DNSKEY")]
    DsDigestMismatch,
}

pub type Result<T> = std::result::Result<T, DnsSecError>;
