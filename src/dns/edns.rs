//! EDNS0 (RFC 6891) pseudo-record. The auditor only needs to advertise a
//! UDP payload size and set the DNSSEC OK (DO) bit (RFC 3225) on DNSSEC
//! queries; it never parses EDNS options out of responses.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdnsOpt {
    pub udp_payload_size: u16,
    pub dnssec_ok: bool,
}

impl EdnsOpt {
    pub fn new(udp_payload_size: u16, dnssec_ok: bool) -> Self {
        EdnsOpt {
            udp_payload_size,
            dnssec_ok,
        }
    }

    /// Serializes the OPT RR as it belongs in the additional section: root
    /// name, TYPE=OPT, CLASS=udp_payload_size, TTL carries the extended
    /// RCODE/version/flags, RDLENGTH=0.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(0); // root name
        out.extend_from_slice(&41u16.to_be_bytes()); // TYPE=OPT
        out.extend_from_slice(&self.udp_payload_size.to_be_bytes()); // CLASS
        out.push(0); // extended RCODE
        out.push(0); // EDNS version
        let flags: u16 = if self.dnssec_ok { 0x8000 } else { 0 };
        out.extend_from_slice(&flags.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // RDLENGTH
        out
    }
}
