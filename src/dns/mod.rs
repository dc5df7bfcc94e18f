//! Minimal DNS wire-format codec: just enough of RFC 1035 / RFC 4034 / RFC
//! 3658 to issue SOA and DNSKEY queries and parse authoritative answers
//! containing A/AAAA/NS/CNAME/SOA/DNSKEY/RRSIG/DS records and an OPT
//! pseudo-record with the DNSSEC OK bit.
//!
//! Bit-level (de)serialization follows the same `bitstream-io` +
//! `PacketComponent` idiom the teacher crate uses for its header and
//! question sections.

pub mod common;
pub mod edns;
pub mod enums;
pub mod header;
pub mod packet;
pub mod question;
pub mod resource;

pub use edns::EdnsOpt;
pub use enums::{DNSResourceClass, DNSResourceType, OpCode, ResponseCode};
pub use header::DNSHeader;
pub use packet::DNSPacket;
pub use question::DNSQuestion;
pub use resource::DNSResource;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of packet")]
    UnexpectedEof,
    #[error("invalid label")]
    InvalidLabel,
    #[error("label compression pointer loop")]
    CompressionLoop,
    #[error("invalid record data")]
    InvalidRData,
}

impl From<std::io::Error> for ParseError {
    fn from(_: std::io::Error) -> Self {
        ParseError::UnexpectedEof
    }
}
