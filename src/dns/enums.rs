//! Resource record types and classes this auditor actually queries for or
//! parses. Anything else observed on the wire is kept as `Unknown(u16)`
//! rather than rejected outright, matching how the teacher crate's
//! `DNSResourceType::from_u16` degrades for record types it doesn't model.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DNSResourceType {
    A,
    NS,
    CNAME,
    SOA,
    AAAA,
    DS,
    RRSIG,
    DNSKEY,
    OPT,
    Unknown(u16),
}

impl From<u16> for DNSResourceType {
    fn from(value: u16) -> Self {
        match value {
            1 => DNSResourceType::A,
            2 => DNSResourceType::NS,
            5 => DNSResourceType::CNAME,
            6 => DNSResourceType::SOA,
            28 => DNSResourceType::AAAA,
            41 => DNSResourceType::OPT,
            43 => DNSResourceType::DS,
            46 => DNSResourceType::RRSIG,
            48 => DNSResourceType::DNSKEY,
            other => DNSResourceType::Unknown(other),
        }
    }
}

impl From<DNSResourceType> for u16 {
    fn from(value: DNSResourceType) -> Self {
        match value {
            DNSResourceType::A => 1,
            DNSResourceType::NS => 2,
            DNSResourceType::CNAME => 5,
            DNSResourceType::SOA => 6,
            DNSResourceType::AAAA => 28,
            DNSResourceType::OPT => 41,
            DNSResourceType::DS => 43,
            DNSResourceType::RRSIG => 46,
            DNSResourceType::DNSKEY => 48,
            DNSResourceType::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DNSResourceClass {
    IN,
    Unknown(u16),
}

impl From<u16> for DNSResourceClass {
    fn from(value: u16) -> Self {
        match value {
            1 => DNSResourceClass::IN,
            other => DNSResourceClass::Unknown(other),
        }
    }
}

impl From<DNSResourceClass> for u16 {
    fn from(value: DNSResourceClass) -> Self {
        match value {
            DNSResourceClass::IN => 1,
            DNSResourceClass::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Query,
    Unknown(u8),
}

impl From<u8> for OpCode {
    fn from(value: u8) -> Self {
        match value {
            0 => OpCode::Query,
            other => OpCode::Unknown(other),
        }
    }
}

/// DNS RCODE (RFC 1035 §4.1.1). Only the values the nameserver policy chain
/// (spec §4.2 "RCODE policy") branches on are named; everything else maps
/// to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    ServerFailure,
    NameError,
    Refused,
    Other(u8),
}

impl From<u8> for ResponseCode {
    fn from(value: u8) -> Self {
        match value {
            0 => ResponseCode::NoError,
            2 => ResponseCode::ServerFailure,
            3 => ResponseCode::NameError,
            5 => ResponseCode::Refused,
            other => ResponseCode::Other(other),
        }
    }
}
