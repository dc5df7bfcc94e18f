use bitstream_io::{BigEndian, BitRead, BitReader};

use super::ParseError;
use super::common::{labels_to_name, read_labels};
use super::enums::{DNSResourceClass, DNSResourceType};

/// A resource record as it appears in the answer/authority/additional
/// sections. `rdata` is kept as raw bytes; typed accessors below parse it
/// lazily the way the policy chains need it (SOA serial, DNSKEY fields,
/// RRSIG fields, DS fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNSResource {
    pub labels: Vec<String>,
    pub rtype: DNSResourceType,
    pub rclass: DNSResourceClass,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl DNSResource {
    pub fn name(&self) -> String {
        labels_to_name(&self.labels)
    }

    pub fn read(
        reader: &mut BitReader<&[u8], BigEndian>,
        full_packet: &[u8],
    ) -> Result<Self, ParseError> {
        let labels = read_labels(reader, full_packet)?;
        let rtype = reader.read_var::<u16>(16)?.into();
        let rclass = reader.read_var::<u16>(16)?.into();
        let ttl = reader.read_var::<u32>(32)?;
        let rdlength = reader.read_var::<u16>(16)? as usize;
        let mut rdata = vec![0u8; rdlength];
        reader.read_bytes(&mut rdata)?;
        Ok(DNSResource {
            labels,
            rtype,
            rclass,
            ttl,
            rdata,
        })
    }

    pub fn as_soa(&self) -> Option<SoaData> {
        if self.rtype != DNSResourceType::SOA || self.rdata.len() < 20 {
            return None;
        }
        // MNAME and RNAME are compressible names inline in rdata; skip past
        // them using the non-pointer-aware label walker since the serial
        // fields that follow are all we need.
        let mut pos = 0usize;
        for _ in 0..2 {
            loop {
                if pos >= self.rdata.len() {
                    return None;
                }
                let len = self.rdata[pos] as usize;
                if len == 0 {
                    pos += 1;
                    break;
                }
                if len & 0xC0 == 0xC0 {
                    pos += 2;
                    break;
                }
                pos += 1 + len;
            }
        }
        if pos + 20 > self.rdata.len() {
            return None;
        }
        let serial = u32::from_be_bytes(self.rdata[pos..pos + 4].try_into().ok()?);
        Some(SoaData { serial })
    }

    pub fn as_dnskey(&self) -> Option<DnskeyData> {
        if self.rtype != DNSResourceType::DNSKEY || self.rdata.len() < 4 {
            return None;
        }
        Some(DnskeyData {
            flags: u16::from_be_bytes([self.rdata[0], self.rdata[1]]),
            protocol: self.rdata[2],
            algorithm: self.rdata[3],
            public_key: self.rdata[4..].to_vec(),
        })
    }

    pub fn as_ds(&self) -> Option<DsData> {
        if self.rtype != DNSResourceType::DS || self.rdata.len() < 4 {
            return None;
        }
        Some(DsData {
            key_tag: u16::from_be_bytes([self.rdata[0], self.rdata[1]]),
            algorithm: self.rdata[2],
            digest_type: self.rdata[3],
            digest: self.rdata[4..].to_vec(),
        })
    }

    /// Parses the RRSIG rdata. `type_covered`, unlike the other fixed
    /// fields, is read first by the caller to decide whether this RRSIG is
    /// relevant before paying for signer-name parsing.
    pub fn as_rrsig(&self) -> Option<RrsigData> {
        if self.rtype != DNSResourceType::RRSIG || self.rdata.len() < 19 {
            return None;
        }
        let type_covered: DNSResourceType =
            u16::from_be_bytes([self.rdata[0], self.rdata[1]]).into();
        let algorithm = self.rdata[2];
        let labels = self.rdata[3];
        let original_ttl =
            u32::from_be_bytes(self.rdata[4..8].try_into().ok()?);
        let expiration = u32::from_be_bytes(self.rdata[8..12].try_into().ok()?);
        let inception = u32::from_be_bytes(self.rdata[12..16].try_into().ok()?);
        let key_tag = u16::from_be_bytes([self.rdata[16], self.rdata[17]]);

        let (signer_labels, consumed) = read_name_from_slice(&self.rdata[18..])?;
        let signature = self.rdata[18 + consumed..].to_vec();

        Some(RrsigData {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer_name: labels_to_name(&signer_labels),
            signature,
        })
    }
}

fn read_name_from_slice(data: &[u8]) -> Option<(Vec<String>, usize)> {
    let mut labels = Vec::new();
    let mut pos = 0usize;
    loop {
        if pos >= data.len() {
            return None;
        }
        let len = data[pos] as usize;
        if len == 0 {
            pos += 1;
            break;
        }
        if len & 0xC0 == 0xC0 || len > 63 {
            // RRSIG signer names are not compressed per RFC 4034 §3.1.7.
            return None;
        }
        let start = pos + 1;
        let end = start + len;
        if end > data.len() {
            return None;
        }
        labels.push(String::from_utf8_lossy(&data[start..end]).to_string());
        pos = end;
    }
    Some((labels, pos))
}

#[derive(Debug, Clone, Copy)]
pub struct SoaData {
    pub serial: u32,
}

#[derive(Debug, Clone)]
pub struct DnskeyData {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DnskeyData {
    /// Authoritative servers sometimes wrap the base64 public key with
    /// spaces; strip them before any KeyTag or signature computation
    /// (spec §4.3.b).
    pub fn stripped_public_key(&self) -> Vec<u8> {
        self.public_key
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect()
    }

    pub fn is_sep(&self) -> bool {
        self.flags & 0x0001 != 0
    }
}

#[derive(Debug, Clone)]
pub struct DsData {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RrsigData {
    pub type_covered: DNSResourceType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub expiration: u32,
    pub inception: u32,
    pub key_tag: u16,
    pub signer_name: String,
    pub signature: Vec<u8>,
}

impl RrsigData {
    pub fn stripped_signature(&self) -> Vec<u8> {
        self.signature
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect()
    }
}
