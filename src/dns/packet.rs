use bitstream_io::{BigEndian, BitReader, BitWriter};

use super::ParseError;
use super::edns::EdnsOpt;
use super::enums::{DNSResourceClass, DNSResourceType, OpCode, ResponseCode};
use super::header::DNSHeader;
use super::question::DNSQuestion;
use super::resource::DNSResource;

#[derive(Debug, Clone)]
pub struct DNSPacket {
    pub header: DNSHeader,
    pub questions: Vec<DNSQuestion>,
    pub answers: Vec<DNSResource>,
    pub authorities: Vec<DNSResource>,
    pub additional: Vec<DNSResource>,
}

impl DNSPacket {
    pub fn rcode(&self) -> ResponseCode {
        self.header.rcode.into()
    }

    pub fn opcode(&self) -> OpCode {
        self.header.opcode.into()
    }

    /// Builds an outgoing query for `qtype` against `name`. When `edns` is
    /// `Some`, an OPT pseudo-record is appended to the additional section
    /// advertising the given UDP payload size, with the DO bit set for
    /// DNSSEC queries (spec §4.1 "setting the advertised EDNS0 UDP size
    /// ... for DNSSEC queries").
    pub fn new_query(name: &str, qtype: DNSResourceType, edns: Option<EdnsOpt>) -> Self {
        let header = DNSHeader {
            id: rand::random(),
            qr: false,
            opcode: 0,
            aa: false,
            tc: false,
            rd: false,
            ra: false,
            z: 0,
            rcode: 0,
            qdcount: 1,
            ancount: 0,
            nscount: 0,
            arcount: if edns.is_some() { 1 } else { 0 },
        };
        DNSPacket {
            header,
            questions: vec![DNSQuestion::new(name, qtype)],
            answers: Vec::new(),
            authorities: Vec::new(),
            additional: edns.map(|e| e.to_additional_marker()).into_iter().collect(),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::new();
        {
            let mut writer = BitWriter::endian(&mut buf, BigEndian);
            self.header.write(&mut writer)?;
            for q in &self.questions {
                q.write(&mut writer)?;
            }
        }
        for additional in &self.additional {
            if let Some(opt) = additional.as_edns_marker() {
                buf.extend_from_slice(&opt.to_wire());
            }
        }
        Ok(buf)
    }

    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut reader = BitReader::endian(data, BigEndian);
        let header = DNSHeader::read(&mut reader)?;

        let mut questions = Vec::with_capacity(header.qdcount as usize);
        for _ in 0..header.qdcount {
            questions.push(DNSQuestion::read(&mut reader, data)?);
        }

        let mut answers = Vec::with_capacity(header.ancount as usize);
        for _ in 0..header.ancount {
            answers.push(DNSResource::read(&mut reader, data)?);
        }

        let mut authorities = Vec::with_capacity(header.nscount as usize);
        for _ in 0..header.nscount {
            authorities.push(DNSResource::read(&mut reader, data)?);
        }

        let mut additional = Vec::with_capacity(header.arcount as usize);
        for _ in 0..header.arcount {
            additional.push(DNSResource::read(&mut reader, data)?);
        }

        Ok(DNSPacket {
            header,
            questions,
            answers,
            authorities,
            additional,
        })
    }
}

impl EdnsOpt {
    /// A placeholder `DNSResource` used only on the outgoing side to
    /// remember "append an OPT record here" until `serialize` writes the
    /// real wire bytes directly (OPT's pseudo-RR shape doesn't fit the
    /// name/class/ttl model of a real record).
    fn to_additional_marker(self) -> DNSResource {
        DNSResource {
            labels: Vec::new(),
            rtype: DNSResourceType::OPT,
            rclass: DNSResourceClass::Unknown(self.udp_payload_size),
            ttl: if self.dnssec_ok { 0x8000_0000 } else { 0 },
            rdata: Vec::new(),
        }
    }
}

impl DNSResource {
    fn as_edns_marker(&self) -> Option<EdnsOpt> {
        if self.rtype != DNSResourceType::OPT {
            return None;
        }
        let udp_payload_size = match self.rclass {
            DNSResourceClass::Unknown(size) => size,
            DNSResourceClass::IN => 512,
        };
        Some(EdnsOpt::new(udp_payload_size, self.ttl & 0x8000_0000 != 0))
    }

    pub fn opt_dnssec_ok(&self) -> bool {
        self.as_edns_marker().map(|e| e.dnssec_ok).unwrap_or(false)
    }
}
