use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use super::ParseError;
use super::common::{read_labels, write_labels};
use super::enums::{DNSResourceClass, DNSResourceType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DNSQuestion {
    pub labels: Vec<String>,
    pub qtype: DNSResourceType,
    pub qclass: DNSResourceClass,
}

impl DNSQuestion {
    pub fn new(name: &str, qtype: DNSResourceType) -> Self {
        DNSQuestion {
            labels: name
                .split('.')
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            qtype,
            qclass: DNSResourceClass::IN,
        }
    }

    pub fn write(&self, writer: &mut BitWriter<&mut Vec<u8>, BigEndian>) -> Result<(), ParseError> {
        write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.qtype.into())?;
        writer.write_var::<u16>(16, self.qclass.into())?;
        Ok(())
    }

    pub fn read(
        reader: &mut BitReader<&[u8], BigEndian>,
        full_packet: &[u8],
    ) -> Result<Self, ParseError> {
        let labels = read_labels(reader, full_packet)?;
        let qtype = reader.read_var::<u16>(16)?.into();
        let qclass = reader.read_var::<u16>(16)?.into();
        Ok(DNSQuestion {
            labels,
            qtype,
            qclass,
        })
    }
}
