use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use super::ParseError;

/// Reads a domain name starting at `pos` in `buf`, following at most one
/// level of compression-pointer indirection chains before giving up -
/// enough for authoritative answers, which don't nest pointers deeply.
fn read_name_at(buf: &[u8], mut pos: usize) -> Result<Vec<String>, ParseError> {
    let mut labels = Vec::new();
    let mut jumps = 0;

    loop {
        if pos >= buf.len() {
            return Err(ParseError::UnexpectedEof);
        }
        let len = buf[pos];
        if len == 0 {
            break;
        }
        if len & 0xC0 == 0xC0 {
            if pos + 1 >= buf.len() {
                return Err(ParseError::UnexpectedEof);
            }
            let pointer = (((len & 0x3F) as usize) << 8) | buf[pos + 1] as usize;
            jumps += 1;
            if jumps > 32 || pointer >= pos {
                return Err(ParseError::CompressionLoop);
            }
            pos = pointer;
            continue;
        }
        if len > 63 {
            return Err(ParseError::InvalidLabel);
        }
        let start = pos + 1;
        let end = start + len as usize;
        if end > buf.len() {
            return Err(ParseError::UnexpectedEof);
        }
        labels.push(String::from_utf8_lossy(&buf[start..end]).to_string());
        pos = end;
    }

    Ok(labels)
}

/// Reads a name from the bitstream, following compression pointers against
/// the full packet buffer (`full_packet`) when present.
pub fn read_labels(
    reader: &mut BitReader<&[u8], BigEndian>,
    full_packet: &[u8],
) -> Result<Vec<String>, ParseError> {
    let mut labels = Vec::new();

    loop {
        let first = reader.read_var::<u8>(8)?;
        if first == 0 {
            break;
        }
        if first & 0xC0 == 0xC0 {
            let second = reader.read_var::<u8>(8)?;
            let pointer = (((first & 0x3F) as usize) << 8) | second as usize;
            let mut tail = read_name_at(full_packet, pointer)?;
            labels.append(&mut tail);
            break;
        }
        if first > 63 {
            return Err(ParseError::InvalidLabel);
        }
        let mut buf = vec![0u8; first as usize];
        reader.read_bytes(&mut buf)?;
        labels.push(String::from_utf8_lossy(&buf).to_string());
    }

    Ok(labels)
}

pub fn write_labels(
    writer: &mut BitWriter<&mut Vec<u8>, BigEndian>,
    labels: &[String],
) -> Result<(), ParseError> {
    for label in labels {
        if label.is_empty() {
            continue;
        }
        writer.write_var::<u8>(8, label.len() as u8)?;
        writer.write_bytes(label.as_bytes())?;
    }
    writer.write_var::<u8>(8, 0)?;
    Ok(())
}

pub fn name_to_wire(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.') {
        if label.is_empty() {
            continue;
        }
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

pub fn labels_to_name(labels: &[String]) -> String {
    if labels.is_empty() {
        ".".to_string()
    } else {
        format!("{}.", labels.join("."))
    }
}
