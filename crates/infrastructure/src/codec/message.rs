use super::bytes::{ByteReader, ByteWriter};
use super::name::{read_name, write_name, CompressionSlot};
use burrow_dns_domain::{
    DomainError, HeaderFlags, Message, Question, RData, Rcode, RecordClass, RecordType,
    ResourceRecord,
};
use std::net::Ipv4Addr;
use tracing::debug;

const QR_MASK: u16 = 0x8000;
const OPCODE_MASK: u16 = 0x7800;
const AA_MASK: u16 = 0x0400;
const TC_MASK: u16 = 0x0200;
const RD_MASK: u16 = 0x0100;
const RA_MASK: u16 = 0x0080;
const RCODE_MASK: u16 = 0x000F;

/// Serializes a message. Section counts come from the section vectors, so
/// the emitted header always matches the records that follow it.
pub fn encode_message(msg: &Message) -> Result<Vec<u8>, DomainError> {
    let mut w = ByteWriter::new();
    let mut slot = CompressionSlot::empty();

    w.write_u16(msg.id);
    w.write_u16(flags_word(&msg.flags));
    w.write_u16(section_count(msg.questions.len())?);
    w.write_u16(section_count(msg.answers.len())?);
    w.write_u16(section_count(msg.authorities.len())?);
    w.write_u16(section_count(msg.additionals.len())?);

    for question in &msg.questions {
        write_name(&mut w, &question.name, &mut slot);
        w.write_u16(question.qtype.to_u16());
        w.write_u16(question.qclass.to_u16());
    }
    for rr in &msg.answers {
        write_record(&mut w, rr, &mut slot);
    }
    for rr in &msg.authorities {
        write_record(&mut w, rr, &mut slot);
    }
    for rr in &msg.additionals {
        write_record(&mut w, rr, &mut slot);
    }

    Ok(w.into_bytes())
}

fn section_count(len: usize) -> Result<u16, DomainError> {
    u16::try_from(len).map_err(|_| DomainError::FormatError("section too large".to_string()))
}

fn flags_word(flags: &HeaderFlags) -> u16 {
    let mut word = 0u16;
    if flags.qr {
        word |= QR_MASK;
    }
    word |= ((flags.opcode as u16) << 11) & OPCODE_MASK;
    if flags.aa {
        word |= AA_MASK;
    }
    if flags.tc {
        word |= TC_MASK;
    }
    if flags.rd {
        word |= RD_MASK;
    }
    if flags.ra {
        word |= RA_MASK;
    }
    word | flags.rcode.to_u16()
}

fn write_record(w: &mut ByteWriter, rr: &ResourceRecord, slot: &mut CompressionSlot) {
    write_name(w, &rr.name, slot);
    w.write_u16(rr.record_type().to_u16());
    w.write_u16(rr.class.to_u16());
    w.write_u32(rr.ttl);

    let rd_length_pos = w.len();
    w.write_u16(0);
    let rd_start = w.len();

    match &rr.data {
        RData::A(addr) => w.write_slice(&addr.octets()),
        RData::MX {
            preference,
            exchange,
        } => {
            w.write_u16(*preference);
            write_name(w, exchange, slot);
        }
        RData::NS(name) | RData::CNAME(name) | RData::PTR(name) => write_name(w, name, slot),
    }

    w.patch_u16(rd_length_pos, (w.len() - rd_start) as u16);
}

/// Parses a received message. Records of unmodeled types are skipped over
/// their full RDLENGTH and dropped.
pub fn decode_message(buf: &[u8]) -> Result<Message, DomainError> {
    let mut r = ByteReader::new(buf);

    let id = r.read_u16()?;
    let flags = parse_flags(r.read_u16()?)?;
    let q_count = r.read_u16()?;
    let ans_count = r.read_u16()?;
    let au_count = r.read_u16()?;
    let ad_count = r.read_u16()?;

    let mut questions = Vec::with_capacity(q_count as usize);
    for _ in 0..q_count {
        questions.push(read_question(&mut r)?);
    }

    let answers = read_section(&mut r, ans_count)?;
    let authorities = read_section(&mut r, au_count)?;
    let additionals = read_section(&mut r, ad_count)?;

    Ok(Message {
        id,
        flags,
        questions,
        answers,
        authorities,
        additionals,
    })
}

fn parse_flags(word: u16) -> Result<HeaderFlags, DomainError> {
    Ok(HeaderFlags {
        qr: word & QR_MASK != 0,
        opcode: ((word & OPCODE_MASK) >> 11) as u8,
        aa: word & AA_MASK != 0,
        tc: word & TC_MASK != 0,
        rd: word & RD_MASK != 0,
        ra: word & RA_MASK != 0,
        rcode: Rcode::from_u16(word & RCODE_MASK)
            .ok_or_else(|| DomainError::FormatError(format!("rcode {}", word & RCODE_MASK)))?,
    })
}

fn read_question(r: &mut ByteReader<'_>) -> Result<Question, DomainError> {
    let name = read_name(r)?;
    let qtype_code = r.read_u16()?;
    let qtype = RecordType::from_u16(qtype_code)
        .ok_or_else(|| DomainError::FormatError(format!("question type {}", qtype_code)))?;
    let qclass_code = r.read_u16()?;
    let qclass = RecordClass::from_u16(qclass_code)
        .ok_or_else(|| DomainError::FormatError(format!("question class {}", qclass_code)))?;
    Ok(Question::new(name, qtype, qclass))
}

fn read_section(
    r: &mut ByteReader<'_>,
    count: u16,
) -> Result<Vec<ResourceRecord>, DomainError> {
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = read_name(r)?;
        let type_code = r.read_u16()?;
        let class_code = r.read_u16()?;
        let class = RecordClass::from_u16(class_code)
            .ok_or_else(|| DomainError::FormatError(format!("record class {}", class_code)))?;
        let ttl = r.read_u32()?;
        let rd_length = r.read_u16()? as usize;
        let rd_end = r.pos() + rd_length;
        if rd_end > r.len() {
            return Err(DomainError::FormatError("truncated rdata".to_string()));
        }

        let data = match RecordType::from_u16(type_code) {
            Some(RecordType::A) => {
                if rd_length < 4 {
                    return Err(DomainError::FormatError("short A rdata".to_string()));
                }
                let mut octets = [0u8; 4];
                octets.copy_from_slice(r.slice_at(r.pos(), 4)?);
                r.set_pos(r.pos() + 4)?;
                RData::A(Ipv4Addr::from(octets))
            }
            Some(RecordType::MX) => {
                let preference = r.read_u16()?;
                let exchange = read_name(r)?;
                RData::MX {
                    preference,
                    exchange,
                }
            }
            Some(RecordType::NS) => RData::NS(read_name(r)?),
            Some(RecordType::CNAME) => RData::CNAME(read_name(r)?),
            Some(RecordType::PTR) => RData::PTR(read_name(r)?),
            None => {
                debug!(type_code, rd_length, "skipping record of unknown type");
                r.set_pos(rd_end)?;
                continue;
            }
        };

        if r.pos() > rd_end {
            return Err(DomainError::FormatError("rdata overruns RDLENGTH".to_string()));
        }
        // Compressed rdata may come up short; RDLENGTH is authoritative.
        r.set_pos(rd_end)?;

        records.push(ResourceRecord::new(name, class, ttl, data));
    }
    Ok(records)
}
