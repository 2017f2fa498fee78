use burrow_dns_domain::{DomainName, RData, RecordClass, RecordType, ResourceRecord};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Parses one record line. Anything that does not fit the five-field
/// grammar is rejected and the caller skips the line.
pub(super) fn parse_line(line: &str) -> Option<ResourceRecord> {
    let mut fields = line.split('\t');
    let rtype = RecordType::from_str(fields.next()?).ok()?;
    let class = RecordClass::from_str(fields.next()?).ok()?;
    let name = DomainName::from_str(fields.next()?).ok()?;
    let rdata_text = fields.next()?;
    let ttl = fields.next()?.parse::<u32>().ok()?;
    if fields.next().is_some() {
        return None;
    }

    let data = parse_rdata(rtype, rdata_text)?;
    Some(ResourceRecord::new(name, class, ttl, data))
}

fn parse_rdata(rtype: RecordType, text: &str) -> Option<RData> {
    match rtype {
        RecordType::A => Some(RData::A(Ipv4Addr::from_str(text).ok()?)),
        RecordType::MX => {
            let (exchange, preference) = text.split_once(',')?;
            Some(RData::MX {
                preference: preference.parse().ok()?,
                exchange: DomainName::from_str(exchange).ok()?,
            })
        }
        RecordType::NS => Some(RData::NS(DomainName::from_str(text).ok()?)),
        RecordType::CNAME => Some(RData::CNAME(DomainName::from_str(text).ok()?)),
        RecordType::PTR => Some(RData::PTR(DomainName::from_str(text).ok()?)),
    }
}

/// The line for a record, without the trailing newline.
pub(super) fn format_line(rr: &ResourceRecord) -> String {
    let rdata = match &rr.data {
        RData::A(addr) => addr.to_string(),
        RData::MX {
            preference,
            exchange,
        } => format!("{},{}", exchange, preference),
        RData::NS(name) | RData::CNAME(name) | RData::PTR(name) => name.to_string(),
    };
    format!(
        "{}\t{}\t{}\t{}\t{}",
        rr.record_type(),
        rr.class,
        rr.name,
        rdata,
        rr.ttl
    )
}
