use super::{RecordClass, RecordType};
use crate::name::DomainName;
use std::fmt;
use std::net::Ipv4Addr;

/// Record payload, discriminated by record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    NS(DomainName),
    CNAME(DomainName),
    PTR(DomainName),
    MX {
        preference: u16,
        exchange: DomainName,
    },
}

impl RData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RData::A(_) => RecordType::A,
            RData::NS(_) => RecordType::NS,
            RData::CNAME(_) => RecordType::CNAME,
            RData::PTR(_) => RecordType::PTR,
            RData::MX { .. } => RecordType::MX,
        }
    }

    /// The address carried by an A record, if that is what this is.
    pub fn a_addr(&self) -> Option<Ipv4Addr> {
        match self {
            RData::A(addr) => Some(*addr),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{}", addr),
            RData::NS(name) | RData::CNAME(name) | RData::PTR(name) => write!(f, "{}", name),
            RData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: DomainName,
    pub class: RecordClass,
    pub ttl: u32,
    pub data: RData,
}

impl ResourceRecord {
    pub fn new(name: DomainName, class: RecordClass, ttl: u32, data: RData) -> Self {
        Self {
            name,
            class,
            ttl,
            data,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }
}
