#![allow(dead_code)]
use burrow_dns_domain::{
    DomainName, Question, RData, RecordClass, RecordType, ResourceRecord,
};
use std::net::Ipv4Addr;
use std::str::FromStr;

pub struct RecordBuilder {
    owner: DomainName,
    class: RecordClass,
    ttl: u32,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            owner: "example.com".parse().expect("valid name"),
            class: RecordClass::IN,
            ttl: 3600,
        }
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.owner = owner.parse().expect("valid owner name");
        self
    }

    pub fn class(mut self, class: RecordClass) -> Self {
        self.class = class;
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn a(self, addr: &str) -> ResourceRecord {
        let addr = Ipv4Addr::from_str(addr).expect("valid IPv4 address");
        ResourceRecord::new(self.owner, self.class, self.ttl, RData::A(addr))
    }

    pub fn cname(self, target: &str) -> ResourceRecord {
        let target = target.parse().expect("valid target name");
        ResourceRecord::new(self.owner, self.class, self.ttl, RData::CNAME(target))
    }

    pub fn mx(self, exchange: &str, preference: u16) -> ResourceRecord {
        let exchange = exchange.parse().expect("valid exchange name");
        ResourceRecord::new(
            self.owner,
            self.class,
            self.ttl,
            RData::MX {
                preference,
                exchange,
            },
        )
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn question(name: &str, qtype: RecordType) -> Question {
    Question::new(name.parse().expect("valid name"), qtype, RecordClass::IN)
}
