#![allow(dead_code)]
use async_trait::async_trait;
use burrow_dns_application::ports::{
    LookupOutcome, RecordSource, RecordStore, UpstreamExchange, WritebackFilter,
};
use burrow_dns_domain::{
    DomainError, DomainName, Message, Question, RData, RecordClass, RecordType, ResourceRecord,
};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::Mutex;

pub fn name(s: &str) -> DomainName {
    s.parse().expect("valid name")
}

pub fn question(s: &str, qtype: RecordType) -> Question {
    Question::new(name(s), qtype, RecordClass::IN)
}

pub fn a_record(owner: &str, addr: &str) -> ResourceRecord {
    ResourceRecord::new(
        name(owner),
        RecordClass::IN,
        3600,
        RData::A(addr.parse().expect("valid IPv4 address")),
    )
}

pub fn mx_record(owner: &str, exchange: &str, preference: u16) -> ResourceRecord {
    ResourceRecord::new(
        name(owner),
        RecordClass::IN,
        3600,
        RData::MX {
            preference,
            exchange: name(exchange),
        },
    )
}

/// In-memory store honoring the longest-suffix lookup and writeback
/// contracts, so resolver tests run without touching the filesystem.
#[derive(Default)]
pub struct MemoryStore {
    zone: Vec<ResourceRecord>,
    authority: Vec<ResourceRecord>,
    cache: Mutex<Vec<ResourceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, rr: ResourceRecord) -> Self {
        self.zone.push(rr);
        self
    }

    pub fn with_authority(mut self, rr: ResourceRecord) -> Self {
        self.authority.push(rr);
        self
    }

    pub fn with_cached(self, rr: ResourceRecord) -> Self {
        self.cache.lock().unwrap().push(rr);
        self
    }

    pub fn cached(&self) -> Vec<ResourceRecord> {
        self.cache.lock().unwrap().clone()
    }

    fn best_match(
        records: &[ResourceRecord],
        target: &DomainName,
        rtype: RecordType,
        rclass: RecordClass,
    ) -> LookupOutcome {
        let mut best: Option<(usize, ResourceRecord)> = None;
        for rr in records {
            if rr.record_type() != rtype || rr.class != rclass || !rr.name.is_suffix_of(target) {
                continue;
            }
            let count = rr.name.label_count();
            if best.as_ref().map_or(true, |(b, _)| count > *b) {
                best = Some((count, rr.clone()));
            }
        }
        match best {
            None => LookupOutcome::Miss,
            Some((count, rr)) if count == target.label_count() => LookupOutcome::Exact(rr),
            Some((_, rr)) => LookupOutcome::BestSuffix(rr),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn lookup(
        &self,
        source: RecordSource,
        target: &DomainName,
        rtype: RecordType,
        rclass: RecordClass,
    ) -> Result<LookupOutcome, DomainError> {
        Ok(match source {
            RecordSource::Zone => Self::best_match(&self.zone, target, rtype, rclass),
            RecordSource::Authority => Self::best_match(&self.authority, target, rtype, rclass),
            RecordSource::Cache => {
                Self::best_match(&self.cache.lock().unwrap(), target, rtype, rclass)
            }
        })
    }

    async fn writeback(
        &self,
        records: &[ResourceRecord],
        filter: &WritebackFilter,
        force_save: bool,
    ) -> Result<bool, DomainError> {
        let mut cache = self.cache.lock().unwrap();
        let mut matched = false;
        for rr in records {
            let hit = rr.name == filter.owner && rr.record_type() == filter.qtype;
            matched |= hit;
            if !(hit || force_save) {
                continue;
            }
            match cache.iter_mut().find(|c| {
                c.name == rr.name && c.record_type() == rr.record_type() && c.class == rr.class
            }) {
                Some(existing) => *existing = rr.clone(),
                None => cache.push(rr.clone()),
            }
        }
        Ok(matched)
    }
}

/// Plays back a fixed sequence of upstream responses and records every
/// exchange it was asked to perform.
#[derive(Default)]
pub struct ScriptedUpstream {
    script: Mutex<VecDeque<Result<Message, DomainError>>>,
    calls: Mutex<Vec<(Ipv4Addr, Question, bool)>>,
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_reply(self, response: Message) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn then_fail(self, error: DomainError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<(Ipv4Addr, Question, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamExchange for ScriptedUpstream {
    async fn query(
        &self,
        server: Ipv4Addr,
        question: &Question,
        recursion: bool,
    ) -> Result<Message, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push((server, question.clone(), recursion));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(DomainError::QueryTimeout {
                    server: server.to_string(),
                })
            })
    }
}

/// An upstream response answering `question` with the given records.
pub fn upstream_answer(question: &Question, answers: Vec<ResourceRecord>) -> Message {
    let mut response = Message::query(0, question.clone(), false);
    response.flags.qr = true;
    response.answers = answers;
    response
}

/// An upstream referral pointing at the next server.
pub fn upstream_referral(question: &Question, authority: ResourceRecord) -> Message {
    let mut response = Message::query(0, question.clone(), false);
    response.flags.qr = true;
    response.authorities = vec![authority];
    response
}
