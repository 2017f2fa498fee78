use async_trait::async_trait;
use burrow_dns_domain::{DomainError, DomainName, RecordClass, RecordType, ResourceRecord};

/// Which of the three record files a lookup runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Zone,
    Authority,
    Cache,
}

/// Result of a longest-suffix lookup.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// Every label of the target matched and the stored owner had no
    /// further labels.
    Exact(ResourceRecord),
    /// The stored owner is a proper suffix of the target; the record with
    /// the most matching labels wins, earliest entry on ties.
    BestSuffix(ResourceRecord),
    Miss,
}

impl LookupOutcome {
    pub fn exact(self) -> Option<ResourceRecord> {
        match self {
            LookupOutcome::Exact(rr) => Some(rr),
            _ => None,
        }
    }

    /// Exact or best-suffix, whichever was found.
    pub fn any_match(self) -> Option<ResourceRecord> {
        match self {
            LookupOutcome::Exact(rr) | LookupOutcome::BestSuffix(rr) => Some(rr),
            LookupOutcome::Miss => None,
        }
    }
}

/// The (owner, qtype) pair a writeback is answering for.
#[derive(Debug, Clone)]
pub struct WritebackFilter {
    pub owner: DomainName,
    pub qtype: RecordType,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn lookup(
        &self,
        source: RecordSource,
        name: &DomainName,
        rtype: RecordType,
        rclass: RecordClass,
    ) -> Result<LookupOutcome, DomainError>;

    /// Persists records into the cache. Records matching the filter are
    /// always saved; `force_save` saves the rest too. Returns whether any
    /// record matched the filter, i.e. whether the original question is
    /// now answerable from the cache.
    async fn writeback(
        &self,
        records: &[ResourceRecord],
        filter: &WritebackFilter,
        force_save: bool,
    ) -> Result<bool, DomainError>;
}
