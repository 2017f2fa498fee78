//! The three record files: zone (`<prefix>resolve.txt`), authority
//! (`<prefix>authorised.txt`) and cache (`<prefix>cache.txt`). One
//! tab-separated line per record:
//!
//! ```text
//! TYPE \t CLASS \t OWNER_NAME \t RDATA \t TTL
//! ```
//!
//! Lookups scan the whole file and keep the entry whose owner shares the
//! most trailing labels with the target; earlier lines win ties. Only the
//! cache file is ever written, and only through `writeback`.

mod line;

use async_trait::async_trait;
use burrow_dns_application::ports::{LookupOutcome, RecordSource, RecordStore, WritebackFilter};
use burrow_dns_domain::{
    DomainError, DomainName, RecordClass, RecordType, ResourceRecord, ServerConfig,
};
use line::{format_line, parse_line};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub struct FileRecordStore {
    zone_path: PathBuf,
    authority_path: PathBuf,
    cache_path: PathBuf,
}

impl FileRecordStore {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            zone_path: config.zone_path.clone(),
            authority_path: config.authority_path.clone(),
            cache_path: config.cache_path.clone(),
        }
    }

    fn path_for(&self, source: RecordSource) -> &Path {
        match source {
            RecordSource::Zone => &self.zone_path,
            RecordSource::Authority => &self.authority_path,
            RecordSource::Cache => &self.cache_path,
        }
    }
}

// Files are opened and closed per call; there are no long-lived handles
// and no locking, which is sound only because requests are handled one at
// a time.
#[async_trait]
impl RecordStore for FileRecordStore {
    async fn lookup(
        &self,
        source: RecordSource,
        name: &DomainName,
        rtype: RecordType,
        rclass: RecordClass,
    ) -> Result<LookupOutcome, DomainError> {
        scan_file(self.path_for(source), name, rtype, rclass)
    }

    async fn writeback(
        &self,
        records: &[ResourceRecord],
        filter: &WritebackFilter,
        force_save: bool,
    ) -> Result<bool, DomainError> {
        write_cache(&self.cache_path, records, filter, force_save)
    }
}

fn read_file(path: &Path) -> Result<String, DomainError> {
    fs::read_to_string(path)
        .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))
}

fn scan_file(
    path: &Path,
    target: &DomainName,
    rtype: RecordType,
    rclass: RecordClass,
) -> Result<LookupOutcome, DomainError> {
    let contents = read_file(path)?;

    let mut best: Option<(usize, ResourceRecord)> = None;
    for raw in contents.lines() {
        if raw.len() < 5 {
            continue;
        }
        let Some(parsed) = parse_line(raw) else {
            trace!(path = %path.display(), line = raw, "skipping malformed line");
            continue;
        };
        if parsed.record_type() != rtype || parsed.class != rclass {
            continue;
        }
        if !parsed.name.is_suffix_of(target) {
            continue;
        }
        let count = parsed.name.label_count();
        // Strictly more labels than the best so far: file order decides ties.
        if best.as_ref().map_or(true, |(best_count, _)| count > *best_count) {
            best = Some((count, parsed));
        }
    }

    Ok(match best {
        None => LookupOutcome::Miss,
        Some((count, rr)) if count == target.label_count() => LookupOutcome::Exact(rr),
        Some((_, rr)) => LookupOutcome::BestSuffix(rr),
    })
}

/// Saves records into the cache file. A line with the same type, class and
/// owner is overwritten in place rather than duplicated or kept stale.
/// Returns whether any record matched the filter's owner and qtype.
fn write_cache(
    path: &Path,
    records: &[ResourceRecord],
    filter: &WritebackFilter,
    force_save: bool,
) -> Result<bool, DomainError> {
    let mut matched = false;
    if records.is_empty() {
        return Ok(matched);
    }

    let contents = read_file(path)?;
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
    let mut changed = false;

    for rr in records {
        let hit = rr.name == filter.owner && rr.record_type() == filter.qtype;
        matched |= hit;
        if !(hit || force_save) {
            continue;
        }

        let new_line = format_line(rr);
        let key = format!("{}\t{}\t{}", rr.record_type(), rr.class, rr.name);
        match lines
            .iter_mut()
            .find(|l| l.strip_prefix(&key).is_some_and(|rest| rest.starts_with('\t')))
        {
            Some(existing) => {
                if *existing != new_line {
                    debug!(owner = %rr.name, rtype = %rr.record_type(), "cache entry replaced");
                    *existing = new_line;
                    changed = true;
                }
            }
            None => {
                debug!(owner = %rr.name, rtype = %rr.record_type(), "cache entry added");
                lines.push(new_line);
                changed = true;
            }
        }
    }

    if changed {
        let mut output = lines.join("\n");
        if !output.is_empty() {
            output.push('\n');
        }
        fs::write(path, output)
            .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))?;
    }
    Ok(matched)
}
