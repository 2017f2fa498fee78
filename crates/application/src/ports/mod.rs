mod record_store;
mod upstream;

pub use record_store::{LookupOutcome, RecordSource, RecordStore, WritebackFilter};
pub use upstream::UpstreamExchange;
