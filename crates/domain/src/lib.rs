pub mod config;
pub mod errors;
pub mod message;
pub mod name;
pub mod question;
pub mod record;

pub use config::{ServerConfig, ServerRole, DNS_PORT};
pub use errors::DomainError;
pub use message::{HeaderFlags, Message, Rcode};
pub use name::{root_fallback_name, DomainName};
pub use question::Question;
pub use record::{RData, RecordClass, RecordType, ResourceRecord};
