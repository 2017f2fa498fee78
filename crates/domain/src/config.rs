use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DNS_PORT: u16 = 53;

/// Default bound on one outbound send/receive during iterative chasing.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// What the server is, chosen by the CLI role flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRole {
    /// Role 0: sits in front of a stub client over framed TCP and chases
    /// referrals on its behalf, falling back to the hard-coded root.
    Local,
    /// Role 1: answers from its zone or refers, over UDP.
    Authoritative,
    /// Role 2: authoritative, but resolves misses itself instead of
    /// referring (no root fallback).
    RecursiveAuthoritative,
}

impl ServerRole {
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(ServerRole::Local),
            1 => Some(ServerRole::Authoritative),
            2 => Some(ServerRole::RecursiveAuthoritative),
            _ => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ServerRole::Local)
    }

    pub fn is_recursive(&self) -> bool {
        matches!(self, ServerRole::Local | ServerRole::RecursiveAuthoritative)
    }

    /// Whether replies carry the AA bit.
    pub fn claims_authority(&self) -> bool {
        !self.is_local()
    }
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServerRole::Local => "local",
            ServerRole::Authoritative => "authoritative",
            ServerRole::RecursiveAuthoritative => "recursive-authoritative",
        };
        write!(f, "{}", s)
    }
}

/// Startup configuration, threaded through construction of every
/// component. The file prefix expands to the three record files.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_ip: Ipv4Addr,
    /// Port the listener binds.
    pub port: u16,
    /// Port iterative queries are sent to on referred servers.
    pub upstream_port: u16,
    pub role: ServerRole,
    pub zone_path: PathBuf,
    pub authority_path: PathBuf,
    pub cache_path: PathBuf,
    pub upstream_timeout: Duration,
}

impl ServerConfig {
    pub fn new(bind_ip: Ipv4Addr, file_prefix: &str, role: ServerRole) -> Self {
        Self {
            bind_ip,
            port: DNS_PORT,
            upstream_port: DNS_PORT,
            role,
            zone_path: PathBuf::from(format!("{}resolve.txt", file_prefix)),
            authority_path: PathBuf::from(format!("{}authorised.txt", file_prefix)),
            cache_path: PathBuf::from(format!("{}cache.txt", file_prefix)),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_upstream_port(mut self, port: u16) -> Self {
        self.upstream_port = port;
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// The record files that do not exist yet. The zone and authority
    /// files are read-only inputs; the cache file must also be present (it
    /// may be empty) so that writeback never has to create it.
    pub fn missing_files(&self) -> Vec<&Path> {
        [
            self.zone_path.as_path(),
            self.authority_path.as_path(),
            self.cache_path.as_path(),
        ]
        .into_iter()
        .filter(|p| !p.exists())
        .collect()
    }
}
