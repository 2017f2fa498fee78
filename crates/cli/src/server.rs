use burrow_dns_application::use_cases::ResolveQueryUseCase;
use burrow_dns_domain::{ServerConfig, ServerRole};
use burrow_dns_infrastructure::net::{DnsListener, UdpExchange};
use burrow_dns_infrastructure::store::FileRecordStore;
use clap::Parser;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Self-hosted DNS server: local stub resolver, authoritative, or both")]
struct Cli {
    /// Address to bind on port 53
    bind_ip: Ipv4Addr,

    /// Record file prefix: <prefix>resolve.txt holds the zone,
    /// <prefix>authorised.txt the delegations, <prefix>cache.txt the cache
    file_prefix: String,

    /// 0 = local (TCP front, chases referrals), 1 = authoritative,
    /// 2 = authoritative with recursion
    #[arg(value_parser = parse_role)]
    role: ServerRole,
}

fn parse_role(s: &str) -> Result<ServerRole, String> {
    s.parse::<u8>()
        .ok()
        .and_then(ServerRole::from_flag)
        .ok_or_else(|| format!("invalid role '{}', expected 0, 1 or 2", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(1);
    });

    init_logging();

    let config = ServerConfig::new(cli.bind_ip, &cli.file_prefix, cli.role);
    let missing = config.missing_files();
    if !missing.is_empty() {
        for path in &missing {
            error!(path = %path.display(), "record file missing");
        }
        std::process::exit(1);
    }

    info!(
        bind = %config.bind_ip,
        port = config.port,
        role = %config.role,
        "starting burrow-dns server"
    );

    let store = Arc::new(FileRecordStore::new(&config));
    let upstream = Arc::new(UdpExchange::new(&config));
    let handler = Arc::new(ResolveQueryUseCase::new(config.role, store, upstream));

    DnsListener::new(config, handler).run().await?;
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
