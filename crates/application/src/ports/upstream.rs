use async_trait::async_trait;
use burrow_dns_domain::{DomainError, Message, Question};
use std::net::Ipv4Addr;

/// One iterative exchange: a single query datagram to `server`, a single
/// response back. Implementations verify that the response belongs to the
/// query (ID and question echo) before returning it.
#[async_trait]
pub trait UpstreamExchange: Send + Sync {
    async fn query(
        &self,
        server: Ipv4Addr,
        question: &Question,
        recursion: bool,
    ) -> Result<Message, DomainError>;
}
