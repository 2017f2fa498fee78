use crate::codec::{decode_message, encode_message};
use async_trait::async_trait;
use burrow_dns_application::ports::UpstreamExchange;
use burrow_dns_domain::{DomainError, Message, Question, ServerConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Ceiling for one response datagram; plain DNS answers in this stack stay
/// far below it.
const MAX_UDP_PAYLOAD: usize = 4096;

/// Iterative UDP exchange: one query datagram, one response datagram, no
/// retransmission. The socket binds the configured local address so
/// captures show which resolver asked.
pub struct UdpExchange {
    local_ip: Ipv4Addr,
    server_port: u16,
    timeout: Duration,
}

impl UdpExchange {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            local_ip: config.bind_ip,
            server_port: config.upstream_port,
            timeout: config.upstream_timeout,
        }
    }
}

#[async_trait]
impl UpstreamExchange for UdpExchange {
    async fn query(
        &self,
        server: Ipv4Addr,
        question: &Question,
        recursion: bool,
    ) -> Result<Message, DomainError> {
        let socket = UdpSocket::bind((self.local_ip, 0))
            .await
            .map_err(|e| DomainError::IoError(format!("failed to bind UDP socket: {}", e)))?;

        let id: u16 = rand::random();
        let query = Message::query(id, question.clone(), recursion);
        let query_bytes = encode_message(&query)?;
        let target = SocketAddr::from((server, self.server_port));

        let bytes_sent = tokio::time::timeout(self.timeout, socket.send_to(&query_bytes, target))
            .await
            .map_err(|_| DomainError::QueryTimeout {
                server: target.to_string(),
            })?
            .map_err(|e| DomainError::IoError(format!("failed to send to {}: {}", target, e)))?;

        debug!(server = %target, bytes_sent, "iterative query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_PAYLOAD];
        let (bytes_received, from_addr) =
            tokio::time::timeout(self.timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| DomainError::QueryTimeout {
                    server: target.to_string(),
                })?
                .map_err(|e| {
                    DomainError::IoError(format!("failed to receive from {}: {}", target, e))
                })?;

        if from_addr.ip() != IpAddr::V4(server) {
            warn!(expected = %target, received_from = %from_addr, "response from unexpected source");
            return Err(DomainError::ResponseMismatch {
                server: target.to_string(),
            });
        }

        let response = decode_message(&recv_buf[..bytes_received])?;

        // A datagram that does not echo our ID and question is not our
        // answer, spoofed or stale.
        if response.id != id || !response.questions.iter().any(|q| q == question) {
            warn!(server = %target, "response does not echo the query");
            return Err(DomainError::ResponseMismatch {
                server: target.to_string(),
            });
        }

        debug!(
            server = %target,
            bytes_received,
            answers = response.answers.len(),
            authorities = response.authorities.len(),
            "iterative response received"
        );

        Ok(response)
    }
}
