use crate::codec::{decode_message, encode_message};
use crate::net::framing::{read_framed, send_framed};
use burrow_dns_application::use_cases::ResolveQueryUseCase;
use burrow_dns_domain::{DomainError, ServerConfig, ServerRole};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{debug, error, info, warn};

const MAX_UDP_REQUEST: usize = 4096;

/// The inbound side of the server. The local role accepts one framed TCP
/// connection per request; the authoritative roles take bare datagrams.
/// Either way exactly one request is in flight at a time: the next
/// accept/receive happens only after the previous reply went out.
pub struct DnsListener {
    config: ServerConfig,
    handler: Arc<ResolveQueryUseCase>,
}

impl DnsListener {
    pub fn new(config: ServerConfig, handler: Arc<ResolveQueryUseCase>) -> Self {
        Self { config, handler }
    }

    pub async fn run(&self) -> Result<(), DomainError> {
        match self.config.role {
            ServerRole::Local => self.run_tcp().await,
            ServerRole::Authoritative | ServerRole::RecursiveAuthoritative => self.run_udp().await,
        }
    }

    async fn run_tcp(&self) -> Result<(), DomainError> {
        let addr = SocketAddr::from((self.config.bind_ip, self.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DomainError::IoError(format!("failed to bind TCP {}: {}", addr, e)))?;
        info!(addr = %addr, role = %self.config.role, "listening");

        loop {
            let (mut stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "accept failed");
                    continue;
                }
            };
            if let Err(e) = self.serve_stream(&mut stream, peer).await {
                warn!(client = %peer, error = %e, "request abandoned");
            }
        }
    }

    async fn serve_stream(
        &self,
        stream: &mut TcpStream,
        peer: SocketAddr,
    ) -> Result<(), DomainError> {
        let request_bytes = read_framed(stream).await?;
        let request = decode_message(&request_bytes)?;
        debug!(client = %peer, questions = request.questions.len(), "query received");

        let started = Instant::now();
        let reply = self.handler.execute(&request).await?;
        let reply_bytes = encode_message(&reply)?;
        send_framed(stream, &reply_bytes).await?;

        debug!(
            client = %peer,
            elapsed_us = started.elapsed().as_micros() as u64,
            answers = reply.answers.len(),
            rcode = reply.flags.rcode.to_u16(),
            "reply sent"
        );
        Ok(())
    }

    async fn run_udp(&self) -> Result<(), DomainError> {
        let addr = SocketAddr::from((self.config.bind_ip, self.config.port));
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| DomainError::IoError(format!("failed to bind UDP {}: {}", addr, e)))?;
        info!(addr = %addr, role = %self.config.role, "listening");

        let mut recv_buf = [0u8; MAX_UDP_REQUEST];
        loop {
            let (received, peer) = match socket.recv_from(&mut recv_buf).await {
                Ok(datagram) => datagram,
                Err(e) => {
                    error!(error = %e, "receive failed");
                    continue;
                }
            };
            if let Err(e) = self
                .serve_datagram(&socket, &recv_buf[..received], peer)
                .await
            {
                warn!(client = %peer, error = %e, "request abandoned");
            }
        }
    }

    async fn serve_datagram(
        &self,
        socket: &UdpSocket,
        request_bytes: &[u8],
        peer: SocketAddr,
    ) -> Result<(), DomainError> {
        let request = decode_message(request_bytes)?;
        debug!(client = %peer, questions = request.questions.len(), "query received");

        let started = Instant::now();
        let reply = self.handler.execute(&request).await?;
        let reply_bytes = encode_message(&reply)?;
        socket
            .send_to(&reply_bytes, peer)
            .await
            .map_err(|e| DomainError::IoError(format!("failed to send to {}: {}", peer, e)))?;

        debug!(
            client = %peer,
            elapsed_us = started.elapsed().as_micros() as u64,
            answers = reply.answers.len(),
            rcode = reply.flags.rcode.to_u16(),
            "reply sent"
        );
        Ok(())
    }
}
