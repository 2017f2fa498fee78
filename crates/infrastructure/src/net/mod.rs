mod framing;
mod listener;
mod udp;

pub use framing::{read_framed, send_framed};
pub use listener::DnsListener;
pub use udp::UdpExchange;
