use burrow_dns_application::use_cases::ResolveQueryUseCase;
use burrow_dns_domain::{
    DomainName, Message, Question, RData, Rcode, RecordClass, RecordType, ResourceRecord,
    ServerConfig, ServerRole,
};
use burrow_dns_infrastructure::codec::{decode_message, encode_message};
use burrow_dns_infrastructure::net::{read_framed, send_framed, DnsListener, UdpExchange};
use burrow_dns_infrastructure::store::FileRecordStore;
use std::fs;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::{TcpStream, UdpSocket};

fn name(s: &str) -> DomainName {
    s.parse().unwrap()
}

fn write_files(config: &ServerConfig, zone: &str, authority: &str) {
    fs::write(&config.zone_path, zone).unwrap();
    fs::write(&config.authority_path, authority).unwrap();
    fs::write(&config.cache_path, "").unwrap();
}

/// A one-shot scripted peer: answers the first query it receives with the
/// given records and exits.
async fn scripted_root(answers: Vec<ResourceRecord>) -> (u16, tokio::task::JoinHandle<()>) {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = socket.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        let (received, peer) = socket.recv_from(&mut buf).await.unwrap();
        let query = decode_message(&buf[..received]).unwrap();

        let mut response = query.clone();
        response.flags.qr = true;
        response.answers = answers;
        socket
            .send_to(&encode_message(&response).unwrap(), peer)
            .await
            .unwrap();
    });
    (port, handle)
}

#[tokio::test]
async fn local_resolution_iterates_over_udp_and_caches_the_answer() {
    let answer = ResourceRecord::new(
        name("bupt.edu.cn"),
        RecordClass::IN,
        3600,
        RData::A(Ipv4Addr::new(10, 0, 0, 9)),
    );
    let (root_port, root) = scripted_root(vec![answer.clone()]).await;

    let dir = TempDir::new().unwrap();
    let prefix = format!("{}/", dir.path().display());
    let config = ServerConfig::new(Ipv4Addr::LOCALHOST, &prefix, ServerRole::Local)
        .with_upstream_port(root_port)
        .with_upstream_timeout(Duration::from_secs(2));
    write_files(&config, "", "A\tIN\t根.网络\t127.0.0.1\t3600\n");

    let store = Arc::new(FileRecordStore::new(&config));
    let upstream = Arc::new(UdpExchange::new(&config));
    let engine = ResolveQueryUseCase::new(config.role, store, upstream);

    let request = Message {
        id: 0x77AA,
        questions: vec![Question::new(
            name("bupt.edu.cn"),
            RecordType::A,
            RecordClass::IN,
        )],
        ..Message::default()
    };
    let reply = engine.execute(&request).await.unwrap();
    root.await.unwrap();

    assert_eq!(reply.id, 0x77AA);
    assert_eq!(reply.answers, vec![answer]);
    assert_eq!(reply.flags.rcode, Rcode::Ok);
    assert!(reply.flags.ra);
    assert!(!reply.flags.aa);

    let cached = fs::read_to_string(&config.cache_path).unwrap();
    assert_eq!(cached, "A\tIN\tbupt.edu.cn\t10.0.0.9\t3600\n");
}

#[tokio::test]
async fn local_listener_serves_a_framed_tcp_query() {
    let dir = TempDir::new().unwrap();
    let prefix = format!("{}/", dir.path().display());
    let config = ServerConfig::new(Ipv4Addr::LOCALHOST, &prefix, ServerRole::Local)
        .with_port(46253)
        .with_upstream_timeout(Duration::from_secs(1));
    write_files(
        &config,
        "A\tIN\tbupt.edu.cn\t10.0.0.1\t3600\n",
        "",
    );

    let store = Arc::new(FileRecordStore::new(&config));
    let upstream = Arc::new(UdpExchange::new(&config));
    let handler = Arc::new(ResolveQueryUseCase::new(config.role, store, upstream));
    let listener = DnsListener::new(config.clone(), handler);
    let server = tokio::spawn(async move { listener.run().await });

    let mut stream = connect_with_retry((Ipv4Addr::LOCALHOST, config.port)).await;

    let request = Message {
        id: 0x0BAD,
        questions: vec![Question::new(
            name("bupt.edu.cn"),
            RecordType::A,
            RecordClass::IN,
        )],
        ..Message::default()
    };
    send_framed(&mut stream, &encode_message(&request).unwrap())
        .await
        .unwrap();
    let reply_bytes = read_framed(&mut stream).await.unwrap();
    let reply = decode_message(&reply_bytes).unwrap();

    assert_eq!(reply.id, 0x0BAD);
    assert_eq!(reply.answers.len(), 1);
    assert_eq!(
        reply.answers[0].data,
        RData::A(Ipv4Addr::new(10, 0, 0, 1))
    );
    assert!(reply.flags.ra);
    assert_eq!(reply.flags.rcode, Rcode::Ok);

    server.abort();
}

async fn connect_with_retry(addr: (Ipv4Addr, u16)) -> TcpStream {
    for _ in 0..50 {
        if let Ok(stream) = TcpStream::connect(addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not come up on {:?}", addr);
}
