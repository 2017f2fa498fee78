use burrow_dns_cli::report;
use burrow_dns_domain::{
    DomainName, HeaderFlags, Message, Question, RecordClass, RecordType, DNS_PORT,
};
use burrow_dns_infrastructure::codec::{decode_message, encode_message};
use burrow_dns_infrastructure::net::{read_framed, send_framed};
use clap::Parser;
use std::net::Ipv4Addr;
use std::process::exit;
use std::time::Instant;
use tokio::net::TcpStream;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Sends one framed TCP query carrying every question given on the command line")]
struct Cli {
    /// Server to query on port 53
    server_ip: Ipv4Addr,

    /// Alternating <name> <type> pairs; types: A, NS, MX, CNAME
    #[arg(required = true)]
    queries: Vec<String>,
}

fn parse_questions(args: &[String]) -> Result<Vec<Question>, String> {
    if args.len() % 2 != 0 {
        return Err("expected alternating <name> <type> pairs".to_string());
    }
    let mut questions = Vec::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        let name: DomainName = pair[0]
            .parse()
            .map_err(|e| format!("{}: {}", pair[0], e))?;
        let qtype: RecordType = pair[1].parse()?;
        if qtype == RecordType::PTR {
            return Err("unsupported type PTR".to_string());
        }
        questions.push(Question::new(name, qtype, RecordClass::IN));
    }
    Ok(questions)
}

#[tokio::main]
async fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        exit(1);
    });

    let questions = parse_questions(&cli.queries).unwrap_or_else(|e| {
        eprintln!("{}", e);
        exit(1);
    });

    let query = Message {
        id: rand::random(),
        flags: HeaderFlags::default(),
        questions,
        ..Message::default()
    };

    let started = Instant::now();
    if let Err(e) = run_query(cli.server_ip, &query).await {
        eprintln!("{}", e);
        exit(1);
    }
    println!("time: {} us", started.elapsed().as_micros());
}

async fn run_query(server_ip: Ipv4Addr, query: &Message) -> anyhow::Result<()> {
    let query_bytes = encode_message(query)?;

    let mut stream = TcpStream::connect((server_ip, DNS_PORT)).await?;
    send_framed(&mut stream, &query_bytes).await?;
    let reply_bytes = read_framed(&mut stream).await?;

    let reply = decode_message(&reply_bytes)?;
    report::print_message(&reply);
    Ok(())
}
