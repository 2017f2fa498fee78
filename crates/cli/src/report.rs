//! Plain-text rendering of a decoded message for the client.

use burrow_dns_domain::{Message, ResourceRecord};

pub fn print_message(msg: &Message) {
    println!(
        "id {:#06x}  rcode {}  questions {}  answers {}  authority {}  additional {}",
        msg.id,
        msg.flags.rcode.to_u16(),
        msg.questions.len(),
        msg.answers.len(),
        msg.authorities.len(),
        msg.additionals.len(),
    );

    for q in &msg.questions {
        println!("question: {} {} {}", q.name, q.qtype, q.qclass);
    }
    print_section("answer", &msg.answers);
    print_section("authority", &msg.authorities);
    print_section("additional", &msg.additionals);
}

fn print_section(label: &str, records: &[ResourceRecord]) {
    for rr in records {
        println!(
            "{}: {} {} {} TTL {} -> {}",
            label,
            rr.name,
            rr.record_type(),
            rr.class,
            rr.ttl,
            rr.data,
        );
    }
}
