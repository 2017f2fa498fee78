use burrow_dns_domain::name::{root_fallback_name, DomainName, MAX_LABEL_LEN};

#[test]
fn parse_stores_labels_suffix_first() {
    let name: DomainName = "bupt.edu.cn".parse().unwrap();
    let labels: Vec<&[u8]> = name.labels().iter().map(Vec::as_slice).collect();
    assert_eq!(labels, vec![b"cn" as &[u8], b"edu", b"bupt"]);
}

#[test]
fn display_restores_presentation_order() {
    let name: DomainName = "mail.bupt.edu.cn".parse().unwrap();
    assert_eq!(name.to_string(), "mail.bupt.edu.cn");
}

#[test]
fn wire_labels_iterate_most_significant_first() {
    let name: DomainName = "bupt.edu.cn".parse().unwrap();
    let labels: Vec<&[u8]> = name.wire_labels().collect();
    assert_eq!(labels, vec![b"bupt" as &[u8], b"edu", b"cn"]);
}

#[test]
fn wire_len_counts_length_bytes_and_terminator() {
    let name: DomainName = "bupt.edu.cn".parse().unwrap();
    // 4bupt 3edu 2cn 0
    assert_eq!(name.wire_len(), 13);
}

#[test]
fn utf8_labels_are_preserved() {
    let name: DomainName = "北邮.教育.中国".parse().unwrap();
    assert_eq!(name.label_count(), 3);
    assert_eq!(name.to_string(), "北邮.教育.中国");
}

#[test]
fn empty_and_oversized_labels_are_rejected() {
    assert!("".parse::<DomainName>().is_err());
    assert!("a..b".parse::<DomainName>().is_err());
    assert!(".cn".parse::<DomainName>().is_err());

    let long = "x".repeat(MAX_LABEL_LEN + 1);
    assert!(format!("{}.cn", long).parse::<DomainName>().is_err());
    let fits = "x".repeat(MAX_LABEL_LEN);
    assert!(format!("{}.cn", fits).parse::<DomainName>().is_ok());
}

#[test]
fn common_suffix_counts_from_the_top_level_label() {
    let a: DomainName = "mail.bupt.edu.cn".parse().unwrap();
    let b: DomainName = "www.edu.cn".parse().unwrap();
    let c: DomainName = "example.net".parse().unwrap();

    assert_eq!(a.common_suffix_labels(&b), 2);
    assert_eq!(a.common_suffix_labels(&c), 0);
    assert_eq!(a.common_suffix_labels(&a), 4);
}

#[test]
fn suffix_relation_requires_every_label_to_match() {
    let zone: DomainName = "edu.cn".parse().unwrap();
    let host: DomainName = "mail.bupt.edu.cn".parse().unwrap();
    let other: DomainName = "edu.net".parse().unwrap();

    assert!(zone.is_suffix_of(&host));
    assert!(zone.is_suffix_of(&zone));
    assert!(!host.is_suffix_of(&zone));
    assert!(!zone.is_suffix_of(&other));
}

#[test]
fn root_fallback_is_the_hardcoded_root() {
    let root = root_fallback_name();
    assert_eq!(root.to_string(), "根.网络");
    assert_eq!(root, "根.网络".parse::<DomainName>().unwrap());
}
