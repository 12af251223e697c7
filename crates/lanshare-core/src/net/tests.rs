//! 地址发现与链接拼接测试

use super::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// ============================================================================
// 地址过滤
// ============================================================================

#[test]
fn test_filter_drops_loopback_and_ipv6() {
    let addrs = vec![
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V4(Ipv4Addr::new(127, 0, 1, 1)),
        IpAddr::V6(Ipv6Addr::LOCALHOST),
        IpAddr::V6("fe80::1".parse().unwrap()),
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5)),
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)),
    ];

    assert_eq!(filter_lan_addresses(addrs), vec!["192.168.1.5", "10.0.0.7"]);
}

#[test]
fn test_filter_empty_and_duplicates() {
    assert!(filter_lan_addresses(Vec::<IpAddr>::new()).is_empty());
    assert!(filter_lan_addresses(vec![IpAddr::V4(Ipv4Addr::UNSPECIFIED)]).is_empty());

    let dup = IpAddr::V4(Ipv4Addr::new(172, 16, 0, 2));
    assert_eq!(filter_lan_addresses(vec![dup, dup]), vec!["172.16.0.2"]);
}

/// 真实网卡枚举: 结果只能是非回环 IPv4
#[test]
fn test_list_lan_addresses_live() {
    for addr in list_lan_addresses() {
        let ip: Ipv4Addr = addr.parse().expect("only IPv4 addresses are listed");
        assert!(!ip.is_loopback(), "loopback leaked: {addr}");
    }
}

#[test]
fn test_interface_addresses_include_loopback() {
    // 回环网卡总是存在，过滤前应当能看到
    let addrs = interface_addresses().unwrap();
    assert!(addrs.iter().any(IpAddr::is_loopback), "{addrs:?}");
}

// ============================================================================
// 链接拼接
// ============================================================================

#[test]
fn test_compose() {
    assert_eq!(
        compose("192.168.1.5", 27149, "uploads/x.txt"),
        "http://192.168.1.5:27149/uploads/x.txt"
    );
    assert_eq!(
        compose("192.168.1.5", 27149, "/uploads/x.txt"),
        "http://192.168.1.5:27149/uploads/x.txt"
    );
    assert_eq!(compose("10.0.0.1", 80, ""), "http://10.0.0.1:80/");
}

#[test]
fn test_share_link() {
    let addresses = vec!["192.168.1.5".to_string(), "10.0.0.7".to_string()];
    let links = ShareLink::for_addresses(&addresses, 8080, "/uploads/a.png");

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].base_url(), "http://192.168.1.5:8080");
    assert_eq!(links[1].to_string(), "http://10.0.0.7:8080/uploads/a.png");
}
