//! 网卡地址枚举
//!
//! 通过 `if-addrs` 读取主机当前的全部网卡地址，只保留其他设备可访问的
//! IPv4 地址。每次调用都重新读取系统状态，不做缓存。

use log::{debug, warn};
use std::io;
use std::net::IpAddr;

/// 列出本机的局域网 IPv4 地址
///
/// 枚举失败时记录警告并返回空列表。
pub fn list_lan_addresses() -> Vec<String> {
    match interface_addresses() {
        Ok(addrs) => filter_lan_addresses(addrs),
        Err(e) => {
            warn!("Failed to enumerate network interfaces: {}", e);
            Vec::new()
        }
    }
}

/// 过滤出非回环的 IPv4 地址，保持原有顺序并去重
pub fn filter_lan_addresses<I>(addrs: I) -> Vec<String>
where
    I: IntoIterator<Item = IpAddr>,
{
    let mut result: Vec<String> = Vec::new();
    for addr in addrs {
        let IpAddr::V4(v4) = addr else {
            continue;
        };
        if v4.is_loopback() || v4.is_unspecified() {
            continue;
        }
        let text = v4.to_string();
        if !result.contains(&text) {
            result.push(text);
        }
    }
    result
}

/// 读取所有网卡上配置的 IP 地址（含回环和 IPv6）
pub fn interface_addresses() -> io::Result<Vec<IpAddr>> {
    let interfaces = if_addrs::get_if_addrs()?;
    debug!("Enumerated {} interface addresses", interfaces.len());
    Ok(interfaces.iter().map(if_addrs::Interface::ip).collect())
}
