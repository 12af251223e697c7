//! 分享链接
//!
//! `http://<地址>:<端口>/<相对路径>`，纯字符串拼接，不做网络访问。

use std::fmt;

/// 拼接分享链接
pub fn compose(address: &str, port: u16, relative_path: &str) -> String {
    format!(
        "http://{}:{}/{}",
        address,
        port,
        relative_path.trim_start_matches('/')
    )
}

/// 由地址、端口和下载路径组成的分享链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub address: String,
    pub port: u16,
    pub path: String,
}

impl ShareLink {
    pub fn new(address: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            path: path.into(),
        }
    }

    /// 为每个地址生成同一路径的链接
    pub fn for_addresses<'a, I>(addresses: I, port: u16, path: &str) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a String>,
    {
        addresses
            .into_iter()
            .map(|addr| Self::new(addr.clone(), port, path))
            .collect()
    }

    /// 不含路径的服务器地址，形如 `http://192.168.1.5:27149`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&compose(&self.address, self.port, &self.path))
    }
}
