//! 局域网地址发现与分享链接拼接

pub mod address;
pub mod link;

pub use address::{filter_lan_addresses, interface_addresses, list_lan_addresses};
pub use link::{ShareLink, compose};

#[cfg(test)]
mod tests;
