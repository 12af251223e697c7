//! Lanshare Core Library
//!
//! 局域网内容分享的核心实现：一台设备运行 HTTP 服务器并上传文本或文件，
//! 得到下载链接和对应的二维码，同一局域网内的其他设备扫码即可下载。
//!
//! # 模块
//!
//! - **id**: 上传内容的随机标识符
//! - **store**: 上传内容的磁盘存储与下载解析
//! - **net**: 局域网地址发现、分享链接拼接
//! - **qr**: 二维码 PNG / 终端字符画生成
//! - **transfer**: HTTP 接口、处理器与错误响应
//! - **config**: 服务器设置
//! - **logging**: 日志级别
//!
//! # 使用示例
//!
//! ```ignore
//! use lanshare_core::{ServerSettings, ShareServer};
//!
//! let server = ShareServer::new(ServerSettings::load(None));
//! let listener = server.bind().await?;
//! axum::serve(listener, server.router()).await?;
//! ```

pub mod config;
pub mod id;
pub mod logging;
pub mod net;
pub mod qr;
pub mod store;
pub mod transfer;

pub use config::ServerSettings;
pub use logging::LogLevel;
pub use net::{ShareLink, compose, list_lan_addresses};
pub use store::{ContentStore, PendingItem, StoreError, StoredFile, StoredItem};
pub use transfer::{
    AddressesResponse, ApiError, ShareServer, TextUpload, UploadResponse, api_router,
};
