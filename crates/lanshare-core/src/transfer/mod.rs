//! HTTP 传输模块
//!
//! 包含:
//! - 接口路径与 JSON 载荷 (服务端与客户端共用)
//! - 分享服务器的路由和处理器
//! - 处理器错误到 HTTP 响应的转换

pub mod error;
pub mod http_server;
pub mod protocol;

pub use error::{ApiError, ApiResult};
pub use http_server::{AppState, ShareServer, api_router};
pub use protocol::{AddressesResponse, ErrorBody, TextUpload, UploadResponse};
