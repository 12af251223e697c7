//! HTTP 接口路径与 JSON 载荷
//!
//! 服务端和 CLI 客户端共用同一组类型。

use serde::{Deserialize, Serialize};

pub const TEXTS_PATH: &str = "/api/v1/texts";
pub const FILES_PATH: &str = "/api/v1/files";
pub const ADDRESSES_PATH: &str = "/api/v1/addresses";
pub const QRCODES_PATH: &str = "/api/v1/qrcodes";
pub const DOWNLOAD_PATH: &str = "/uploads/:name";

/// 文件上传使用的 multipart 字段名
pub const FILE_FIELD: &str = "raw";

/// 文本上传请求 `{"Raw": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextUpload {
    #[serde(rename = "Raw", alias = "raw")]
    pub raw: String,
}

/// 上传成功响应，`url` 为 `/uploads/<id>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressesResponse {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrQuery {
    #[serde(default)]
    pub content: Option<String>,
}

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// 供程序判断的错误码
    pub error: String,
    pub message: String,
}
