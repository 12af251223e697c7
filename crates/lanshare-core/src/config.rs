//! 服务器配置
//!
//! 从 `~/.config/lanshare/settings.toml` 读取端口、存储目录等设置，缺失字段使用默认值。

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 27149;

/// 服务器设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 监听端口
    pub port: u16,
    /// 监听地址
    pub bind: IpAddr,
    /// 上传内容存储目录
    pub storage_dir: PathBuf,
    /// 前端静态文件目录（可选）
    pub static_dir: Option<PathBuf>,
    /// 单次上传大小上限 (MiB)
    pub max_upload_mb: u64,
    /// 二维码图片边长 (像素)
    pub qr_size: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            storage_dir: default_storage_dir(),
            static_dir: None,
            max_upload_mb: 1024,
            qr_size: crate::qr::DEFAULT_SIZE,
        }
    }
}

impl ServerSettings {
    /// 默认配置文件路径
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lanshare")
            .join("settings.toml")
    }

    /// 加载设置（文件不存在或无法解析时使用默认值）
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map_or_else(Self::config_path, Path::to_path_buf);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(settings) => {
                        debug!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 上传大小上限 (字节)
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

/// 默认存储目录: 可执行文件所在目录下的 `uploads`
///
/// 无法确定可执行文件位置时退回到当前目录下的 `uploads`。
pub fn default_storage_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::store::URL_PREFIX)
}
