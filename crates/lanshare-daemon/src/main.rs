//! Lanshare Daemon
//!
//! 局域网分享服务进程，负责：
//! - 接收文本和文件上传
//! - 提供下载、局域网地址和二维码接口
//! - （可选）提供前端静态页面

mod service;

use anyhow::Result;
use clap::Parser;
use lanshare_core::{LogLevel, ServerSettings};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lanshare-daemon", version, about = "局域网文本/文件分享服务")]
struct Args {
    /// 配置文件路径 (默认 ~/.config/lanshare/settings.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,
    /// 监听地址
    #[arg(short, long)]
    bind: Option<IpAddr>,
    /// 上传内容存储目录 (默认: 可执行文件所在目录下的 uploads)
    #[arg(short, long)]
    storage: Option<PathBuf>,
    /// 前端静态文件目录
    #[arg(long)]
    static_dir: Option<PathBuf>,
    /// 日志级别 (未设置 RUST_LOG 时生效)
    #[arg(short, long, default_value = "info")]
    log_level: LogLevel,
}

impl Args {
    fn apply(self, mut settings: ServerSettings) -> ServerSettings {
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(bind) = self.bind {
            settings.bind = bind;
        }
        if let Some(storage) = self.storage {
            settings.storage_dir = storage;
        }
        if self.static_dir.is_some() {
            settings.static_dir = self.static_dir;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 桥接 log crate（lanshare-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    // 初始化日志
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.filter_directive())),
        )
        .try_init();

    tracing::info!("Lanshare Daemon starting...");

    let settings = ServerSettings::load(args.config.as_deref());
    let settings = args.apply(settings);

    service::run_service(settings).await
}
