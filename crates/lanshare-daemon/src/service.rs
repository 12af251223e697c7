//! HTTP 服务运行与优雅退出

use anyhow::Result;
use lanshare_core::{ServerSettings, ShareServer, ShareLink, list_lan_addresses};
use tower_http::trace::TraceLayer;

pub async fn run_service(settings: ServerSettings) -> Result<()> {
    let server = ShareServer::new(settings);
    let listener = server.bind().await?;
    let port = listener.local_addr()?.port();

    let addresses = list_lan_addresses();
    if addresses.is_empty() {
        tracing::warn!("未发现局域网地址，其他设备可能无法访问");
    }
    for link in ShareLink::for_addresses(&addresses, port, "") {
        tracing::info!("局域网访问地址: {}", link);
    }

    let app = server.router().layer(TraceLayer::new_for_http());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听 Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，正在关闭...");
}
