//! Lanshare CLI
//!
//! 命令行客户端，通过 HTTP 与分享服务器通信

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::ShareClient;
use lanshare_core::{ShareLink, UploadResponse, qr};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lanshare", version, about = "局域网分享 - 上传文本或文件并生成二维码")]
struct Cli {
    /// 分享服务器地址
    #[arg(short, long, global = true, default_value = "http://127.0.0.1:27149")]
    server: String,
    /// 不在终端显示二维码
    #[arg(long, global = true)]
    no_qr: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 分享一段文本 (`-` 表示从标准输入读取)
    Text {
        text: String,
    },
    /// 分享文件
    File {
        /// 要分享的文件路径
        path: PathBuf,
    },
    /// 列出服务器的局域网地址
    Addresses,
    /// 生成二维码图片
    Qr {
        /// 二维码内容
        content: String,
        /// 输出 PNG 文件
        #[arg(short, long, default_value = "qrcode.png")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ShareClient::new(&cli.server)?;

    match cli.command {
        Commands::Text { text } => {
            let text = if text == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("无法读取标准输入")?;
                buf
            } else {
                text
            };
            println!("📤 上传文本 ({} 字节)", text.len());
            let uploaded = client.upload_text(text).await?;
            print_share_links(&client, &uploaded, cli.no_qr).await?;
        }
        Commands::File { path } => {
            println!("📤 上传文件: {}", path.display());
            let uploaded = client.upload_file(&path).await?;
            print_share_links(&client, &uploaded, cli.no_qr).await?;
        }
        Commands::Addresses => {
            let addresses = client.addresses().await?;
            if addresses.is_empty() {
                println!("   未发现局域网地址");
            } else {
                for (i, addr) in addresses.iter().enumerate() {
                    println!("   [{}] {}", i, addr);
                }
            }
        }
        Commands::Qr { content, output } => {
            let png = client.qrcode(&content).await?;
            tokio::fs::write(&output, &png)
                .await
                .with_context(|| format!("无法写入 {}", output.display()))?;
            println!("✅ 二维码已保存到 {}", output.display());
        }
    }

    Ok(())
}

/// 打印每个局域网地址对应的分享链接，并显示第一个链接的二维码
async fn print_share_links(
    client: &ShareClient,
    uploaded: &UploadResponse,
    no_qr: bool,
) -> Result<()> {
    let addresses = client.addresses().await?;
    let links = ShareLink::for_addresses(&addresses, client.port(), &uploaded.url);

    println!("✅ 上传完成: {}", uploaded.url);
    let Some(first) = links.first() else {
        println!("   未发现局域网地址，本机链接: {}", client.url(&uploaded.url)?);
        return Ok(());
    };

    for link in &links {
        println!("   🔗 {}", link);
    }
    if !no_qr {
        println!();
        println!("{}", qr::render_terminal(&first.to_string())?);
    }
    Ok(())
}
