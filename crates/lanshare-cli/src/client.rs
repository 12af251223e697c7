//! HTTP Client - 与分享服务器通信

use anyhow::{Context, Result, bail};
use lanshare_core::config::DEFAULT_PORT;
use lanshare_core::transfer::protocol::{
    ADDRESSES_PATH, AddressesResponse, ErrorBody, FILE_FIELD, FILES_PATH, QRCODES_PATH,
    TEXTS_PATH, TextUpload, UploadResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use std::path::Path;

pub struct ShareClient {
    base: Url,
    http: Client,
}

impl ShareClient {
    pub fn new(server: &str) -> Result<Self> {
        let base = Url::parse(server).with_context(|| format!("无效的服务器地址: {server}"))?;
        Ok(Self {
            base,
            http: Client::new(),
        })
    }

    /// 服务器端口，分享链接使用同一端口
    pub fn port(&self) -> u16 {
        self.base.port_or_known_default().unwrap_or(DEFAULT_PORT)
    }

    /// 相对路径对应的本机 URL
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    pub async fn upload_text(&self, raw: String) -> Result<UploadResponse> {
        let response = self
            .http
            .post(self.url(TEXTS_PATH)?)
            .json(&TextUpload { raw })
            .send()
            .await
            .map_err(connect_hint)?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn upload_file(&self, path: &Path) -> Result<UploadResponse> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(content)
            .file_name(name)
            .mime_str(mime.as_ref())?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(self.url(FILES_PATH)?)
            .multipart(form)
            .send()
            .await
            .map_err(connect_hint)?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn addresses(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(self.url(ADDRESSES_PATH)?)
            .send()
            .await
            .map_err(connect_hint)?;
        let body: AddressesResponse = check(response).await?.json().await?;
        Ok(body.addresses)
    }

    pub async fn qrcode(&self, content: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.url(QRCODES_PATH)?)
            .query(&[("content", content)])
            .send()
            .await
            .map_err(connect_hint)?;
        Ok(check(response).await?.bytes().await?.to_vec())
    }
}

fn connect_hint(e: reqwest::Error) -> anyhow::Error {
    if e.is_connect() {
        eprintln!("❌ 无法连接到分享服务器: {}", e);
        eprintln!("   请确保 lanshare-daemon 正在运行");
        eprintln!("   运行: cargo xtask dev");
    }
    e.into()
}

/// 非 2xx 响应转换为错误，优先使用服务端返回的错误信息
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<ErrorBody>().await {
        Ok(body) => bail!("服务器返回 {}: {}", status, body.message),
        Err(_) => bail!("服务器返回 {}", status),
    }
}
