//! HTTP 分享服务器
//!
//! # 接口
//!
//! - `POST /api/v1/texts` 上传文本
//! - `POST /api/v1/files` 上传文件 (multipart 字段 `raw`)
//! - `GET /uploads/:name` 下载已上传内容
//! - `GET /api/v1/addresses` 列出局域网地址
//! - `GET /api/v1/qrcodes?content=...` 生成二维码 PNG
//!
//! 配置了静态目录时，`/static/*` 提供前端页面，找不到的路径回退到 `index.html`。

use log::info;

use crate::config::ServerSettings;
use crate::net;
use crate::qr;
use crate::store::ContentStore;
use crate::transfer::error::{ApiError, ApiResult};
use crate::transfer::protocol::{
    ADDRESSES_PATH, AddressesResponse, DOWNLOAD_PATH, FILE_FIELD, FILES_PATH, QRCODES_PATH,
    QrQuery, TEXTS_PATH, TextUpload, UploadResponse,
};
use axum::{
    Json, Router,
    body::Body,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

/// 处理器共享状态
pub struct AppState {
    pub store: ContentStore,
    pub qr_size: u32,
}

/// 分享服务器
pub struct ShareServer {
    settings: ServerSettings,
    state: Arc<AppState>,
}

impl ShareServer {
    pub fn new(settings: ServerSettings) -> Self {
        let state = Arc::new(AppState {
            store: ContentStore::new(settings.storage_dir.clone()),
            qr_size: settings.qr_size,
        });
        Self { settings, state }
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn store(&self) -> &ContentStore {
        &self.state.store
    }

    /// 完整的应用路由（接口 + 静态页面 + 404 回退）
    pub fn router(&self) -> Router {
        let mut app = api_router(self.state.clone())
            .layer(DefaultBodyLimit::max(self.settings.max_upload_bytes()));

        if let Some(dir) = &self.settings.static_dir {
            let index = ServeFile::new(dir.join("index.html"));
            app = app
                .route("/", get(|| async { Redirect::temporary("/static/") }))
                .nest_service("/static", ServeDir::new(dir).fallback(index));
        }

        app.fallback(|| async { StatusCode::NOT_FOUND })
    }

    /// 绑定监听端口
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        let addr = SocketAddr::new(self.settings.bind, self.settings.port);
        let listener = TcpListener::bind(addr).await?;
        info!(
            "Share server listening on {}, storing uploads in {:?}",
            listener.local_addr()?,
            self.settings.storage_dir
        );
        Ok(listener)
    }
}

/// 接口路由
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(TEXTS_PATH, post(upload_text))
        .route(FILES_PATH, post(upload_file))
        .route(DOWNLOAD_PATH, get(download))
        .route(ADDRESSES_PATH, get(list_addresses))
        .route(QRCODES_PATH, get(qrcode))
        .with_state(state)
}

async fn upload_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextUpload>, JsonRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let Json(upload) = payload.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

    let item = state.store.put_text(&upload.raw).await?;
    info!("Text upload stored as {}", item.file_name());

    Ok(Json(UploadResponse {
        url: item.url_path(),
    }))
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(ApiError::BadRequest(format!(
                "field `{FILE_FIELD}` is not a file"
            )));
        };

        // 分块写入临时文件；出错返回时 pending 被丢弃，临时文件随之删除
        let mut pending = state.store.begin_file(&file_name).await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?
        {
            pending.write(&chunk).await?;
        }
        let written = pending.written();
        let item = pending.commit().await?;
        info!("File upload ({} bytes) stored as {}", written, item.file_name());

        return Ok(Json(UploadResponse {
            url: item.url_path(),
        }));
    }

    Err(ApiError::BadRequest(format!(
        "missing file field `{FILE_FIELD}`"
    )))
}

/// 文件下载处理器
async fn download(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let stored = state.store.resolve(&name).await?;

    info!("Download request for {}", stored.name);

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&stored.name)),
        (header::CONTENT_LENGTH, stored.len.to_string()),
        (
            HeaderName::from_static("content-description"),
            "File Transfer".to_string(),
        ),
        (
            HeaderName::from_static("content-transfer-encoding"),
            "binary".to_string(),
        ),
    ];
    let stream = tokio_util::io::ReaderStream::new(stored.file);
    Ok((headers, Body::from_stream(stream)).into_response())
}

/// 非 ASCII 文件名使用 RFC 5987 的 `filename*` 形式
fn content_disposition(name: &str) -> String {
    if name.is_ascii() {
        format!("attachment; filename={name}")
    } else {
        format!(
            "attachment; filename*=UTF-8''{}",
            utf8_percent_encode(name, NON_ALPHANUMERIC)
        )
    }
}

async fn list_addresses() -> Json<AddressesResponse> {
    Json(AddressesResponse {
        addresses: net::list_lan_addresses(),
    })
}

async fn qrcode(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QrQuery>,
) -> ApiResult<Response> {
    let content = query
        .content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing `content` query parameter".to_string()))?;

    let size = state.qr_size;
    let png = tokio::task::spawn_blocking(move || qr::encode_with_size(&content, size))
        .await
        .map_err(|e| ApiError::Internal(format!("QR task failed: {e}")))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
