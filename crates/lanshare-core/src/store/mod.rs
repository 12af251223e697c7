//! 内容存储
//!
//! 将上传的文本或文件以随机标识符命名保存到存储目录，并把下载请求中的文件名
//! 解析回可读取的文件。
//!
//! # 布局
//!
//! - 磁盘: `<root>/<uuid>.<ext>`
//! - 下载路径: `uploads/<uuid>.<ext>`
//!
//! 写入先落到隐藏的临时文件 `.tmp.<uuid>`，同步后再重命名，失败的上传不会留下
//! 半截文件。以 `.` 开头的名字永远不可下载。

use crate::id;
use log::{debug, warn};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// 下载路径前缀
pub const URL_PREFIX: &str = "uploads";

/// 文本上传的固定扩展名
pub const TEXT_EXTENSION: &str = "txt";

const MAX_EXTENSION_LEN: usize = 16;

/// 下载路径中需要转义的字符 (非 ASCII 字符总是转义)
const PATH_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'%').add(b'?').add(b'#');

/// 存储错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid item name: {0}")]
    InvalidName(String),

    #[error("item not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 已保存的条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub id: Uuid,
    /// 不含点号的扩展名，`None` 表示没有扩展名
    pub extension: Option<String>,
}

impl StoredItem {
    /// 磁盘上的文件名
    pub fn file_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.id, ext),
            None => self.id.to_string(),
        }
    }

    /// 相对下载路径，形如 `uploads/<id>.txt`
    ///
    /// 非 ASCII 扩展名按 UTF-8 百分号编码。
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}",
            URL_PREFIX,
            utf8_percent_encode(&self.file_name(), PATH_SEGMENT)
        )
    }

    /// 返回给客户端的路径，形如 `/uploads/<id>.txt`
    pub fn url_path(&self) -> String {
        format!("/{}", self.relative_path())
    }
}

/// 已打开、等待下载的文件
#[derive(Debug)]
pub struct StoredFile {
    pub name: String,
    pub file: File,
    pub len: u64,
}

/// 正在写入的条目
///
/// 内容先写入隐藏的临时文件，`commit` 之后才以最终文件名出现。未提交就被丢弃
/// (写入出错、客户端中途断开) 时删除临时文件。
#[derive(Debug)]
pub struct PendingItem {
    item: StoredItem,
    target: PathBuf,
    temp: PathBuf,
    file: Option<File>,
    written: u64,
    committed: bool,
}

impl PendingItem {
    /// 提交后将使用的条目信息
    pub fn item(&self) -> &StoredItem {
        &self.item
    }

    /// 已写入的字节数
    pub fn written(&self) -> u64 {
        self.written
    }

    /// 追加一段内容
    pub async fn write(&mut self, chunk: &[u8]) -> StoreResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("pending item is already closed"))?;
        file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// 同步到磁盘并重命名为最终文件名
    pub async fn commit(mut self) -> StoreResult<StoredItem> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        fs::rename(&self.temp, &self.target).await?;
        self.committed = true;

        debug!("Stored {} bytes as {}", self.written, self.item.file_name());
        Ok(self.item.clone())
    }
}

impl Drop for PendingItem {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // 先关闭句柄，部分平台不允许删除打开中的文件
        drop(self.file.take());
        match std::fs::remove_file(&self.temp) {
            Ok(()) => debug!("Discarded unfinished upload {:?}", self.temp),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temp file {:?}: {}", self.temp, e),
        }
    }
}

/// 上传内容存储
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// 创建存储，目录在首次上传时才创建
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 保存一段文本
    pub async fn put_text(&self, raw: &str) -> StoreResult<StoredItem> {
        self.put(Some(TEXT_EXTENSION.to_string()), raw.as_bytes())
            .await
    }

    /// 保存一个文件，只保留原文件名的扩展名
    pub async fn put_file(&self, name: &str, content: &[u8]) -> StoreResult<StoredItem> {
        self.put(extension_of(name), content).await
    }

    /// 开始流式保存一个文件，扩展名取自原文件名
    pub async fn begin_file(&self, name: &str) -> StoreResult<PendingItem> {
        self.begin(extension_of(name)).await
    }

    /// 开始写入一个新条目
    pub async fn begin(&self, extension: Option<String>) -> StoreResult<PendingItem> {
        // create_dir_all 对已存在的目录和并发创建都返回成功
        fs::create_dir_all(&self.root).await?;

        let item = StoredItem {
            id: id::generate(),
            extension,
        };
        let target = self.root.join(item.file_name());
        let temp = self.root.join(format!(".tmp.{}", id::generate()));
        let file = File::create(&temp).await?;

        Ok(PendingItem {
            item,
            target,
            temp,
            file: Some(file),
            written: 0,
            committed: false,
        })
    }

    /// 按文件名解析已保存的条目
    ///
    /// 名字必须是单个路径段，否则在访问文件系统之前就被拒绝。
    pub async fn resolve(&self, name: &str) -> StoreResult<StoredFile> {
        validate_name(name)?;

        let path = self.root.join(name);
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        debug!("Resolved {} ({} bytes)", name, meta.len());

        Ok(StoredFile {
            name: name.to_string(),
            file,
            len: meta.len(),
        })
    }

    async fn put(&self, extension: Option<String>, content: &[u8]) -> StoreResult<StoredItem> {
        let mut pending = self.begin(extension).await?;
        pending.write(content).await?;
        pending.commit().await
    }
}

/// 检查下载名是否为安全的单个路径段
fn validate_name(name: &str) -> StoreResult<()> {
    let suspicious = name.is_empty()
        || name.starts_with('.')
        || name.contains("..")
        || name.contains(['/', '\\', '\0']);
    if suspicious {
        return Err(StoreError::InvalidName(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StoreError::InvalidName(name.to_string())),
    }
}

/// 从客户端文件名提取扩展名
///
/// 只取最后一个路径段的最后一个扩展名，且仅接受字母数字 (含非 ASCII)、`-`、`_`。
fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let ext = Path::new(base).extension()?.to_str()?;

    let acceptable = !ext.is_empty()
        && ext.chars().count() <= MAX_EXTENSION_LEN
        && ext
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    acceptable.then(|| ext.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn store_in(dir: &TempDir) -> ContentStore {
        ContentStore::new(dir.path().join(URL_PREFIX))
    }

    async fn read_back(store: &ContentStore, name: &str) -> Vec<u8> {
        let mut stored = store.resolve(name).await.unwrap();
        let mut buf = Vec::new();
        stored.file.read_to_end(&mut buf).await.unwrap();
        assert_eq!(stored.len, buf.len() as u64);
        buf
    }

    fn entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_text_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let text = "hello 你好\nsecond line";
        let item = store.put_text(text).await.unwrap();

        assert_eq!(item.extension.as_deref(), Some("txt"));
        assert_eq!(item.relative_path(), format!("uploads/{}.txt", item.id));
        assert_eq!(item.url_path(), format!("/uploads/{}.txt", item.id));
        assert_eq!(read_back(&store, &item.file_name()).await, text.as_bytes());
    }

    #[tokio::test]
    async fn test_empty_text_is_stored() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let item = store.put_text("").await.unwrap();
        assert!(read_back(&store, &item.file_name()).await.is_empty());
    }

    #[tokio::test]
    async fn test_directory_creation_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.root()).unwrap();

        store.put_text("a").await.unwrap();
        store.put_text("b").await.unwrap();

        assert_eq!(entries(store.root()).len(), 2);
    }

    #[tokio::test]
    async fn test_file_keeps_extension_only() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let content = [0u8, 159, 146, 150, 255];
        let item = store.put_file("holiday photo.JPG", &content).await.unwrap();

        assert_eq!(item.extension.as_deref(), Some("JPG"));
        assert!(item.relative_path().ends_with(".JPG"));
        assert!(!item.file_name().contains("holiday"));
        assert_eq!(read_back(&store, &item.file_name()).await, content);
    }

    #[test]
    fn test_extension_extraction() {
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("C:\\Users\\me\\notes.md").as_deref(), Some("md"));
        assert_eq!(extension_of("dir/sub/report.pdf").as_deref(), Some("pdf"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("weird.p%2Fq"), None);
        assert_eq!(extension_of("long.abcdefghijklmnopq"), None);
        assert_eq!(extension_of("报告.文档").as_deref(), Some("文档"));
        assert_eq!(extension_of("space.a b"), None);
    }

    #[tokio::test]
    async fn test_non_ascii_extension_is_percent_encoded() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let item = store.put_file("报告.文档", b"doc").await.unwrap();
        assert_eq!(item.file_name(), format!("{}.文档", item.id));
        assert_eq!(
            item.url_path(),
            format!("/uploads/{}.%E6%96%87%E6%A1%A3", item.id)
        );
        assert_eq!(read_back(&store, &item.file_name()).await, b"doc");
    }

    #[tokio::test]
    async fn test_file_without_extension() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let item = store.put_file("Makefile", b"all:").await.unwrap();
        assert_eq!(item.file_name(), item.id.to_string());
        assert_eq!(read_back(&store, &item.file_name()).await, b"all:");
    }

    #[tokio::test]
    async fn test_no_temp_files_left() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let item = store.put_file("a.bin", &[1, 2, 3]).await.unwrap();
        assert_eq!(entries(store.root()), vec![item.file_name()]);
    }

    #[tokio::test]
    async fn test_resolve_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.resolve("does-not-exist.txt").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.put_text("inside").await.unwrap();
        // 存储目录之外确实存在的文件
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        for name in [
            "../secret.txt",
            "..",
            ".",
            "",
            "a/b.txt",
            "a\\b.txt",
            "/etc/passwd",
            "..\\secret.txt",
            "x..y",
            ".tmp.123",
            "nul\0.txt",
        ] {
            let err = store.resolve(name).await.unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidName(_)),
                "{name:?} should be rejected, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.root().join("nested")).unwrap();

        let err = store.resolve("nested").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unwritable_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("uploads");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let store = ContentStore::new(&blocker);

        let err = store.put_text("x").await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[tokio::test]
    async fn test_streamed_write() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut pending = store.begin_file("video.mp4").await.unwrap();
        for chunk in [b"abc".as_slice(), b"".as_slice(), b"defg".as_slice()] {
            pending.write(chunk).await.unwrap();
        }
        assert_eq!(pending.written(), 7);

        let item = pending.commit().await.unwrap();
        assert_eq!(entries(store.root()), vec![item.file_name()]);
        assert_eq!(read_back(&store, &item.file_name()).await, b"abcdefg");
    }

    #[tokio::test]
    async fn test_dropped_pending_item_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut pending = store.begin_file("big.iso").await.unwrap();
        pending.write(b"partial").await.unwrap();
        let temp_files = entries(store.root());
        assert_eq!(temp_files.len(), 1);
        assert!(temp_files[0].starts_with(".tmp."), "{temp_files:?}");

        drop(pending);
        assert!(entries(store.root()).is_empty());
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut pending = store.begin_file("a.bin").await.unwrap();
        pending.write(b"content").await.unwrap();
        // 目标名被非空目录占用，重命名必然失败
        let name = pending.item().file_name();
        std::fs::create_dir_all(store.root().join(&name).join("inner")).unwrap();

        let err = pending.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)), "{err:?}");
        assert_eq!(entries(store.root()), vec![name]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_uploads() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.put_text(&format!("item {i}")).await })
            })
            .collect();

        let mut names = std::collections::HashSet::new();
        for handle in handles {
            let item = handle.await.unwrap().unwrap();
            assert!(names.insert(item.file_name()));
        }
        assert_eq!(entries(store.root()).len(), 32);
    }
}
