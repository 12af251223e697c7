//! 上传内容标识符
//!
//! 每次上传生成一个随机 128 位 UUID (v4)，以规范的连字符小写形式作为文件名。

use uuid::Uuid;

/// 生成新的内容标识符
pub fn generate() -> Uuid {
    Uuid::new_v4()
}
