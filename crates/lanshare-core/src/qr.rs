//! 二维码生成
//!
//! 以 M 级纠错生成二维码，输出固定边长的 PNG 图片，或者用于终端显示的
//! Unicode 字符画。

use image::{ImageBuffer, ImageFormat, Luma};
use qrcode::render::unicode::Dense1x2;
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// 默认图片边长（像素）
pub const DEFAULT_SIZE: u32 = 256;

/// 二维码生成错误
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("content is empty")]
    Empty,

    #[error("cannot encode content: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("cannot write PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// 生成 256×256 的 PNG 二维码
pub fn encode(content: &str) -> Result<Vec<u8>, QrError> {
    encode_with_size(content, DEFAULT_SIZE)
}

/// 生成指定边长的 PNG 二维码
///
/// 符号居中放在白色画布上；若边长不足以容纳每模块 1 像素，则输出更大的图片。
pub fn encode_with_size(content: &str, size: u32) -> Result<Vec<u8>, QrError> {
    let code = build(content)?;
    let symbol = code
        .render::<Luma<u8>>()
        .max_dimensions(size, size)
        .build();

    let side = size.max(symbol.width()).max(symbol.height());
    let mut canvas = ImageBuffer::from_pixel(side, side, Luma([255u8]));
    let x = (side - symbol.width()) / 2;
    let y = (side - symbol.height()) / 2;
    image::imageops::overlay(&mut canvas, &symbol, i64::from(x), i64::from(y));

    let mut png = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// 渲染为终端字符画（每个字符表示上下两个模块）
pub fn render_terminal(content: &str) -> Result<String, QrError> {
    let code = build(content)?;
    Ok(code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build())
}

fn build(content: &str) -> Result<QrCode, QrError> {
    if content.is_empty() {
        return Err(QrError::Empty);
    }
    Ok(QrCode::with_error_correction_level(content, EcLevel::M)?)
}
