//! 二维码 PNG 生成

use std::io::Cursor;

use image::{ImageFormat, Luma};
use qrcode::QrCode;

use crate::errors::{Result, UseThisLinkError};

/// 生成的图片最小边长（像素）
pub const QR_MIN_SIZE: u32 = 256;

/// 把任意文本编码为二维码 PNG
pub fn render_png(data: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| UseThisLinkError::internal(format!("QR encoding failed: {}", e)))?;

    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .build();

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| UseThisLinkError::internal(format!("PNG encoding failed: {}", e)))?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_render_png() {
        let png = render_png("http://localhost:8080/abcd1234").unwrap();
        assert!(png.starts_with(PNG_MAGIC));

        let img = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert!(img.width() >= 150);
        assert!(img.height() >= 150);
    }

    #[test]
    fn test_render_png_too_long() {
        let data = "x".repeat(8000);
        assert!(render_png(&data).is_err());
    }
}
