use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};

use crate::errors::TransformError;

/// ヘッダーから読み取った画像の寸法とフォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageBounds {
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, TransformError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(format!("failed to guess format: {e}")))
}

/// 画素データを展開せずに寸法だけを読み取る
pub fn decode_bounds(data: &[u8]) -> Result<ImageBounds, TransformError> {
    if data.is_empty() {
        return Err(TransformError::Decode("image data is empty".to_string()));
    }

    let reader = reader(data)?;
    let format = reader
        .format()
        .ok_or_else(|| TransformError::Decode("unrecognized image format".to_string()))?;
    let (width, height) = reader.into_dimensions().map_err(map_image_error)?;

    if width == 0 || height == 0 {
        return Err(TransformError::Decode(format!(
            "image has no pixels ({width}x{height})"
        )));
    }

    Ok(ImageBounds {
        width,
        height,
        format,
    })
}

/// 画像バイト列をデコードする
///
/// `max_alloc` を超えるメモリ確保が必要な場合は OutOfMemory を返す
pub fn decode_image(data: &[u8], max_alloc: u64) -> Result<DynamicImage, TransformError> {
    let mut reader = reader(data)?;

    let mut limits = Limits::default();
    limits.max_alloc = Some(max_alloc);
    reader.limits(limits);

    reader.decode().map_err(map_image_error)
}

/// `sample_size` ピクセルごとに間引いた画像を返す（最近傍）
pub fn subsample(img: DynamicImage, sample_size: u32) -> DynamicImage {
    if sample_size <= 1 {
        return img;
    }
    let width = (img.width() / sample_size).max(1);
    let height = (img.height() / sample_size).max(1);
    img.resize_exact(width, height, FilterType::Nearest)
}

pub(crate) fn map_image_error(err: ImageError) -> TransformError {
    match err {
        ImageError::Limits(e) => TransformError::OutOfMemory(e.to_string()),
        ImageError::Decoding(e) => TransformError::Decode(e.to_string()),
        ImageError::Unsupported(e) => TransformError::Decode(e.to_string()),
        ImageError::IoError(e) => TransformError::Decode(e.to_string()),
        other => TransformError::ProcessingFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    #[test]
    fn test_decode_bounds() {
        let data = png_bytes(30, 20);
        let bounds = decode_bounds(&data).unwrap();
        assert_eq!(bounds.width, 30);
        assert_eq!(bounds.height, 20);
        assert_eq!(bounds.format, ImageFormat::Png);
        assert_eq!(bounds.pixels(), 600);
    }

    #[test]
    fn test_decode_bounds_empty() {
        assert!(matches!(decode_bounds(&[]), Err(TransformError::Decode(_))));
    }

    #[test]
    fn test_decode_bounds_garbage() {
        let result = decode_bounds(b"definitely not an image");
        assert!(matches!(result, Err(TransformError::Decode(_))));
    }

    #[test]
    fn test_decode_truncated_image() {
        let data = png_bytes(30, 20);
        let result = decode_image(&data[..data.len() / 2], u64::MAX);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_exceeding_memory_limit() {
        let data = png_bytes(200, 200);
        let result = decode_image(&data, 1024);
        assert!(matches!(result, Err(TransformError::OutOfMemory(_))));
    }

    #[test]
    fn test_subsample() {
        let img = DynamicImage::new_rgb8(100, 60);
        let sampled = subsample(img.clone(), 4);
        assert_eq!((sampled.width(), sampled.height()), (25, 15));

        let same = subsample(img, 1);
        assert_eq!((same.width(), same.height()), (100, 60));
    }
}
