use image::ImageFormat;

use crate::constants::{DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY};

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// 文字列から OutputFormat を作成
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Content-Type を取得
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// ファイル拡張子（ドット付き）を取得
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::WebP => ".webp",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

/// 正規化パラメータ
///
/// 出力は `max_width` x `max_height` の領域に収まるよう縮小される
#[derive(Debug, Clone)]
pub struct NormalizeParams {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
    pub format: OutputFormat,
}

impl NormalizeParams {
    pub fn new(max_width: u32, max_height: u32, quality: Option<u8>, format: OutputFormat) -> Self {
        Self {
            max_width,
            max_height,
            quality: quality.unwrap_or(DEFAULT_QUALITY),
            format,
        }
    }
}

impl Default for NormalizeParams {
    /// 816x612、品質 80 の JPEG
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT, None, OutputFormat::Jpeg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_str("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_str("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_str("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_str("avif"), None);
    }

    #[test]
    fn test_extension() {
        assert_eq!(OutputFormat::Jpeg.extension(), ".jpg");
        assert_eq!(OutputFormat::Png.extension(), ".png");
        assert_eq!(OutputFormat::WebP.extension(), ".webp");
    }

    #[test]
    fn test_default_params() {
        let params = NormalizeParams::default();
        assert_eq!(params.max_width, 816);
        assert_eq!(params.max_height, 612);
        assert_eq!(params.quality, DEFAULT_QUALITY);
        assert_eq!(params.format, OutputFormat::Jpeg);
    }
}
