use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::errors::TransformError;
use crate::transform::params::OutputFormat;

/// 画像をエンコードする
///
/// quality は JPEG と WebP（非可逆）に効く。PNG は可逆圧縮のため無視される。
pub fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            // JPEG はアルファを持てないため RGB に落とす
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::Png => {
            img.write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| TransformError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
        }
        OutputFormat::WebP => {
            let quality = f32::from(quality.clamp(1, 100));
            let encoded = if img.color().has_alpha() {
                let rgba = img.to_rgba8();
                webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                    .encode_simple(false, quality)
            } else {
                let rgb = img.to_rgb8();
                webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                    .encode_simple(false, quality)
            };
            let encoded = encoded
                .map_err(|e| TransformError::ProcessingFailed(format!("WebP encode failed: {e:?}")))?;
            buf.get_mut().extend_from_slice(&encoded);
        }
    }

    Ok(buf.into_inner())
}
