use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::constants::MAX_PIXELS;
use crate::errors::TransformError;
use crate::transform::dimensions::calculate_cover_dimensions;

/// 画像をリサイズする
///
/// fast_image_resize の Lanczos3 フィルタを使用する。
/// アルファチャンネルを持つ画像は RGBA のまま処理する。
pub fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    if target_w == 0 || target_h == 0 {
        return Err(TransformError::InvalidParams(format!(
            "resize target must be non-empty, got {target_w}x{target_h}"
        )));
    }

    let total_pixels = target_w as u64 * target_h as u64;
    if total_pixels > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge {
            width: target_w,
            height: target_h,
        });
    }

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        let raw = resize_raw(w, h, rgba.into_raw(), PixelType::U8x4, target_w, target_h)?;
        let resized = RgbaImage::from_raw(target_w, target_h, raw).ok_or_else(|| {
            TransformError::ProcessingFailed("failed to convert resized image".to_string())
        })?;
        Ok(DynamicImage::ImageRgba8(resized))
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        let raw = resize_raw(w, h, rgb.into_raw(), PixelType::U8x3, target_w, target_h)?;
        let resized = RgbImage::from_raw(target_w, target_h, raw).ok_or_else(|| {
            TransformError::ProcessingFailed("failed to convert resized image".to_string())
        })?;
        Ok(DynamicImage::ImageRgb8(resized))
    }
}

fn resize_raw(
    width: u32,
    height: u32,
    buffer: Vec<u8>,
    pixel_type: PixelType,
    target_w: u32,
    target_h: u32,
) -> Result<Vec<u8>, TransformError> {
    let src_image = Image::from_vec_u8(width, height, buffer, pixel_type).map_err(|e| {
        TransformError::ProcessingFailed(format!("failed to create source image: {e}"))
    })?;

    let mut dst_image = Image::new(target_w, target_h, pixel_type);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        )
        .map_err(|e| TransformError::ProcessingFailed(format!("resize failed: {e}")))?;

    Ok(dst_image.into_vec())
}

/// 指定サイズを覆うように拡縮してから中央を切り抜く（サムネイル用）
pub fn crop_to_fill(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    let (src_w, src_h) = (img.width(), img.height());
    let (scaled_w, scaled_h) = calculate_cover_dimensions(src_w, src_h, target_w, target_h);

    let scaled = if (scaled_w, scaled_h) == (src_w, src_h) {
        img.clone()
    } else {
        resize_image(img, scaled_w, scaled_h)?
    };

    let x = (scaled_w - target_w) / 2;
    let y = (scaled_h - target_h) / 2;
    Ok(scaled.crop_imm(x, y, target_w, target_h))
}
