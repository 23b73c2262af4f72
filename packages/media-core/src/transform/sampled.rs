use std::io::Cursor;

use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use jpeg_decoder::PixelFormat;

use crate::errors::TransformError;
use crate::transform::decode::{ImageBounds, decode_image, subsample};

/// 画像を約 `1 / sample_size` の解像度でデコードする
///
/// - JPEG: DCT 段階で縮小（1/2, 1/4, 1/8）。結果は要求サイズ以上になる
/// - 非インターレース PNG: 行を読みながら間引く
/// - それ以外: フルデコードしてから間引く
///
/// JPEG と PNG では縮小後の画素バッファだけを確保し、その量が `max_alloc` を
/// 超える場合は OutOfMemory を返す
pub fn decode_sampled(
    data: &[u8],
    bounds: &ImageBounds,
    sample_size: u32,
    max_alloc: u64,
) -> Result<DynamicImage, TransformError> {
    let sample_size = sample_size.max(1);
    let reduced = match bounds.format {
        ImageFormat::Jpeg => decode_jpeg_scaled(data, bounds, sample_size, max_alloc)?,
        ImageFormat::Png => decode_png_sampled(data, sample_size, max_alloc)?,
        _ => None,
    };

    match reduced {
        Some(img) => Ok(img),
        None => Ok(subsample(decode_image(data, max_alloc)?, sample_size)),
    }
}

fn check_alloc(width: u32, height: u32, channels: usize, max_alloc: u64) -> Result<(), TransformError> {
    let bytes = u64::from(width) * u64::from(height) * channels as u64;
    if bytes > max_alloc {
        return Err(TransformError::OutOfMemory(format!(
            "{width}x{height} decode needs {bytes} bytes, limit is {max_alloc}"
        )));
    }
    Ok(())
}

fn decode_jpeg_scaled(
    data: &[u8],
    bounds: &ImageBounds,
    sample_size: u32,
    max_alloc: u64,
) -> Result<Option<DynamicImage>, TransformError> {
    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
    decoder.read_info().map_err(map_jpeg_error)?;

    let channels = match decoder.info().map(|info| info.pixel_format) {
        Some(PixelFormat::L8) => 1,
        Some(PixelFormat::RGB24) => 3,
        // 16bit グレースケールと CMYK は image クレート側で変換する
        _ => return Ok(None),
    };

    let requested_w = u16::try_from(bounds.width.div_ceil(sample_size)).unwrap_or(u16::MAX);
    let requested_h = u16::try_from(bounds.height.div_ceil(sample_size)).unwrap_or(u16::MAX);
    let (width, height) = decoder
        .scale(requested_w.max(1), requested_h.max(1))
        .map_err(map_jpeg_error)?;
    let (width, height) = (u32::from(width), u32::from(height));
    check_alloc(width, height, channels, max_alloc)?;

    let pixels = decoder.decode().map_err(map_jpeg_error)?;
    let img = if channels == 1 {
        GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
    } else {
        RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };

    img.map(Some).ok_or_else(|| {
        TransformError::Decode(format!("JPEG pixel data does not match {width}x{height}"))
    })
}

fn decode_png_sampled(
    data: &[u8],
    sample_size: u32,
    max_alloc: u64,
) -> Result<Option<DynamicImage>, TransformError> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(map_png_error)?;

    // インターレース画像は行がパスごとに届くため間引けない
    if reader.info().interlaced {
        return Ok(None);
    }

    let (width, height) = (reader.info().width, reader.info().height);
    let (color, _) = reader.output_color_type();
    let channels = color.samples();
    let out_w = (width / sample_size).max(1);
    let out_h = (height / sample_size).max(1);
    check_alloc(out_w, out_h, channels, max_alloc)?;

    let step = sample_size as usize * channels;
    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize * channels);
    let mut y = 0u32;
    while let Some(row) = reader.next_row().map_err(map_png_error)? {
        if y % sample_size == 0 && y / sample_size < out_h {
            let row = row.data();
            for x in 0..out_w as usize {
                let start = x * step;
                let pixel = row.get(start..start + channels).ok_or_else(|| {
                    TransformError::Decode("PNG row is shorter than its header width".to_string())
                })?;
                pixels.extend_from_slice(pixel);
            }
        }
        y += 1;
    }

    let img = match color {
        png::ColorType::Grayscale => {
            GrayImage::from_raw(out_w, out_h, pixels).map(DynamicImage::ImageLuma8)
        }
        png::ColorType::GrayscaleAlpha => {
            GrayAlphaImage::from_raw(out_w, out_h, pixels).map(DynamicImage::ImageLumaA8)
        }
        png::ColorType::Rgb => RgbImage::from_raw(out_w, out_h, pixels).map(DynamicImage::ImageRgb8),
        png::ColorType::Rgba => {
            RgbaImage::from_raw(out_w, out_h, pixels).map(DynamicImage::ImageRgba8)
        }
        png::ColorType::Indexed => return Ok(None),
    };

    img.map(Some).ok_or_else(|| {
        TransformError::Decode(format!("PNG has fewer rows than {out_w}x{out_h} needs"))
    })
}

fn map_jpeg_error(err: jpeg_decoder::Error) -> TransformError {
    TransformError::Decode(format!("JPEG: {err}"))
}

fn map_png_error(err: png::DecodingError) -> TransformError {
    match err {
        png::DecodingError::LimitsExceeded => {
            TransformError::OutOfMemory("PNG decoder limits exceeded".to_string())
        }
        other => TransformError::Decode(format!("PNG: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jpeg_bytes, png_bytes};
    use crate::transform::decode_bounds;
    use image::GenericImageView;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_png_sampled_within_small_budget() {
        // フルデコードには 2000x1500x3 = 9MB 必要
        let data = png_bytes(2000, 1500);
        let bounds = decode_bounds(&data).unwrap();
        assert!(decode_image(&data, 2 * MIB).is_err());

        let img = decode_sampled(&data, &bounds, 5, 2 * MIB).unwrap();
        assert_eq!(img.dimensions(), (400, 300));
    }

    #[test]
    fn test_png_sampled_keeps_top_left_pixel_of_each_block() {
        let data = png_bytes(40, 20);
        let bounds = decode_bounds(&data).unwrap();

        let img = decode_sampled(&data, &bounds, 4, u64::MAX).unwrap();
        assert_eq!(img.dimensions(), (10, 5));
        // パターンは Rgb([x, y, 128])
        let rgb = img.to_rgb8();
        assert_eq!(rgb.get_pixel(3, 2).0, [12, 8, 128]);
    }

    #[test]
    fn test_jpeg_scaled_within_small_budget() {
        let data = jpeg_bytes(2000, 1500);
        let bounds = decode_bounds(&data).unwrap();

        let img = decode_sampled(&data, &bounds, 4, 2 * MIB).unwrap();
        let (w, h) = img.dimensions();
        assert!((500..1000).contains(&w), "{w}x{h}");
        assert!((375..750).contains(&h), "{w}x{h}");
    }

    #[test]
    fn test_sampled_budget_still_enforced() {
        let png = png_bytes(64, 64);
        let bounds = decode_bounds(&png).unwrap();
        assert!(matches!(
            decode_sampled(&png, &bounds, 1, 64),
            Err(TransformError::OutOfMemory(_))
        ));

        let jpeg = jpeg_bytes(64, 64);
        let bounds = decode_bounds(&jpeg).unwrap();
        assert!(matches!(
            decode_sampled(&jpeg, &bounds, 1, 64),
            Err(TransformError::OutOfMemory(_))
        ));
    }

    #[test]
    fn test_sample_size_one_is_full_resolution() {
        let data = png_bytes(30, 20);
        let bounds = decode_bounds(&data).unwrap();
        let img = decode_sampled(&data, &bounds, 1, u64::MAX).unwrap();
        assert_eq!(img.dimensions(), (30, 20));
    }

    #[test]
    fn test_sampled_truncated_png() {
        let data = png_bytes(300, 200);
        let bounds = decode_bounds(&data).unwrap();
        let result = decode_sampled(&data[..data.len() / 2], &bounds, 2, u64::MAX);
        assert!(matches!(result, Err(TransformError::Decode(_))));
    }
}
