pub mod cache;
pub mod source;

use std::path::{Path, PathBuf};

use crate::config::NormalizerConfig;
use crate::constants::THUMBNAIL_QUALITY;
use crate::errors::{MediaError, TransformError};
use crate::storage::{LocalStore, ObjectStore};
use crate::transform::{
    ImageBounds, NormalizeParams, Orientation, OutputFormat, apply_orientation,
    calculate_contain_dimensions, calculate_cover_dimensions, calculate_in_sample_size,
    crop_to_fill, decode_bounds, decode_sampled, encode_image, read_orientation, resize_image,
};
use crate::validation::validate_params;

pub use cache::CompressedCache;
pub use source::ImageSource;

/// 正規化済みの画像
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl NormalizedImage {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// 画像の正規化（縮小・向き補正・再エンコード）を行う
///
/// 呼び出しは同期的で、内部状態を持たないため再入可能
#[derive(Debug, Clone)]
pub struct ImageNormalizer<S = LocalStore> {
    config: NormalizerConfig,
    store: S,
    cache: CompressedCache,
}

impl ImageNormalizer<LocalStore> {
    /// ファイルパスをそのまま読み込む ImageNormalizer を作成する
    pub fn with_local_files(config: NormalizerConfig) -> Self {
        Self::new(config, LocalStore::unrooted())
    }
}

impl<S: ObjectStore> ImageNormalizer<S> {
    pub fn new(config: NormalizerConfig, store: S) -> Self {
        let cache = CompressedCache::new(config.cache_dir.clone());
        Self {
            config,
            store,
            cache,
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    fn load(&self, source: &ImageSource) -> Result<Vec<u8>, MediaError> {
        match source {
            ImageSource::Stored(key) => Ok(self.store.read_object(key)?),
            ImageSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    fn check_bounds(&self, bounds: &ImageBounds) -> Result<(), TransformError> {
        if bounds.pixels() > self.config.max_pixels {
            return Err(TransformError::ResolutionTooLarge {
                width: bounds.width,
                height: bounds.height,
            });
        }
        Ok(())
    }

    /// 画像を領域内に縮小し、EXIF の向きを補正して再エンコードする
    ///
    /// 出力は必ず `max_width` x `max_height` に収まる。向き補正で幅と高さが
    /// 入れ替わる場合は、補正前の縮小で領域を転置して扱う。
    pub fn normalize(
        &self,
        source: &ImageSource,
        params: &NormalizeParams,
    ) -> Result<NormalizedImage, MediaError> {
        validate_params(params.max_width, params.max_height, params.quality)?;

        let data = self.load(source)?;

        // まずヘッダーだけを読み、画素バッファを確保せずに寸法を得る
        let bounds = decode_bounds(&data)?;
        self.check_bounds(&bounds)?;

        let orientation = read_orientation(&data).unwrap_or(Orientation::Normal);
        let (box_w, box_h) = if orientation.swaps_axes() {
            (params.max_height, params.max_width)
        } else {
            (params.max_width, params.max_height)
        };

        let (dst_w, dst_h) = calculate_contain_dimensions(bounds.width, bounds.height, box_w, box_h);
        let sample_size = calculate_in_sample_size(bounds.width, bounds.height, dst_w, dst_h);

        if self.config.log.debug_on() {
            tracing::debug!(
                source = %source.describe(),
                src_w = bounds.width,
                src_h = bounds.height,
                dst_w,
                dst_h,
                sample_size,
                orientation = ?orientation,
                "normalizing image"
            );
        }

        // 縮小後の解像度でデコードし、確保するメモリを抑える
        let sampled = decode_sampled(&data, &bounds, sample_size, self.config.max_decode_alloc)?;
        let scaled = if (sampled.width(), sampled.height()) != (dst_w, dst_h) {
            resize_image(&sampled, dst_w, dst_h)?
        } else {
            sampled
        };
        let upright = apply_orientation(scaled, orientation);

        let bytes = encode_image(&upright, params.format, params.quality)?;

        Ok(NormalizedImage {
            bytes,
            width: upright.width(),
            height: upright.height(),
            format: params.format,
        })
    }

    /// 正規化した画像をキャッシュディレクトリに書き出し、そのパスを返す
    pub fn compress_to_file(
        &self,
        source: &ImageSource,
        params: &NormalizeParams,
    ) -> Result<PathBuf, MediaError> {
        let image = self.normalize(source, params)?;
        let path = self.cache.write(image.format, &image.bytes)?;

        self.config.log.debug(
            "compress_to_file",
            format_args!("created compressed file: {}", path.display()),
        );
        Ok(path)
    }

    /// 既定のパラメータ（816x612、品質 80、JPEG）で圧縮する
    pub fn compress_default(&self, path: impl AsRef<Path>) -> Result<PathBuf, MediaError> {
        let source = ImageSource::from_path(path)?;
        self.compress_to_file(&source, &NormalizeParams::default())
    }

    /// 失敗をログに記録して None を返す版の `normalize`
    pub fn normalize_or_none(
        &self,
        source: &ImageSource,
        params: &NormalizeParams,
    ) -> Option<NormalizedImage> {
        self.normalize(source, params)
            .map_err(|e| self.report(&e, "normalize", source, params))
            .ok()
    }

    /// 失敗をログに記録して None を返す版の `compress_to_file`
    pub fn compress_to_file_or_none(
        &self,
        source: &ImageSource,
        params: &NormalizeParams,
    ) -> Option<PathBuf> {
        self.compress_to_file(source, params)
            .map_err(|e| self.report(&e, "compress_to_file", source, params))
            .ok()
    }

    fn report(&self, err: &MediaError, op: &str, source: &ImageSource, params: &NormalizeParams) {
        let context = format!(
            "{op}({}, {}, {}, {}, {:?})",
            source.describe(),
            params.max_width,
            params.max_height,
            params.quality,
            params.format
        );
        err.report(&self.config.log, &context);
    }

    /// 中央を切り抜いた `width` x `height` の JPEG サムネイルを作成する
    pub fn thumbnail(
        &self,
        source: &ImageSource,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, MediaError> {
        validate_params(width, height, THUMBNAIL_QUALITY)?;

        let data = self.load(source)?;
        let bounds = decode_bounds(&data)?;
        self.check_bounds(&bounds)?;

        let orientation = read_orientation(&data).unwrap_or(Orientation::Normal);
        let (fill_w, fill_h) = if orientation.swaps_axes() {
            calculate_cover_dimensions(bounds.width, bounds.height, height, width)
        } else {
            calculate_cover_dimensions(bounds.width, bounds.height, width, height)
        };
        let sample_size = calculate_in_sample_size(bounds.width, bounds.height, fill_w, fill_h);

        let sampled = decode_sampled(&data, &bounds, sample_size, self.config.max_decode_alloc)?;
        let upright = apply_orientation(sampled, orientation);
        let thumb = crop_to_fill(&upright, width, height)?;

        Ok(encode_image(&thumb, OutputFormat::Jpeg, THUMBNAIL_QUALITY)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::test_support::{jpeg_bytes, jpeg_with_orientation, png_bytes};
    use bytes::Bytes;

    fn normalizer(dir: &Path) -> ImageNormalizer {
        ImageNormalizer::with_local_files(
            NormalizerConfig::new(dir).with_log(LogConfig::silent()),
        )
    }

    #[test]
    fn test_normalize_3000x2000_to_default_box() {
        let dir = tempfile::tempdir().unwrap();
        let source = ImageSource::from(png_bytes(3000, 2000));

        let image = normalizer(dir.path())
            .normalize(&source, &NormalizeParams::default())
            .unwrap();

        assert!(image.width <= 816 && image.height <= 612);
        assert_eq!((image.width, image.height), (816, 544));
        assert_eq!(&image.bytes[0..2], &[0xFF, 0xD8]);

        let bounds = decode_bounds(&image.bytes).unwrap();
        assert_eq!((bounds.width, bounds.height), (816, 544));
    }

    #[test]
    fn test_normalize_preserves_aspect_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = normalizer(dir.path());
        let params = NormalizeParams::new(100, 80, Some(90), OutputFormat::Png);

        for &(w, h) in &[(400, 100), (100, 400), (333, 222), (50, 40)] {
            let image = normalizer
                .normalize(&ImageSource::from(png_bytes(w, h)), &params)
                .unwrap();
            assert!(image.width <= 100 && image.height <= 80);

            let expected_h = image.width as f64 * h as f64 / w as f64;
            let expected_w = image.height as f64 * w as f64 / h as f64;
            assert!(
                (image.height as f64 - expected_h).abs() <= 1.0
                    || (image.width as f64 - expected_w).abs() <= 1.0,
                "{w}x{h} -> {}x{}",
                image.width,
                image.height
            );
        }
    }

    #[test]
    fn test_normalize_does_not_enlarge() {
        let dir = tempfile::tempdir().unwrap();
        let image = normalizer(dir.path())
            .normalize(
                &ImageSource::from(png_bytes(40, 30)),
                &NormalizeParams::default(),
            )
            .unwrap();
        assert_eq!((image.width, image.height), (40, 30));
    }

    #[test]
    fn test_normalize_rotates_by_exif_and_fits_box() {
        let dir = tempfile::tempdir().unwrap();
        // 横長で保存され、90度回転が必要な写真
        let source = ImageSource::from(jpeg_with_orientation(1200, 800, 6));

        let image = normalizer(dir.path())
            .normalize(&source, &NormalizeParams::default())
            .unwrap();

        assert!(image.height > image.width);
        assert!(image.width <= 816 && image.height <= 612);
        assert_eq!((image.width, image.height), (408, 612));
    }

    #[test]
    fn test_normalize_corrupt_input() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = normalizer(dir.path());
        let params = NormalizeParams::default();

        let empty = ImageSource::Memory(Bytes::new());
        assert!(matches!(
            normalizer.normalize(&empty, &params),
            Err(MediaError::Transform(TransformError::Decode(_)))
        ));
        assert!(normalizer.normalize_or_none(&empty, &params).is_none());

        let garbage = ImageSource::from(b"\x89PNG\r\n\x1a\nnot really".to_vec());
        assert!(normalizer.normalize_or_none(&garbage, &params).is_none());
    }

    #[test]
    fn test_normalize_out_of_memory_is_reported_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = ImageNormalizer::with_local_files(
            NormalizerConfig::new(dir.path())
                .with_log(LogConfig::silent())
                .with_max_decode_alloc(64),
        );
        let source = ImageSource::from(png_bytes(64, 64));

        assert!(matches!(
            normalizer.normalize(&source, &NormalizeParams::default()),
            Err(MediaError::Transform(TransformError::OutOfMemory(_)))
        ));
        assert!(
            normalizer
                .normalize_or_none(&source, &NormalizeParams::default())
                .is_none()
        );
    }

    #[test]
    fn test_normalize_large_image_under_small_decode_budget() {
        let dir = tempfile::tempdir().unwrap();
        // フルデコードには 9MB 必要だが、縮小デコードなら 2MB に収まる
        let normalizer = ImageNormalizer::with_local_files(
            NormalizerConfig::new(dir.path())
                .with_log(LogConfig::silent())
                .with_max_decode_alloc(2 * 1024 * 1024),
        );
        let params = NormalizeParams::new(400, 300, Some(80), OutputFormat::Jpeg);

        for data in [png_bytes(2000, 1500), jpeg_bytes(2000, 1500)] {
            let image = normalizer
                .normalize(&ImageSource::from(data), &params)
                .unwrap();
            assert_eq!((image.width, image.height), (400, 300));
        }
    }

    #[test]
    fn test_normalize_rejects_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let params = NormalizeParams::new(0, 612, Some(80), OutputFormat::Jpeg);
        let result = normalizer(dir.path()).normalize(&ImageSource::from(png_bytes(10, 10)), &params);
        assert!(matches!(
            result,
            Err(MediaError::Transform(TransformError::InvalidParams(_)))
        ));
    }

    #[test]
    fn test_compress_default_writes_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.png");
        std::fs::write(&input, png_bytes(1600, 1200)).unwrap();

        let path = normalizer(dir.path()).compress_default(&input).unwrap();

        assert_eq!(path.parent().unwrap(), dir.path().join(".compressed"));
        assert_eq!(path.extension().unwrap(), "jpg");
        let bounds = decode_bounds(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!((bounds.width, bounds.height), (816, 612));
    }

    #[test]
    fn test_compress_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = normalizer(dir.path());
        let source = ImageSource::from_path(dir.path().join("missing.jpg")).unwrap();

        assert!(matches!(
            normalizer.compress_to_file(&source, &NormalizeParams::default()),
            Err(MediaError::Storage(_))
        ));
        assert!(
            normalizer
                .compress_to_file_or_none(&source, &NormalizeParams::default())
                .is_none()
        );
    }

    #[test]
    fn test_compress_webp_extension() {
        let dir = tempfile::tempdir().unwrap();
        let params = NormalizeParams::new(50, 50, None, OutputFormat::WebP);
        let path = normalizer(dir.path())
            .compress_to_file(&ImageSource::from(png_bytes(200, 100)), &params)
            .unwrap();
        assert_eq!(path.extension().unwrap(), "webp");
    }

    #[test]
    fn test_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let data = normalizer(dir.path())
            .thumbnail(&ImageSource::from(png_bytes(640, 360)), 96, 96)
            .unwrap();

        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
        let bounds = decode_bounds(&data).unwrap();
        assert_eq!((bounds.width, bounds.height), (96, 96));
    }

    #[test]
    fn test_thumbnail_rejects_empty_size() {
        let dir = tempfile::tempdir().unwrap();
        let result = normalizer(dir.path()).thumbnail(&ImageSource::from(png_bytes(10, 10)), 0, 10);
        assert!(result.is_err());
    }
}
