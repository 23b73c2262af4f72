use crate::constants::MAX_DIMENSION;
use crate::errors::TransformError;

/// 正規化パラメータ（出力領域と品質）を検証する
pub fn validate_params(max_width: u32, max_height: u32, quality: u8) -> Result<(), TransformError> {
    if quality == 0 || quality > 100 {
        return Err(TransformError::InvalidParams(format!(
            "quality must be 1-100, got {quality}"
        )));
    }

    if max_width == 0 || max_width > MAX_DIMENSION {
        return Err(TransformError::InvalidParams(format!(
            "max width must be 1-{MAX_DIMENSION}, got {max_width}"
        )));
    }

    if max_height == 0 || max_height > MAX_DIMENSION {
        return Err(TransformError::InvalidParams(format!(
            "max height must be 1-{MAX_DIMENSION}, got {max_height}"
        )));
    }

    Ok(())
}
