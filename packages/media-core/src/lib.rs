pub mod config;
pub mod constants;
pub mod crypto;
pub mod errors;
pub mod gallery;
pub mod normalize;
pub mod storage;
pub mod transform;
pub mod validation;

#[cfg(test)]
mod test_support;

// 公開API
pub use config::{LogConfig, NormalizerConfig};
pub use constants::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, MAX_DIMENSION, MAX_PIXELS, MemoryUnit,
};
pub use crypto::{PassphraseCipher, SealedCipher, SymmetricCipher};
pub use errors::{CryptoError, MediaError, StorageError, TransformError};
pub use gallery::{Gallery, NewGalleryImage, RecentImage};
pub use normalize::{ImageNormalizer, ImageSource, NormalizedImage};
pub use storage::{LocalStore, ObjectStore};
pub use transform::{
    NormalizeParams, Orientation, OutputFormat, apply_orientation, calculate_contain_dimensions,
    calculate_in_sample_size, decode_bounds, decode_sampled, encode_image, read_orientation, resize_image,
};
pub use validation::{validate_key, validate_params};
