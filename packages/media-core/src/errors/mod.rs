mod report;
mod types;

pub use types::{CryptoError, MediaError, StorageError, TransformError};
