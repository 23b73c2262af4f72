use thiserror::Error;

/// メディア処理の統合エラー型
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// ストレージアクセスエラー
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("access denied: {key}")]
    Forbidden { key: String },

    #[error("object already exists: {key}")]
    AlreadyExists { key: String },

    #[error("storage error: {0}")]
    Internal(String),
}

/// 画像変換エラー
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("image resolution exceeds maximum ({width}x{height})")]
    ResolutionTooLarge { width: u32, height: u32 },

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// 暗号処理エラー
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("plaintext is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("ciphertext too short ({len} bytes)")]
    Truncated { len: usize },
}
