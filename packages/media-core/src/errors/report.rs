use super::types::{CryptoError, MediaError, StorageError, TransformError};
use crate::config::LogConfig;

impl MediaError {
    /// エラーを種類に応じたレベルでログ出力する
    ///
    /// `Option` を返す境界関数は、失敗を握りつぶす前に必ずこれを呼ぶ
    pub fn report(&self, log: &LogConfig, context: &str) {
        match self {
            MediaError::Validation(msg) => {
                if log.errors_on() {
                    tracing::warn!(context = %context, error = %msg, "validation error");
                }
            }
            MediaError::Storage(err) => err.report(log, context),
            MediaError::Transform(err) => err.report(log, context),
            MediaError::Crypto(err) => err.report(log, context),
        }
    }
}

impl StorageError {
    pub fn report(&self, log: &LogConfig, context: &str) {
        if !log.errors_on() {
            return;
        }
        match self {
            StorageError::NotFound { key } => {
                tracing::warn!(context = %context, key = %key, "object not found");
            }
            StorageError::Forbidden { key } => {
                tracing::error!(context = %context, key = %key, "access denied");
            }
            StorageError::AlreadyExists { key } => {
                tracing::warn!(context = %context, key = %key, "object already exists");
            }
            StorageError::Internal(msg) => {
                tracing::error!(context = %context, error = %msg, "storage error");
            }
        }
    }
}

impl TransformError {
    pub fn report(&self, log: &LogConfig, context: &str) {
        if !log.errors_on() {
            return;
        }
        match self {
            TransformError::InvalidParams(msg) => {
                tracing::warn!(context = %context, error = %msg, "invalid transform parameters");
            }
            TransformError::ResolutionTooLarge { width, height } => {
                tracing::warn!(context = %context, width = %width, height = %height, "image resolution too large");
            }
            TransformError::Decode(msg) => {
                tracing::error!(context = %context, error = %msg, "unable to decode image");
            }
            // メモリ不足はプロセスにとって致命的ではないため warn に留める
            TransformError::OutOfMemory(msg) => {
                tracing::warn!(context = %context, error = %msg, "out of memory decoding or scaling image");
            }
            TransformError::ProcessingFailed(msg) => {
                tracing::error!(context = %context, error = %msg, "image processing failed");
            }
        }
    }
}

impl CryptoError {
    pub fn report(&self, log: &LogConfig, context: &str) {
        if log.errors_on() {
            tracing::error!(context = %context, error = %self, "crypto operation failed");
        }
    }
}
