use crate::errors::MediaError;

/// ストアのキーの最大長（バイト）
const MAX_KEY_LEN: usize = 1024;

/// ストアのキーを検証する
/// ルート外へのパストラバーサルを防止し、不正な文字を検出する
pub fn validate_key(key: &str) -> Result<(), MediaError> {
    if key.is_empty() {
        return Err(MediaError::Validation("key is empty".to_string()));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(MediaError::Validation(format!(
            "key is too long (max {MAX_KEY_LEN})"
        )));
    }

    // パストラバーサル防止
    if key.contains("..") || key.starts_with('/') || key.contains("//") || key.contains('\\') {
        return Err(MediaError::Validation("path traversal detected".to_string()));
    }

    // 許可された文字のみ（英数字、ハイフン、アンダースコア、ドット、スラッシュ）
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/')
    {
        return Err(MediaError::Validation("invalid characters in key".to_string()));
    }

    Ok(())
}
