use std::path::Path;

use bytes::Bytes;

use crate::errors::MediaError;

/// 正規化の入力
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// ストアのキー（ルートを持たないストアではファイルパス）
    Stored(String),
    /// メモリ上のバイト列
    Memory(Bytes),
}

impl ImageSource {
    /// ファイルパスから ImageSource を作成する
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let key = path.to_str().ok_or_else(|| {
            MediaError::Validation(format!("path is not valid UTF-8: {}", path.display()))
        })?;
        Ok(Self::Stored(key.to_string()))
    }

    /// ログ出力用の短い説明
    pub fn describe(&self) -> String {
        match self {
            Self::Stored(key) => key.clone(),
            Self::Memory(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<Bytes> for ImageSource {
    fn from(bytes: Bytes) -> Self {
        Self::Memory(bytes)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Memory(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        match ImageSource::from_path("/tmp/photo.jpg").unwrap() {
            ImageSource::Stored(key) => assert_eq!(key, "/tmp/photo.jpg"),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_describe_memory() {
        let source = ImageSource::from(vec![0u8; 12]);
        assert_eq!(source.describe(), "<12 bytes in memory>");
    }
}
