pub mod local;

use std::path::PathBuf;

pub use local::LocalStore;
// StorageError は errors モジュールで定義済み
pub use crate::errors::StorageError;

/// バイト列を丸ごと読み書きするストア
///
/// 暗号化のファイル入出力と、画像正規化の入出力の両方から使われる
pub trait ObjectStore {
    /// キーを指定してオブジェクト全体を読み込む
    fn read_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// キーを指定してオブジェクトを書き込み、書き込み先のパスを返す
    fn write_object(&self, key: &str, data: &[u8]) -> Result<PathBuf, StorageError>;
}
