use std::path::PathBuf;

use chrono::Local;

use crate::constants::{COMPRESSED_DIR_NAME, COMPRESSED_SUFFIX, NO_MEDIA_FILE};
use crate::errors::{MediaError, StorageError};
use crate::storage::{LocalStore, ObjectStore};
use crate::transform::OutputFormat;

const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// 圧縮済み画像の書き出し先（`<cache_dir>/.compressed`）
#[derive(Debug, Clone)]
pub struct CompressedCache {
    cache_dir: PathBuf,
    store: LocalStore,
}

impl CompressedCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        Self {
            store: LocalStore::new(cache_dir.clone()),
            cache_dir,
        }
    }

    pub fn directory(&self) -> PathBuf {
        self.cache_dir.join(COMPRESSED_DIR_NAME)
    }

    /// 圧縮済み画像を新しいファイルとして書き込む
    ///
    /// 初回はディレクトリと `.nomedia` マーカーを作成する
    pub fn write(&self, format: OutputFormat, data: &[u8]) -> Result<PathBuf, MediaError> {
        if !self.cache_dir.is_dir() {
            return Err(StorageError::NotFound {
                key: self.cache_dir.display().to_string(),
            }
            .into());
        }

        let directory = self.directory();
        if !directory.exists() {
            self.store
                .write_object(&format!("{COMPRESSED_DIR_NAME}/{NO_MEDIA_FILE}"), &[])?;
        }

        let stamp = Local::now().format("%Y%m%d_%H%M%S%.3f").to_string();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let key = format!("{COMPRESSED_DIR_NAME}/{}", file_name(&stamp, attempt, format));
            match self.store.create_object(&key, data) {
                Ok(path) => return Ok(path),
                Err(StorageError::AlreadyExists { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::Internal(format!(
            "no free file name for {stamp} in {}",
            directory.display()
        ))
        .into())
    }
}

/// `yyyyMMdd_HHmmss.SSS_COMPRESSED.<ext>` 形式のファイル名を返す
///
/// 同じミリ秒に作成済みの場合は `-<n>` を付けた名前で作り直す
fn file_name(stamp: &str, attempt: u32, format: OutputFormat) -> String {
    if attempt == 0 {
        format!("{stamp}{COMPRESSED_SUFFIX}{}", format.extension())
    } else {
        format!("{stamp}{COMPRESSED_SUFFIX}-{attempt}{}", format.extension())
    }
}
