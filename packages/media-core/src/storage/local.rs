use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::ObjectStore;
use crate::errors::{MediaError, StorageError};
use crate::validation::validate_key;

/// ローカルファイルシステム上のストア
///
/// ルートを持つ場合、キーはルートからの相対パスとして検証される。
/// ルートを持たない場合、キーはそのままファイルパスとして扱われる。
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: Option<PathBuf>,
}

impl LocalStore {
    /// ルートディレクトリを指定して LocalStore を作成する
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// キーを絶対・相対パスとしてそのまま扱う LocalStore を作成する
    pub fn unrooted() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// キーを実際のファイルパスに解決する
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        match &self.root {
            Some(root) => {
                validate_key(key).map_err(|e| match e {
                    MediaError::Validation(msg) => {
                        StorageError::Internal(format!("invalid key {key:?}: {msg}"))
                    }
                    other => StorageError::Internal(other.to_string()),
                })?;
                Ok(root.join(key))
            }
            None => {
                if key.is_empty() {
                    return Err(StorageError::Internal("key is empty".to_string()));
                }
                Ok(PathBuf::from(key))
            }
        }
    }
}

impl ObjectStore for LocalStore {
    fn read_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        fs::read(&path).map_err(|e| map_io_error(key, e))
    }

    fn write_object(&self, key: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| map_io_error(key, e))?;
        }

        // File はスコープを抜けた時点で必ず閉じられる
        let mut file = fs::File::create(&path).map_err(|e| map_io_error(key, e))?;
        file.write_all(data).map_err(|e| map_io_error(key, e))?;
        file.flush().map_err(|e| map_io_error(key, e))?;

        Ok(path)
    }
}

impl LocalStore {
    /// 既存のファイルを上書きせずにオブジェクトを新規作成する
    ///
    /// 同名のファイルがあれば AlreadyExists を返す。作成と存在確認は一度の open で行う
    pub fn create_object(&self, key: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| map_io_error(key, e))?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| map_io_error(key, e))?;

        let written = file.write_all(data).and_then(|()| file.flush());
        if let Err(e) = written {
            drop(file);
            // 書きかけのファイルを残さない
            let _ = fs::remove_file(&path);
            return Err(map_io_error(key, e));
        }

        Ok(path)
    }
}

fn map_io_error(key: &str, err: io::Error) -> StorageError {
    match err.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound {
            key: key.to_string(),
        },
        io::ErrorKind::PermissionDenied => StorageError::Forbidden {
            key: key.to_string(),
        },
        io::ErrorKind::AlreadyExists => StorageError::AlreadyExists {
            key: key.to_string(),
        },
        _ => StorageError::Internal(format!("{key}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let path = store.write_object("nested/data.bin", b"hello").unwrap();
        assert_eq!(path, dir.path().join("nested/data.bin"));
        assert_eq!(store.read_object("nested/data.bin").unwrap(), b"hello");
    }

    #[test]
    fn test_read_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        match store.read_object("missing.jpg").unwrap_err() {
            StorageError::NotFound { key } => assert_eq!(key, "missing.jpg"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_rooted_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.write_object("/abs.bin", b"x").is_err());
    }

    #[test]
    fn test_create_object_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store.create_object("once.bin", b"first").unwrap();
        match store.create_object("once.bin", b"second").unwrap_err() {
            StorageError::AlreadyExists { key } => assert_eq!(key, "once.bin"),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        assert_eq!(store.read_object("once.bin").unwrap(), b"first");
    }

    #[test]
    fn test_unrooted_store_uses_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        let key = path.to_str().unwrap();

        let store = LocalStore::unrooted();
        store.write_object(key, b"abc").unwrap();
        assert_eq!(store.read_object(key).unwrap(), b"abc");
        assert!(store.resolve("").is_err());
    }
}
