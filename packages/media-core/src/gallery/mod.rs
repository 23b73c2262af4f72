pub mod record;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::config::LogConfig;
use crate::errors::{MediaError, StorageError};

pub use record::{NewGalleryImage, RecentImage};

const DATABASE_FILE: &str = "gallery.db";

/// 他の接続が書き込み中のときに待つ最大時間
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// ディレクトリ内の SQLite カタログ（`gallery.db`）に画像を登録するローカルギャラリー
///
/// 操作ごとに接続を開くため、同じディレクトリを複数のスレッドやプロセスから
/// 同時に使ってよい。書き込みは SQLite のロックで直列化される。
#[derive(Debug, Clone)]
pub struct Gallery {
    db_path: PathBuf,
    log: LogConfig,
}

impl Gallery {
    /// ギャラリーを開く（ディレクトリとテーブルが無ければ作成する）
    pub fn open(dir: impl Into<PathBuf>, log: LogConfig) -> Result<Self, MediaError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Internal(format!("failed to create {}: {e}", dir.display()))
        })?;

        let gallery = Self {
            db_path: dir.join(DATABASE_FILE),
            log,
        };
        let conn = gallery.connect()?;
        init_schema(&conn).map_err(sql_error)?;
        Ok(gallery)
    }

    /// カタログファイルのパス
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.db_path).map_err(sql_error)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(sql_error)?;
        Ok(conn)
    }

    /// 画像ファイルをギャラリーに登録し、割り当てた ID を返す
    ///
    /// 撮影日時にはファイルの更新日時を使う
    pub fn store_image(&self, image: &Path, entry: NewGalleryImage) -> Result<u64, MediaError> {
        let key = image.display().to_string();
        let metadata = fs::metadata(image).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound { key: key.clone() },
            std::io::ErrorKind::PermissionDenied => StorageError::Forbidden { key: key.clone() },
            _ => StorageError::Internal(format!("{key}: {e}")),
        })?;
        if !metadata.is_file() {
            return Err(MediaError::Validation(format!("{key} is not a file")));
        }

        let path = fs::canonicalize(image)
            .map_err(|e| StorageError::Internal(format!("{key}: {e}")))?;
        let date_taken = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
            .unwrap_or(-1);
        let size = i64::try_from(metadata.len()).unwrap_or(i64::MAX);

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO images
                (path, title, display_name, description, mime_type, date_added, date_taken, size)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                path.to_string_lossy(),
                entry.title,
                entry.display_name,
                entry.description.unwrap_or_default(),
                entry.mime_type,
                Utc::now().timestamp_millis(),
                date_taken,
                size,
            ],
        )
        .map_err(sql_error)?;
        let id = conn.last_insert_rowid() as u64;

        self.log
            .debug("store_image", format_args!("registered {key} as id {id}"));
        Ok(id)
    }

    /// 新しく登録された順に最大 `max_images` 件を返す
    pub fn recent_images(&self, max_images: usize) -> Result<Vec<RecentImage>, MediaError> {
        let limit = i64::try_from(max_images).unwrap_or(i64::MAX);
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, path, date_taken, mime_type, size, display_name
                 FROM images ORDER BY id DESC LIMIT ?1",
            )
            .map_err(sql_error)?;

        let rows = stmt
            .query_map([limit], |row| {
                Ok(RecentImage {
                    id: row.get::<_, i64>(0)? as u64,
                    path: PathBuf::from(row.get::<_, String>(1)?),
                    date_taken: row.get(2)?,
                    mime_type: row.get(3)?,
                    size: row.get::<_, i64>(4)?.max(0) as u64,
                    display_name: row.get(5)?,
                })
            })
            .map_err(sql_error)?;

        Ok(rows.collect::<Result<Vec<_>, _>>().map_err(sql_error)?)
    }

    /// 失敗をログに記録して空の一覧を返す版の `recent_images`
    pub fn recent_images_or_empty(&self, max_images: usize) -> Vec<RecentImage> {
        self.recent_images(max_images).unwrap_or_else(|e| {
            e.report(&self.log, "recent_images");
            Vec::new()
        })
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    // 複数の接続が同時に開いても作成処理が競合しないよう、即時に書き込みロックを取る
    conn.execute_batch(
        "BEGIN IMMEDIATE;
         CREATE TABLE IF NOT EXISTS images (
             id              INTEGER PRIMARY KEY AUTOINCREMENT,
             path            TEXT NOT NULL,
             title           TEXT NOT NULL,
             display_name    TEXT NOT NULL,
             description     TEXT NOT NULL DEFAULT '',
             mime_type       TEXT,
             date_added      INTEGER NOT NULL,
             date_taken      INTEGER NOT NULL DEFAULT -1,
             size            INTEGER NOT NULL
         );
         COMMIT;",
    )
}

fn sql_error(err: rusqlite::Error) -> StorageError {
    StorageError::Internal(format!("gallery database: {err}"))
}
