use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 最近の画像の読み取り専用スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentImage {
    pub id: u64,
    pub path: PathBuf,
    /// 撮影日時（エポックからのミリ秒）。不明な場合は -1
    pub date_taken: i64,
    pub mime_type: Option<String>,
    /// バイト数
    pub size: u64,
    pub display_name: String,
}

/// ギャラリーへ登録する画像の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGalleryImage {
    pub mime_type: String,
    pub title: String,
    pub display_name: String,
    pub description: Option<String>,
}

impl NewGalleryImage {
    pub fn new(
        mime_type: impl Into<String>,
        title: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            title: title.into(),
            display_name: display_name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
