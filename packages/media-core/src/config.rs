use std::fmt::Display;
use std::path::PathBuf;

use crate::constants::{DEFAULT_MAX_DECODE_ALLOC, LOG_CHUNK_SIZE, MAX_PIXELS};

/// ログ出力の切り替え設定
///
/// 各コンポーネントへ明示的に渡す。プロセス全体で共有するグローバル状態は持たない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub debug_enabled: bool,
    pub error_enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug_enabled: false,
            error_enabled: true,
        }
    }
}

impl LogConfig {
    /// 全てのログを無効化した設定
    pub fn silent() -> Self {
        Self {
            debug_enabled: false,
            error_enabled: false,
        }
    }

    /// 全てのログを有効化した設定
    pub fn verbose() -> Self {
        Self {
            debug_enabled: true,
            error_enabled: true,
        }
    }

    /// 環境変数から LogConfig を作成する
    ///
    /// 任意の環境変数:
    /// - MEDIA_DEBUG_LOGS (既定: off)
    /// - MEDIA_ERROR_LOGS (既定: on)
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("MEDIA_DEBUG_LOGS") {
            config.debug_enabled = parse_switch("MEDIA_DEBUG_LOGS", &value)?;
        }
        if let Ok(value) = std::env::var("MEDIA_ERROR_LOGS") {
            config.error_enabled = parse_switch("MEDIA_ERROR_LOGS", &value)?;
        }
        Ok(config)
    }

    pub fn debug_on(&self) -> bool {
        self.debug_enabled
    }

    pub fn errors_on(&self) -> bool {
        self.error_enabled
    }

    pub fn debug(&self, context: &str, message: impl Display) {
        if self.debug_enabled {
            tracing::debug!(context = %context, "{message}");
        }
    }

    pub fn error(&self, context: &str, message: impl Display) {
        if self.error_enabled {
            tracing::error!(context = %context, "{message}");
        }
    }

    /// 長い文字列を LOG_CHUNK_SIZE 文字ずつに分割してデバッグ出力する
    pub fn chunk_log(&self, context: &str, text: &str) {
        if !self.debug_enabled {
            return;
        }
        let chunks = split_chunks(text, LOG_CHUNK_SIZE);
        if chunks.len() > 1 {
            tracing::info!(
                context = %context,
                length = text.chars().count(),
                chunks = chunks.len(),
                "logging long text in chunks"
            );
        }
        for chunk in chunks {
            tracing::debug!(context = %context, "{chunk}");
        }
    }
}

fn parse_switch(name: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => Err(format!("{name} must be a boolean switch, got {other:?}")),
    }
}

/// 文字境界を保ったまま `size` 文字ごとに分割する
fn split_chunks(text: &str, size: usize) -> Vec<&str> {
    if text.is_empty() {
        return vec![text];
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);
    chunks
}

/// 画像正規化の設定
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// 圧縮済みファイルを書き出すキャッシュディレクトリ
    pub cache_dir: PathBuf,
    /// デコード時に許可するメモリ確保量（バイト）
    pub max_decode_alloc: u64,
    /// デコード後に許可する最大ピクセル数
    pub max_pixels: u64,
    pub log: LogConfig,
}

impl NormalizerConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            max_decode_alloc: DEFAULT_MAX_DECODE_ALLOC,
            max_pixels: MAX_PIXELS,
            log: LogConfig::default(),
        }
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn with_max_decode_alloc(mut self, bytes: u64) -> Self {
        self.max_decode_alloc = bytes;
        self
    }

    /// 環境変数から NormalizerConfig を作成する
    ///
    /// 任意の環境変数:
    /// - MEDIA_CACHE_DIR (未設定時は OS の一時ディレクトリ)
    /// - MEDIA_DEBUG_LOGS / MEDIA_ERROR_LOGS
    pub fn from_env() -> Result<Self, String> {
        let cache_dir = std::env::var_os("MEDIA_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        Ok(Self::new(cache_dir).with_log(LogConfig::from_env()?))
    }
}
