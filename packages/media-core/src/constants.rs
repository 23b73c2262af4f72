/// 画像の最大寸法（出力領域の幅・高さ）
pub const MAX_DIMENSION: u32 = 8192;

/// デコード後の最大ピクセル数（極端な入力のみ拒否）
pub const MAX_PIXELS: u64 = 200_000_000;

/// 既定の出力領域（幅）
pub const DEFAULT_MAX_WIDTH: u32 = 816;

/// 既定の出力領域（高さ）
pub const DEFAULT_MAX_HEIGHT: u32 = 612;

/// デフォルト品質（1-100）
pub const DEFAULT_QUALITY: u8 = 80;

/// サムネイルの JPEG 品質
pub const THUMBNAIL_QUALITY: u8 = 100;

/// 圧縮済み画像を置くキャッシュ配下のディレクトリ名
pub const COMPRESSED_DIR_NAME: &str = ".compressed";

/// メディアスキャン除外用のマーカーファイル
pub const NO_MEDIA_FILE: &str = ".nomedia";

/// 圧縮済みファイル名の接尾辞
pub const COMPRESSED_SUFFIX: &str = "_COMPRESSED";

/// 長いログを分割する際の 1 チャンクの文字数
pub const LOG_CHUNK_SIZE: usize = 4000;

/// メモリ量の単位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum MemoryUnit {
    Byte = 1,
    Kb = 1024,
    Mb = 1024 * 1024,
    Gb = 1024 * 1024 * 1024,
}

impl MemoryUnit {
    /// `n` 単位分のバイト数を返す
    pub const fn bytes(self, n: u64) -> u64 {
        n * self as u64
    }
}

/// デコード時に許可する既定のメモリ確保量
pub const DEFAULT_MAX_DECODE_ALLOC: u64 = MemoryUnit::Mb.bytes(512);
