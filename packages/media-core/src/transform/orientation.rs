use image::DynamicImage;

/// EXIF Orientation タグの値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Orientation {
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    Transpose = 5,
    Rotate90 = 6,
    Transverse = 7,
    Rotate270 = 8,
}

impl Orientation {
    /// u16 値から Orientation を作成
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// 正立させるために必要な時計回りの回転角度
    pub fn rotation_degrees(&self) -> u16 {
        match self {
            Self::Normal | Self::FlipHorizontal => 0,
            Self::Rotate180 | Self::FlipVertical => 180,
            Self::Transpose | Self::Rotate90 => 90,
            Self::Transverse | Self::Rotate270 => 270,
        }
    }

    /// 補正後に幅と高さが入れ替わるか
    pub fn swaps_axes(&self) -> bool {
        self.rotation_degrees() % 180 != 0
    }
}

/// EXIF Orientation に基づいて画像を回転・反転させる
pub fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90 => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270 => img.rotate270(),
    }
}

/// バイト列から EXIF Orientation タグを読み取る
///
/// EXIF を持たない、または読み取れない場合は None
pub fn read_orientation(data: &[u8]) -> Option<Orientation> {
    let mut cursor = std::io::Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;

    Orientation::from_u16(u16::try_from(value).ok()?)
}
