//! テスト用の画像生成ヘルパー

use image::{DynamicImage, Rgb, RgbImage};

use crate::transform::{OutputFormat, encode_image};

fn pattern(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([x as u8, y as u8, 128])
    }))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(&pattern(width, height), OutputFormat::Png, 100).unwrap()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(&pattern(width, height), OutputFormat::Jpeg, 90).unwrap()
}

/// Orientation タグだけを持つ EXIF (APP1) を SOI 直後に挿入した JPEG
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = jpeg_bytes(width, height);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    // tag=0x0112 (Orientation), type=SHORT, count=1
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut app1 = vec![0xFF, 0xE1];
    let length = (2 + 6 + tiff.len()) as u16;
    app1.extend_from_slice(&length.to_be_bytes());
    app1.extend_from_slice(b"Exif\x00\x00");
    app1.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(jpeg.len() + app1.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}
