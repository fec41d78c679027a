//! 사진 압축
//!
//! EXIF 회전 정보 반영 → RGB 변환 → 긴 변 축소 → JPEG 재인코딩

use crate::error::{AppError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;

/// 압축된 사진
#[derive(Debug, Clone)]
pub struct CompressedPhoto {
    pub bytes: Vec<u8>,
    /// 확장자를 .jpg로 바꾼 파일명
    pub file_name: String,
}

/// 사진 압축
///
/// 디코딩할 수 없는 형식(HEIC 등)이나 손상 파일은 ImageLoad 에러.
pub fn compress_image(
    bytes: &[u8],
    original_name: &str,
    max_size: u32,
    quality: u8,
) -> Result<CompressedPhoto> {
    let img = image::load_from_memory(bytes).map_err(|e| AppError::ImageLoad(e.to_string()))?;
    let img = apply_orientation(img, read_orientation(bytes));
    let mut img = DynamicImage::ImageRgb8(img.to_rgb8());

    // 축소만 (확대 없음)
    if img.width() > max_size || img.height() > max_size {
        img = img.thumbnail(max_size, max_size);
    }

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
    encoder
        .encode_image(&img.to_rgb8())
        .map_err(|e| AppError::ImageLoad(e.to_string()))?;

    Ok(CompressedPhoto {
        bytes: output,
        file_name: jpeg_file_name(original_name),
    })
}

/// EXIF Orientation 값 (없으면 1)
fn read_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(_) => return 1,
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1)
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn jpeg_file_name(original_name: &str) -> String {
    let base = match original_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ if original_name.is_empty() => "photo",
        _ => original_name,
    };
    format!("{}.jpg", base)
}
