//! 사진 참조 해석
//!
//! 저장소의 사진_전/사진_후 칸에는 파일 ID, 파일 ID가 들어 있는 공유 링크,
//! 또는 그냥 열람 가능한 URL이 들어 있을 수 있다.

/// 파일 ID로 간주할 최소 길이
const MIN_ID_LEN: usize = 15;

const DRIVE_HOST: &str = "drive.google.com";

/// 해석된 사진 참조
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoRef {
    /// 저장소 객체 ID
    Id(String),
    /// ID가 경로(`/d/<id>/`)나 쿼리(`id=<id>`)에 들어 있는 링크
    Embedded { id: String, url: String },
    /// 그대로 표시 가능한 URL
    Url(String),
}

impl PhotoRef {
    /// 칸 값 해석 (빈 값이나 알 수 없는 형식은 None)
    pub fn parse(value: &str) -> Option<Self> {
        let s = value.trim();
        if s.is_empty() {
            return None;
        }

        if s.contains(DRIVE_HOST) {
            return extract_embedded_id(s).map(|id| PhotoRef::Embedded {
                id,
                url: s.to_string(),
            });
        }

        if !s.contains('/') && !s.contains(' ') && s.chars().count() >= MIN_ID_LEN {
            return Some(PhotoRef::Id(s.to_string()));
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            return Some(PhotoRef::Url(s.to_string()));
        }

        None
    }
}

fn extract_embedded_id(s: &str) -> Option<String> {
    let candidate = if let Some((_, rest)) = s.split_once("/d/") {
        rest.split('/').next()
    } else if let Some((_, rest)) = s.split_once("id=") {
        rest.split('&').next()
    } else {
        None
    };
    let id = candidate?;

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
