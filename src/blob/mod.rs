//! 사진 저장소 모듈

pub mod compress;

pub use compress::{compress_image, CompressedPhoto};

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Local;
use haccp_board_common::PhotoRef;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 사진을 보여줄 수 있는 형태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    Bytes(Vec<u8>),
    Url(String),
}

impl PhotoSource {
    /// 브라우저에서 바로 열 수 있는 URL
    pub fn display_url(&self) -> String {
        match self {
            PhotoSource::Bytes(bytes) => format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)),
            PhotoSource::Url(url) => url.clone(),
        }
    }
}

/// 사진 저장소
pub trait BlobStore {
    /// 저장 후 참조값(파일 ID)을 반환
    fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String>;

    /// ID로 내용 읽기 (없으면 None)
    fn get(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// 칸 값(ID/링크/URL)을 표시 가능한 형태로 해석
    fn resolve(&self, reference: &str) -> Result<Option<PhotoSource>> {
        let parsed = PhotoRef::parse(reference)
            .ok_or_else(|| AppError::InvalidPhotoRef(reference.to_string()))?;

        match parsed {
            PhotoRef::Id(id) => Ok(self.get(&id)?.map(PhotoSource::Bytes)),
            PhotoRef::Embedded { id, url } => match self.get(&id)? {
                Some(bytes) => Ok(Some(PhotoSource::Bytes(bytes))),
                None => Ok(Some(PhotoSource::Url(url))),
            },
            PhotoRef::Url(url) => Ok(Some(PhotoSource::Url(url))),
        }
    }
}

/// 로컬 폴더 사진 저장소
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(AppError::InvalidPhotoRef(id.to_string()));
        }
        Ok(self.root.join(id))
    }
}

impl BlobStore for LocalBlobStore {
    fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let id = format!("{}_{}", Local::now().format("%Y%m%d_%H%M%S"), safe_file_name(file_name));
        let path = self.path_for(&id)?;

        std::fs::create_dir_all(&self.root)
            .map_err(|e| AppError::BlobUpload(format!("{}: {}", self.root.display(), e)))?;
        std::fs::write(&path, bytes)
            .map_err(|e| AppError::BlobUpload(format!("{}: {}", path.display(), e)))?;

        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }
}

/// 참조값으로 그대로 쓸 수 있는 파일명 (공백/경로 구분자 → `_`, `..` 제거)
fn safe_file_name(file_name: &str) -> String {
    let mut name: String = file_name
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    while name.contains("..") {
        name = name.replace("..", ".");
    }
    name
}

/// 사진 압축 옵션
#[derive(Debug, Clone, Copy)]
pub struct PhotoOptions {
    pub max_size: u32,
    pub quality: u8,
}

impl Default for PhotoOptions {
    fn default() -> Self {
        Self {
            max_size: 1024,
            quality: 70,
        }
    }
}

/// 사진 파일을 압축해서 저장
pub fn upload_photo(blob: &dyn BlobStore, photo: &Path, options: PhotoOptions) -> Result<String> {
    if !photo.is_file() {
        return Err(AppError::FileNotFound(photo.display().to_string()));
    }

    let bytes = std::fs::read(photo)?;
    let name = photo
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let compressed = compress_image(&bytes, &name, options.max_size, options.quality)?;
    let id = blob.put(&compressed.file_name, &compressed.bytes)?;
    info!(%id, size = compressed.bytes.len(), "사진 저장");
    Ok(id)
}

/// 사진 업로드 (실패해도 레코드 저장은 계속)
///
/// 사진이 없으면 빈 참조, 실패하면 빈 참조와 경고를 돌려준다.
pub fn upload_optional(
    blob: &dyn BlobStore,
    photo: Option<&Path>,
    options: PhotoOptions,
) -> (String, Option<AppError>) {
    let Some(photo) = photo else {
        return (String::new(), None);
    };

    match upload_photo(blob, photo, options) {
        Ok(id) => (id, None),
        Err(e) => {
            warn!("사진 업로드 실패: {}", e);
            (String::new(), Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_and_resolve_by_id() {
        let dir = tempdir().unwrap();
        let blob = LocalBlobStore::new(dir.path());

        let id = blob.put("knife.jpg", b"jpeg-bytes").unwrap();
        assert!(id.ends_with("_knife.jpg"));

        let source = blob.resolve(&id).unwrap();
        assert_eq!(source, Some(PhotoSource::Bytes(b"jpeg-bytes".to_vec())));
    }

    #[test]
    fn test_name_with_spaces_resolves() {
        let dir = tempdir().unwrap();
        let blob = LocalBlobStore::new(dir.path());

        let id = blob.put("IMG 0001.jpg", b"jpeg-bytes").unwrap();
        assert!(id.ends_with("_IMG_0001.jpg"));
        assert_eq!(
            blob.resolve(&id).unwrap(),
            Some(PhotoSource::Bytes(b"jpeg-bytes".to_vec()))
        );
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("Screenshot 2024-03-05 at 10\\a.jpg"), "Screenshot_2024-03-05_at_10_a.jpg");
        assert_eq!(safe_file_name("a..b.jpg"), "a.b.jpg");
    }

    #[test]
    fn test_resolve_plain_url() {
        let dir = tempdir().unwrap();
        let blob = LocalBlobStore::new(dir.path());

        let url = "https://example.com/photos/a.jpg";
        assert_eq!(blob.resolve(url).unwrap(), Some(PhotoSource::Url(url.into())));
    }

    #[test]
    fn test_resolve_embedded_id_falls_back_to_link() {
        let dir = tempdir().unwrap();
        let blob = LocalBlobStore::new(dir.path());

        let link = "https://drive.google.com/file/d/REMOTE_ONLY_ID/view";
        assert_eq!(blob.resolve(link).unwrap(), Some(PhotoSource::Url(link.into())));
    }

    #[test]
    fn test_missing_id_resolves_to_none() {
        let dir = tempdir().unwrap();
        let blob = LocalBlobStore::new(dir.path());
        assert_eq!(blob.resolve("20240101_000000_gone.jpg").unwrap(), None);
    }

    #[test]
    fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let blob = LocalBlobStore::new(dir.path());
        assert!(blob.get("..secret_file_name").is_err());
    }

    #[test]
    fn test_upload_optional_reports_failure() {
        let dir = tempdir().unwrap();
        let blob = LocalBlobStore::new(dir.path());
        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"garbage").unwrap();

        let (reference, warning) = upload_optional(&blob, Some(&broken), PhotoOptions::default());
        assert!(reference.is_empty());
        assert!(matches!(warning, Some(AppError::ImageLoad(_))));

        let (reference, warning) = upload_optional(&blob, None, PhotoOptions::default());
        assert!(reference.is_empty() && warning.is_none());
    }

    #[test]
    fn test_data_url() {
        let source = PhotoSource::Bytes(vec![1, 2, 3]);
        assert_eq!(source.display_url(), "data:image/jpeg;base64,AQID");
    }
}
