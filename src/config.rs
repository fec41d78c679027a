use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const STORE_PATH_ENV: &str = "HACCP_STORE_PATH";
pub const PHOTO_FOLDER_ENV: &str = "HACCP_PHOTO_FOLDER";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 기록 저장소 (xlsx)
    pub store_path: PathBuf,
    /// 기록 시트 이름 (저장소 파일에는 이 시트만 있어야 한다)
    pub sheet_name: String,
    /// 사진 저장 폴더
    pub photo_folder: PathBuf,
    /// 조회 캐시 유효 시간
    pub cache_ttl_seconds: u64,
    /// 사진 긴 변 최대 크기
    pub max_photo_size: u32,
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("haccp.xlsx"),
            sheet_name: "Sheet1".into(),
            photo_folder: PathBuf::from("photos"),
            cache_ttl_seconds: 10,
            max_photo_size: 1024,
            jpeg_quality: 70,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("haccp-board").join("config.json"))
    }

    // 환경 변수 우선
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(STORE_PATH_ENV) {
            self.store_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(PHOTO_FOLDER_ENV) {
            self.photo_folder = PathBuf::from(path);
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// 조회 캐시 파일 위치 (저장소 옆)
    pub fn cache_path(&self) -> PathBuf {
        let file_name = self
            .store_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "haccp.xlsx".into());
        self.store_path
            .with_file_name(format!(".{}.read-cache.json", file_name))
    }
}
