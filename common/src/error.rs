//! 에러 타입 정의

use crate::rules::ColumnRole;
use thiserror::Error;

/// 공통 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("헤더를 찾을 수 없습니다 (표식: {markers})")]
    HeaderNotFound { markers: String },

    #[error("필수 컬럼 누락: {}", format_roles(.0))]
    RequiredColumnMissing(Vec<ColumnRole>),
}

fn format_roles(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(|r| r.label())
        .collect::<Vec<_>>()
        .join("/")
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_config() {
        let error = Error::Config("설정 파일이 없습니다".to_string());
        assert_eq!(format!("{}", error), "Config error: 설정 파일이 없습니다");
    }

    #[test]
    fn test_required_column_missing_lists_roles() {
        let error = Error::RequiredColumnMissing(vec![ColumnRole::Status, ColumnRole::CompletionDate]);
        let display = format!("{}", error);
        assert!(display.contains("진행상태"));
        assert!(display.contains("개선완료일"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
