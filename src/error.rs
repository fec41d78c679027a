use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("지원하지 않는 파일 형식입니다: {0} (xlsx/xls/xlsm/ods/csv)")]
    UnsupportedFileType(String),

    #[error("파일 읽기 실패: {0}")]
    FileRead(String),

    #[error("시트 저장소 오류: {0}")]
    Store(String),

    #[error("이미지 압축 실패: {0} (HEIC/손상 파일 가능)")]
    ImageLoad(String),

    #[error("사진 업로드 실패: {0}")]
    BlobUpload(String),

    #[error("사진 참조를 해석할 수 없습니다: {0}")]
    InvalidPhotoRef(String),

    #[error("ID를 찾을 수 없습니다: {0}")]
    RecordNotFound(String),

    #[error("개선 필요사항 내용을 입력하세요")]
    EmptyIssue,

    #[error("조치 내용을 입력하세요")]
    EmptyRemediation,

    #[error("알 수 없는 장소입니다: {0}")]
    UnknownLocation(String),

    #[error("입력 오류: {0}")]
    Prompt(String),

    #[error(transparent)]
    Common(#[from] haccp_board_common::Error),

    #[error("JSON 처리 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
