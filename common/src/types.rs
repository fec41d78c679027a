//! 점검 레코드 타입 정의
//!
//! 기록 저장소(스프레드시트)의 열 배치와 1:1로 대응하는 정규 레코드와,
//! 업로드된 표 파일의 셀 값을 표현하는 타입을 정의한다.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 저장소 헤더 (열 순서 고정, 호환성 중요)
pub const HEADER: [&str; 10] = [
    "ID",
    "일시",
    "공정",
    "개선 필요사항",
    "담당자",
    "진행상태",
    "개선내용",
    "개선완료일",
    "사진_전",
    "사진_후",
];

/// 저장소 열 번호 (1부터 시작)
pub mod column {
    pub const ID: usize = 1;
    pub const INSPECTION_DATE: usize = 2;
    pub const LOCATION: usize = 3;
    pub const ISSUE: usize = 4;
    pub const OWNER: usize = 5;
    pub const STATUS: usize = 6;
    pub const REMEDIATION: usize = 7;
    pub const COMPLETION_DATE: usize = 8;
    pub const PHOTO_BEFORE: usize = 9;
    pub const PHOTO_AFTER: usize = 10;
}

/// 문제 등록 시 선택 가능한 장소
pub const LOCATIONS: [&str; 10] = [
    "전처리실",
    "입국실",
    "발효실",
    "제성실",
    "병입/포장실",
    "원료창고",
    "제품창고",
    "실험실",
    "화장실/탈의실",
    "기타",
];

/// 장소를 알 수 없을 때 사용하는 값
pub const FALLBACK_LOCATION: &str = "기타";

pub fn is_known_location(value: &str) -> bool {
    LOCATIONS.contains(&value)
}

/// 진행상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 진행중
    InProgress,
    /// 완료
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProgress => "진행중",
            Status::Done => "완료",
        }
    }

    /// 완전 일치 비교 (대소문자/공백 무시 없음)
    pub fn is_done(value: &str) -> bool {
        value == Status::Done.as_str()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 정규 점검 레코드
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    pub id: String,

    #[serde(default)]
    pub inspection_date: String,  // 일시 (YYYY-MM-DD 또는 빈 값)

    #[serde(default)]
    pub location: String,         // 공정

    #[serde(default)]
    pub issue_text: String,       // 개선 필요사항

    #[serde(default)]
    pub owner: String,            // 담당자

    #[serde(default)]
    pub status: String,           // 진행상태

    #[serde(default)]
    pub remediation: String,      // 개선내용

    #[serde(default)]
    pub completion_date: String,  // 개선완료일

    #[serde(default)]
    pub photo_before: String,     // 사진_전

    #[serde(default)]
    pub photo_after: String,      // 사진_후
}

impl InspectionRecord {
    /// 저장소 행으로 변환 (열 순서는 HEADER와 동일)
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.inspection_date.clone(),
            self.location.clone(),
            self.issue_text.clone(),
            self.owner.clone(),
            self.status.clone(),
            self.remediation.clone(),
            self.completion_date.clone(),
            self.photo_before.clone(),
            self.photo_after.clone(),
        ]
    }

    /// 저장소 행에서 복원 (열이 모자라면 빈 값)
    pub fn from_row(row: &[String]) -> Self {
        let cell = |col: usize| row.get(col - 1).cloned().unwrap_or_default();
        Self {
            id: cell(column::ID),
            inspection_date: cell(column::INSPECTION_DATE),
            location: cell(column::LOCATION),
            issue_text: cell(column::ISSUE),
            owner: cell(column::OWNER),
            status: cell(column::STATUS),
            remediation: cell(column::REMEDIATION),
            completion_date: cell(column::COMPLETION_DATE),
            photo_before: cell(column::PHOTO_BEFORE),
            photo_after: cell(column::PHOTO_AFTER),
        }
    }

    pub fn is_done(&self) -> bool {
        Status::is_done(&self.status)
    }

    /// 내용 기반 지문 (일시 + 개선 필요사항 + 담당자)
    ///
    /// ID는 가져오기마다 달라지므로 중복 판정에는 이 값을 사용한다.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.inspection_date.trim().as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.issue_text.trim().as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.owner.trim().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// 헤더 행
pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|s| s.to_string()).collect()
}

/// 업로드된 표 파일의 셀 값
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// 빈 셀 (값 없음)
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// 스프레드시트의 날짜 셀
    DateTime(NaiveDateTime),
}

impl Cell {
    /// 값이 없는 셀인지 (빈 문자열 포함)
    pub fn is_absent(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 셀의 문자열 표현
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}
