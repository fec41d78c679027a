//! 헤더 판별 규칙 모듈
//!
//! 업로드 파일의 헤더 행 위치와 열 역할을 부분 문자열 규칙으로 찾는다.
//! 규칙은 데이터로 관리하므로 동의어 추가 시 제어 흐름을 건드리지 않는다.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// 정규 레코드로 옮겨 담을 열의 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    InspectionDate,
    Issue,
    Owner,
    Status,
    Remediation,
    CompletionDate,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 6] = [
        ColumnRole::InspectionDate,
        ColumnRole::Issue,
        ColumnRole::Owner,
        ColumnRole::Status,
        ColumnRole::Remediation,
        ColumnRole::CompletionDate,
    ];

    /// 사용자에게 보여줄 이름
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::InspectionDate => "점검일",
            ColumnRole::Issue => "개선 필요사항",
            ColumnRole::Owner => "관리부서",
            ColumnRole::Status => "진행상태",
            ColumnRole::Remediation => "개선내용",
            ColumnRole::CompletionDate => "개선완료일",
        }
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 역할 하나에 대한 규칙
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: ColumnRole,
    /// 하나라도 포함되면 일치 (대소문자 구분)
    pub tokens: Vec<String>,
}

/// 헤더 판별 규칙 전체
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRules {
    /// 헤더 행 표식
    pub header_markers: Vec<String>,
    /// 역할별 규칙
    pub roles: Vec<RoleRule>,
}

impl Default for HeaderRules {
    fn default() -> Self {
        let rule = |role, tokens: &[&str]| RoleRule {
            role,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        };

        Self {
            header_markers: vec!["점검일".into(), "번호".into()],
            roles: vec![
                rule(ColumnRole::InspectionDate, &["점검일"]),
                rule(ColumnRole::Issue, &["개선 필요사항", "내용"]),
                rule(ColumnRole::Owner, &["관리부서", "담당"]),
                rule(ColumnRole::Status, &["진행상태"]),
                rule(ColumnRole::Remediation, &["개선내용"]),
                rule(ColumnRole::CompletionDate, &["개선완료일"]),
            ],
        }
    }
}

impl HeaderRules {
    /// JSON 파일에서 읽기
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON 문자열에서 읽기
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        Ok(rules)
    }

    /// 셀 텍스트가 헤더 표식을 포함하는지
    pub fn is_header_marker(&self, text: &str) -> bool {
        self.header_markers
            .iter()
            .any(|marker| text.contains(marker.as_str()))
    }

    /// 역할에 해당하는 토큰 목록
    pub fn tokens_for(&self, role: ColumnRole) -> &[String] {
        self.roles
            .iter()
            .find(|r| r.role == role)
            .map(|r| r.tokens.as_slice())
            .unwrap_or(&[])
    }

    /// 열 이름이 역할과 일치하는지
    pub fn matches(&self, role: ColumnRole, label: &str) -> bool {
        self.tokens_for(role)
            .iter()
            .any(|token| label.contains(token.as_str()))
    }
}
