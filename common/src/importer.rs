//! 표 가져오기 정합 모듈
//!
//! 헤더 위치가 일정하지 않은 업로드 파일을 정규 레코드 묶음으로 바꾼다.
//!
//! ## 처리 흐름
//! 1. 헤더 행 탐색 (첫 번째 표식 일치 행)
//! 2. 열 역할 매핑 (부분 문자열 규칙, 역할 하나라도 없으면 전체 중단)
//! 3. 행 정규화 (날짜 없음 → 건너뜀, 날짜 해석 실패 → 빈 값)

use crate::error::{Error, Result};
use crate::rules::{ColumnRole, HeaderRules};
use crate::types::{Cell, InspectionRecord, FALLBACK_LOCATION};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const EMPTY_CELL: &Cell = &Cell::Empty;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// 역할별 원본 열 위치 (0부터 시작)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub inspection_date: usize,
    pub issue: usize,
    pub owner: usize,
    pub status: usize,
    pub remediation: usize,
    pub completion_date: usize,
}

/// 빈 값으로 대체된 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedField {
    InspectionDate,
    CompletionDate,
}

/// 건너뛴 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 점검일 셀이 비어 있음
    DateMissing,
}

/// 행 하나의 정규화 결과
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Normalized(InspectionRecord),
    Degraded {
        record: InspectionRecord,
        fields: Vec<DegradedField>,
    },
    Skipped(SkipReason),
}

/// 일부 필드가 빈 값으로 대체된 행
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedRow {
    pub row_index: usize,
    pub fields: Vec<DegradedField>,
}

/// 가져오기 결과 묶음
#[derive(Debug, Clone)]
pub struct ImportBatch {
    /// 가져오기 1회에 한 번 정한 타임스탬프 (초)
    pub batch_timestamp: i64,
    /// 헤더 행 위치 (0부터)
    pub header_index: usize,
    pub mapping: ColumnMapping,
    /// 원본 순서 그대로
    pub records: Vec<InspectionRecord>,
    /// 건너뛴 데이터 행 위치
    pub skipped_rows: Vec<usize>,
    pub degraded_rows: Vec<DegradedRow>,
}

/// 헤더 행 찾기
///
/// 위에서부터 훑어 셀 텍스트에 표식이 포함된 첫 행을 반환한다.
/// 뒤쪽에 더 그럴듯한 헤더가 있어도 첫 일치가 우선한다.
pub fn locate_header(rows: &[Vec<Cell>], rules: &HeaderRules) -> Result<usize> {
    rows.iter()
        .position(|row| row.iter().any(|cell| rules.is_header_marker(&cell.text())))
        .ok_or_else(|| Error::HeaderNotFound {
            markers: rules.header_markers.join(", "),
        })
}

/// 열 역할 매핑
///
/// 역할마다 왼쪽부터 첫 번째로 토큰을 포함하는 열을 고른다.
/// 찾지 못한 역할은 모두 모아서 한 번에 보고한다.
pub fn map_columns(labels: &[String], rules: &HeaderRules) -> Result<ColumnMapping> {
    let find = |role| labels.iter().position(|label| rules.matches(role, label));

    let mut missing = Vec::new();
    let mut resolved = [0usize; 6];
    for (slot, role) in ColumnRole::ALL.into_iter().enumerate() {
        match find(role) {
            Some(index) => resolved[slot] = index,
            None => missing.push(role),
        }
    }

    if !missing.is_empty() {
        return Err(Error::RequiredColumnMissing(missing));
    }

    Ok(ColumnMapping {
        inspection_date: resolved[0],
        issue: resolved[1],
        owner: resolved[2],
        status: resolved[3],
        remediation: resolved[4],
        completion_date: resolved[5],
    })
}

/// 느슨한 날짜 해석
///
/// `.`을 모두 `-`로 바꾼 뒤 해석한다. 실패하면 None.
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let replaced = raw.replace('.', "-");
    let text = replaced.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    lazy_static::lazy_static! {
        // "2024. 3. 5." → "2024- 3- 5-"
        static ref LOOSE_RE: Regex =
            Regex::new(r"^(\d{4})\s*[-/]\s*(\d{1,2})\s*[-/]\s*(\d{1,2})\s*-?$").unwrap();
    }

    let caps = LOOSE_RE.captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// ISO 날짜 문자열 (해석 실패 시 빈 문자열)
pub fn format_loose_date(raw: &str) -> String {
    parse_loose_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// 개선 필요사항 첫 줄에서 장소 추출
pub fn derive_location(issue_text: &str) -> String {
    match issue_text.split_once('\n') {
        Some((first_line, _)) => first_line.trim().to_string(),
        None => FALLBACK_LOCATION.to_string(),
    }
}

/// 가져온 레코드 ID
pub fn imported_id(batch_timestamp: i64, row_index: usize) -> String {
    format!("IMPORTED_{}_{}", batch_timestamp, row_index)
}

/// 데이터 행 하나를 정규화
pub fn normalize_row(
    row: &[Cell],
    mapping: &ColumnMapping,
    batch_timestamp: i64,
    row_index: usize,
) -> RowOutcome {
    let cell = |index: usize| row.get(index).unwrap_or(EMPTY_CELL);

    let date_cell = cell(mapping.inspection_date);
    if date_cell.is_absent() {
        return RowOutcome::Skipped(SkipReason::DateMissing);
    }

    let mut degraded = Vec::new();

    let inspection_date = format_loose_date(&date_cell.text());
    if inspection_date.is_empty() {
        degraded.push(DegradedField::InspectionDate);
    }

    let completion_cell = cell(mapping.completion_date);
    let completion_date = format_loose_date(&completion_cell.text());
    if completion_date.is_empty() && !completion_cell.is_absent() {
        degraded.push(DegradedField::CompletionDate);
    }

    let issue_text = cell(mapping.issue).text();
    let remediation_cell = cell(mapping.remediation);

    let record = InspectionRecord {
        id: imported_id(batch_timestamp, row_index),
        inspection_date,
        location: derive_location(&issue_text),
        owner: cell(mapping.owner).text(),
        status: cell(mapping.status).text().trim().to_string(),
        remediation: if remediation_cell.is_absent() {
            String::new()
        } else {
            remediation_cell.text()
        },
        completion_date,
        issue_text,
        photo_before: String::new(),
        photo_after: String::new(),
    };

    if degraded.is_empty() {
        RowOutcome::Normalized(record)
    } else {
        RowOutcome::Degraded { record, fields: degraded }
    }
}

/// 업로드 파일의 행 전체를 정규 레코드 묶음으로 변환
///
/// # Arguments
/// * `rows` - 파일의 원본 행 (헤더 위치 가정 없음)
/// * `rules` - 헤더 판별 규칙
/// * `batch_timestamp` - 가져오기 1회 공통 타임스탬프 (초)
/// * `progress` - 행 처리마다 0..1 진행률을 받는 콜백
pub fn reconcile(
    rows: &[Vec<Cell>],
    rules: &HeaderRules,
    batch_timestamp: i64,
    progress: &mut dyn FnMut(f64),
) -> Result<ImportBatch> {
    let header_index = locate_header(rows, rules)?;
    let labels: Vec<String> = rows[header_index].iter().map(Cell::text).collect();
    let mapping = map_columns(&labels, rules)?;
    debug!(header_index, ?mapping, "헤더 매핑 완료");

    let data_rows = &rows[header_index + 1..];
    let total = data_rows.len();

    let mut batch = ImportBatch {
        batch_timestamp,
        header_index,
        mapping,
        records: Vec::new(),
        skipped_rows: Vec::new(),
        degraded_rows: Vec::new(),
    };

    for (row_index, row) in data_rows.iter().enumerate() {
        match normalize_row(row, &mapping, batch_timestamp, row_index) {
            RowOutcome::Normalized(record) => batch.records.push(record),
            RowOutcome::Degraded { record, fields } => {
                debug!(row_index, ?fields, "날짜 해석 실패, 빈 값으로 대체");
                batch.records.push(record);
                batch.degraded_rows.push(DegradedRow { row_index, fields });
            }
            RowOutcome::Skipped(reason) => {
                debug!(row_index, ?reason, "행 건너뜀");
                batch.skipped_rows.push(row_index);
            }
        }

        progress((row_index + 1) as f64 / total as f64);
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    const HEADER: &[&str] = &[
        "번호", "점검일", "개선 필요사항", "관리부서", "진행상태", "개선내용", "개선완료일",
    ];

    fn sheet(data: &[&[&str]]) -> Vec<Vec<Cell>> {
        let mut rows = vec![row(&["2024 위생점검 실행과제"]), row(&[]), row(HEADER)];
        rows.extend(data.iter().map(|r| row(r)));
        rows
    }

    fn run(rows: &[Vec<Cell>]) -> Result<ImportBatch> {
        reconcile(rows, &HeaderRules::default(), 1_700_000_000, &mut |_| {})
    }

    #[test]
    fn test_location_from_first_line() {
        assert_eq!(derive_location("전처리실\n칼이 녹슬었음"), "전처리실");
        assert_eq!(derive_location("  발효실 \r\n바닥 물고임"), "발효실");
    }

    #[test]
    fn test_location_fallback_without_line_break() {
        assert_eq!(derive_location("칼이 녹슬었음"), "기타");
    }

    #[test]
    fn test_dotted_date() {
        assert_eq!(format_loose_date("2024.03.05"), "2024-03-05");
        assert_eq!(format_loose_date("2024. 3. 5."), "2024-03-05");
        assert_eq!(format_loose_date("2024-03-05 00:00:00"), "2024-03-05");
        assert_eq!(format_loose_date("2024-03-05T10:20:30"), "2024-03-05");
        // 점은 모두 '-'로 바뀌므로 소수 초는 해석되지 않는다
        assert_eq!(format_loose_date("2024-03-05 10:20:30.5"), "");
        assert_eq!(format_loose_date("미정"), "");
        assert_eq!(format_loose_date("2024.13.40"), "");
    }

    #[test]
    fn test_header_is_first_matching_row() {
        let rows = vec![
            row(&["제목"]),
            row(&["일련번호", "비고"]),
            row(HEADER),
        ];
        assert_eq!(locate_header(&rows, &HeaderRules::default()).unwrap(), 1);
    }

    #[test]
    fn test_header_not_found() {
        let rows = vec![row(&["제목"]), row(&["a", "b"])];
        let result = run(&rows);
        assert!(matches!(result, Err(Error::HeaderNotFound { .. })));
    }

    #[test]
    fn test_required_column_missing_reports_all_roles() {
        let rows = vec![row(&["번호", "점검일", "개선 필요사항", "관리부서"])];
        match run(&rows) {
            Err(Error::RequiredColumnMissing(roles)) => {
                assert_eq!(
                    roles,
                    vec![ColumnRole::Status, ColumnRole::Remediation, ColumnRole::CompletionDate]
                );
            }
            other => panic!("unexpected: {:?}", other.map(|b| b.records.len())),
        }
    }

    #[test]
    fn test_issue_role_takes_leftmost_of_either_token() {
        let labels: Vec<String> = ["점검 내용", "점검일", "개선 필요사항", "담당", "진행상태", "개선내용", "개선완료일"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = map_columns(&labels, &HeaderRules::default()).unwrap();
        assert_eq!(mapping.issue, 0);
        assert_eq!(mapping.owner, 3);
        assert_eq!(mapping.remediation, 5);
    }

    #[test]
    fn test_rows_are_normalized_in_order() {
        let rows = sheet(&[
            &["1", "2024.03.05", "전처리실\n칼이 녹슬었음", "생산팀", " 진행중 ", "", ""],
            &["2", "2024.03.06", "바닥 물고임", "품질팀", "완료", "배수구 청소", "2024.03.08"],
        ]);
        let batch = run(&rows).unwrap();

        assert_eq!(batch.header_index, 2);
        assert_eq!(batch.records.len(), 2);

        let first = &batch.records[0];
        assert_eq!(first.id, "IMPORTED_1700000000_0");
        assert_eq!(first.inspection_date, "2024-03-05");
        assert_eq!(first.location, "전처리실");
        assert_eq!(first.issue_text, "전처리실\n칼이 녹슬었음");
        assert_eq!(first.status, "진행중");
        assert_eq!(first.remediation, "");
        assert_eq!(first.completion_date, "");

        let second = &batch.records[1];
        assert_eq!(second.id, "IMPORTED_1700000000_1");
        assert_eq!(second.location, "기타");
        assert_eq!(second.status, "완료");
        assert_eq!(second.remediation, "배수구 청소");
        assert_eq!(second.completion_date, "2024-03-08");
        assert!(second.photo_before.is_empty() && second.photo_after.is_empty());
    }

    #[test]
    fn test_absent_date_skips_row() {
        let rows = sheet(&[
            &["1", "2024.03.05", "a", "x", "진행중", "", ""],
            &["2", "", "b", "x", "진행중", "", ""],
            &["3", "2024.03.07", "c", "x", "진행중", "", ""],
        ]);
        let batch = run(&rows).unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped_rows, vec![1]);
        // ID는 원본 데이터 행 위치를 그대로 사용
        assert_eq!(batch.records[1].id, "IMPORTED_1700000000_2");
    }

    #[test]
    fn test_short_row_counts_as_absent_date() {
        let rows = sheet(&[&["1"]]);
        let batch = run(&rows).unwrap();
        assert!(batch.records.is_empty());
        assert_eq!(batch.skipped_rows, vec![0]);
    }

    #[test]
    fn test_malformed_date_degrades_field() {
        let rows = sheet(&[&["1", "3월 둘째주", "a", "x", "진행중", "", "미정"]]);
        let batch = run(&rows).unwrap();

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].inspection_date, "");
        assert_eq!(batch.records[0].completion_date, "");
        assert_eq!(
            batch.degraded_rows,
            vec![DegradedRow {
                row_index: 0,
                fields: vec![DegradedField::InspectionDate, DegradedField::CompletionDate],
            }]
        );
    }

    #[test]
    fn test_spreadsheet_date_cell() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut rows = sheet(&[]);
        rows.push(vec![
            Cell::Number(1.0),
            Cell::DateTime(date),
            Cell::from("a"),
            Cell::from("x"),
            Cell::from("진행중"),
        ]);
        let batch = run(&rows).unwrap();
        assert_eq!(batch.records[0].inspection_date, "2024-03-05");
    }

    #[test]
    fn test_progress_reaches_one() {
        let rows = sheet(&[
            &["1", "2024.03.05", "a", "x", "진행중", "", ""],
            &["2", "", "b", "x", "진행중", "", ""],
        ]);
        let mut seen = Vec::new();
        reconcile(&rows, &HeaderRules::default(), 1, &mut |p| seen.push(p)).unwrap();
        assert_eq!(seen, vec![0.5, 1.0]);
    }
}
