//! 업로드 파일 읽기
//!
//! 헤더 위치를 가정하지 않고 첫 시트(또는 CSV 전체)를 원본 행 그대로 읽는다.

use crate::error::{AppError, Result};
use crate::sheet::read_first_sheet;
use haccp_board_common::Cell;
use std::path::Path;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// 파일 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Spreadsheet,
    Csv,
}

impl TableKind {
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ext == "csv" {
            Ok(TableKind::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Ok(TableKind::Spreadsheet)
        } else {
            Err(AppError::UnsupportedFileType(path.display().to_string()))
        }
    }
}

/// 표 파일의 원본 행
pub fn read_table(path: &Path) -> Result<Vec<Vec<Cell>>> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.display().to_string()));
    }

    match TableKind::detect(path)? {
        TableKind::Spreadsheet => read_first_sheet(path),
        TableKind::Csv => read_csv(path),
    }
}

fn read_csv(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::FileRead(format!("{}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::FileRead(e.to_string()))?;
        let row: Vec<Cell> = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if rows.is_empty() && i == 0 {
                    Cell::from(field.trim_start_matches('\u{feff}'))
                } else {
                    Cell::from(field)
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_detect_kind() {
        assert_eq!(TableKind::detect(Path::new("a.XLSX")).unwrap(), TableKind::Spreadsheet);
        assert_eq!(TableKind::detect(Path::new("a.csv")).unwrap(), TableKind::Csv);
        assert!(matches!(
            TableKind::detect(Path::new("a.txt")),
            Err(AppError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_csv_keeps_quoted_line_breaks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        std::fs::write(&path, "\u{feff}번호,점검일,개선 필요사항\n1,2024.03.05,\"전처리실\n칼이 녹슬었음\"\n2,,\n").unwrap();

        let rows = read_table(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Cell::Text("번호".into()));
        assert_eq!(rows[1][2], Cell::Text("전처리실\n칼이 녹슬었음".into()));
        assert_eq!(rows[2][1], Cell::Empty);
    }

    #[test]
    fn test_missing_file() {
        let result = read_table(Path::new("/nonexistent/tasks.xlsx"));
        assert!(matches!(result, Err(AppError::FileNotFound(_))));
    }
}
