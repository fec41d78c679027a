//! xlsx 파일 기반 기록 저장소
//!
//! 읽기는 calamine, 쓰기는 rust_xlsxwriter로 파일 전체를 다시 쓴다.
//! 잠금이 없으므로 동시에 쓰면 마지막 쓰기가 남는다.
//! 저장소 파일은 기록 시트 하나만 가져야 한다. 다른 시트가 있으면 쓰지 않는다.

use super::{set_cell, RecordStore};
use crate::error::{AppError, Result};
use crate::sheet::{read_named_sheet, sheet_names};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
    sheet_name: String,
}

impl WorkbookStore {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 다른 시트가 함께 있으면 다시 쓸 때 사라지므로 거부
    fn ensure_dedicated(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let others: Vec<String> = sheet_names(&self.path)?
            .into_iter()
            .filter(|name| name != &self.sheet_name)
            .collect();
        if others.is_empty() {
            Ok(())
        } else {
            Err(AppError::Store(format!(
                "{}에 기록 시트({}) 외의 시트가 있습니다: {}",
                self.path.display(),
                self.sheet_name,
                others.join(", ")
            )))
        }
    }

    fn write_all(&self, rows: &[Vec<String>]) -> Result<()> {
        self.ensure_dedicated()?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name).map_err(store_error)?;

        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet
                    .write_string(r as u32, c as u16, value)
                    .map_err(store_error)?;
            }
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // 쓰기 도중 실패해도 기존 파일이 깨지지 않도록 임시 파일 후 교체
        let temp_path = self.path.with_extension("xlsx.tmp");
        workbook.save(&temp_path).map_err(store_error)?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!(rows = rows.len(), path = %self.path.display(), "저장소 기록");
        Ok(())
    }
}

impl RecordStore for WorkbookStore {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let rows = read_named_sheet(&self.path, &self.sheet_name)?;
        Ok(rows
            .into_iter()
            .map(|row| row.iter().map(|cell| cell.text()).collect())
            .collect())
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        let mut values = self.read_all()?;
        values.extend_from_slice(rows);
        self.write_all(&values)
    }

    fn replace_all(&mut self, rows: &[Vec<String>]) -> Result<()> {
        self.write_all(rows)
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        set_cell(&mut values, row, col, value)?;
        self.write_all(&values)
    }
}

fn store_error(e: rust_xlsxwriter::XlsxError) -> AppError {
    AppError::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().join("none.xlsx"), "Sheet1");
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_replace_then_append() {
        let dir = tempdir().unwrap();
        let mut store = WorkbookStore::new(dir.path().join("board.xlsx"), "Sheet1");

        store.replace_all(&[row(&["ID", "일시"]), row(&["1", "2024-03-05"])]).unwrap();
        store.append_rows(&[row(&["2", "2024-03-06"])]).unwrap();

        let values = store.read_all().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], row(&["2", "2024-03-06"]));
    }

    #[test]
    fn test_reads_configured_sheet_and_refuses_to_drop_others() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.xlsx");

        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("메모").unwrap().write_string(0, 0, "공지").unwrap();
        let records = workbook.add_worksheet().set_name("기록").unwrap();
        records.write_string(0, 0, "ID").unwrap();
        records.write_string(1, 0, "1").unwrap();
        workbook.save(&path).unwrap();

        let mut store = WorkbookStore::new(&path, "기록");
        assert_eq!(store.read_all().unwrap(), vec![row(&["ID"]), row(&["1"])]);

        let result = store.append_rows(&[row(&["2"])]);
        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(store.read_all().unwrap().len(), 2);
        assert_eq!(sheet_names(&path).unwrap(), vec!["메모".to_string(), "기록".to_string()]);
    }

    #[test]
    fn test_missing_sheet_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.xlsx");
        WorkbookStore::new(&path, "Sheet1").replace_all(&[row(&["ID"])]).unwrap();

        let store = WorkbookStore::new(&path, "기록");
        assert!(matches!(store.read_all(), Err(AppError::FileRead(_))));
    }

    #[test]
    fn test_update_cell_keeps_multiline_text() {
        let dir = tempdir().unwrap();
        let mut store = WorkbookStore::new(dir.path().join("board.xlsx"), "Sheet1");

        store.replace_all(&[row(&["ID", "내용"]), row(&["1", "전처리실\n칼이 녹슬었음"])]).unwrap();
        store.update_cell(2, 3, "완료").unwrap();

        let values = store.read_all().unwrap();
        assert_eq!(values[1], row(&["1", "전처리실\n칼이 녹슬었음", "완료"]));
    }
}
