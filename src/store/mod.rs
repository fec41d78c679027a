//! 기록 저장소 모듈
//!
//! 행 위치로 접근하는 스프레드시트형 저장소. 첫 행은 헤더다.

pub mod cache;
pub mod workbook;

pub use cache::SnapshotCache;
pub use workbook::WorkbookStore;

use crate::error::{AppError, Result};
use haccp_board_common::types::column;

/// 기록 저장소
///
/// 행/열 번호는 스프레드시트와 같이 1부터 시작한다.
pub trait RecordStore {
    /// 헤더를 포함한 전체 값
    fn read_all(&self) -> Result<Vec<Vec<String>>>;

    /// 기존 행 뒤에 추가
    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<()>;

    /// 전체 내용을 교체
    fn replace_all(&mut self, rows: &[Vec<String>]) -> Result<()>;

    /// 셀 하나 수정
    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()>;

    /// ID 열이 정확히 일치하는 첫 데이터 행 번호 (헤더 제외)
    fn find_row_by_id(&self, id: &str) -> Result<Option<usize>> {
        let values = self.read_all()?;
        Ok(values
            .iter()
            .skip(1)
            .position(|row| row.get(column::ID - 1).map(String::as_str) == Some(id))
            .map(|index| index + 2))
    }
}

/// 메모리 저장소
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl RecordStore for MemoryStore {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn replace_all(&mut self, rows: &[Vec<String>]) -> Result<()> {
        self.rows = rows.to_vec();
        Ok(())
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        set_cell(&mut self.rows, row, col, value)
    }
}

/// 행 목록의 셀 하나 수정 (열이 모자라면 빈 칸으로 채움)
pub(crate) fn set_cell(rows: &mut [Vec<String>], row: usize, col: usize, value: &str) -> Result<()> {
    if row == 0 || col == 0 {
        return Err(AppError::Store(format!("잘못된 셀 위치: ({}, {})", row, col)));
    }

    let target = rows
        .get_mut(row - 1)
        .ok_or_else(|| AppError::Store(format!("{}행이 없습니다", row)))?;

    if target.len() < col {
        target.resize(col, String::new());
    }
    target[col - 1] = value.to_string();
    Ok(())
}
