//! 스프레드시트 파일 읽기 (calamine)

use crate::error::{AppError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use haccp_board_common::Cell;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 첫 번째 시트의 모든 행
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open(path)?;

    match workbook.worksheet_range_at(0) {
        Some(range) => Ok(to_rows(&range.map_err(read_error)?)),
        None => Ok(Vec::new()),
    }
}

/// 이름으로 지정한 시트의 모든 행
pub fn read_named_sheet(path: &Path, sheet_name: &str) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open(path)?;
    let range = workbook.worksheet_range(sheet_name).map_err(|e| {
        AppError::FileRead(format!("{} [{}]: {}", path.display(), sheet_name, e))
    })?;
    Ok(to_rows(&range))
}

/// 시트 이름 목록
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    Ok(open(path)?.sheet_names())
}

fn open(path: &Path) -> Result<Sheets<BufReader<File>>> {
    open_workbook_auto(path).map_err(|e| AppError::FileRead(format!("{}: {}", path.display(), e)))
}

fn read_error(e: calamine::Error) -> AppError {
    AppError::FileRead(e.to_string())
}

/// 시트가 A1이 아닌 곳에서 시작해도 행/열 위치가 유지되도록 앞을 빈 칸으로 채운다.
fn to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = (0..row_offset).map(|_| Vec::new()).collect();
    for data_row in range.rows() {
        let mut row = vec![Cell::Empty; col_offset as usize];
        row.extend(data_row.iter().map(to_cell));
        rows.push(row);
    }
    rows
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Cell::DateTime(datetime),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => Cell::from(s.as_str()),
        other => Cell::Text(other.to_string()),
    }
}
