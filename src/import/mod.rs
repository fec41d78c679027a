//! 실행과제 파일 가져오기
//!
//! 파일 읽기 → 정합(헤더 탐색/열 매핑/행 정규화) → 중복 제외(선택) → 저장소 반영.
//! 헤더나 필수 열을 찾지 못하면 저장소는 변경되지 않는다.

pub mod commit;
pub mod reader;

pub use commit::{commit_batch, CommitOutcome};
pub use reader::read_table;

use crate::error::Result;
use crate::store::RecordStore;
use chrono::Utc;
use haccp_board_common::{reconcile, Cell, HeaderRules, ImportBatch, InspectionRecord};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// 가져오기 옵션
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub rules: HeaderRules,
    /// 내용이 같은 레코드는 제외 (기본: 중복 허용)
    pub skip_duplicates: bool,
    /// 저장소에 반영하지 않고 결과만 확인
    pub dry_run: bool,
    /// 배치 타임스탬프 (None이면 현재 시각)
    pub batch_timestamp: Option<i64>,
}

/// 가져오기 결과
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub batch: ImportBatch,
    /// 중복으로 제외한 건수
    pub duplicates_skipped: usize,
    /// dry run이면 None
    pub outcome: Option<CommitOutcome>,
}

impl ImportReport {
    pub fn uploaded(&self) -> usize {
        self.outcome.map(|o| o.count()).unwrap_or(0)
    }
}

/// 파일 가져오기
pub fn import_file(
    path: &Path,
    store: &mut dyn RecordStore,
    options: &ImportOptions,
    progress: &mut dyn FnMut(f64),
) -> Result<ImportReport> {
    let rows = read_table(path)?;
    info!(path = %path.display(), rows = rows.len(), "파일 읽기 완료");
    import_rows(&rows, store, options, progress)
}

/// 원본 행 가져오기
pub fn import_rows(
    rows: &[Vec<Cell>],
    store: &mut dyn RecordStore,
    options: &ImportOptions,
    progress: &mut dyn FnMut(f64),
) -> Result<ImportReport> {
    let batch_timestamp = options
        .batch_timestamp
        .unwrap_or_else(|| Utc::now().timestamp());

    let mut batch = reconcile(rows, &options.rules, batch_timestamp, progress)?;

    let mut duplicates_skipped = 0;
    if options.skip_duplicates {
        let before = batch.records.len();
        batch.records = remove_duplicates(std::mem::take(&mut batch.records), &store.read_all()?);
        duplicates_skipped = before - batch.records.len();
    }

    let outcome = if options.dry_run {
        None
    } else {
        Some(commit_batch(store, &batch.records)?)
    };

    Ok(ImportReport {
        batch,
        duplicates_skipped,
        outcome,
    })
}

/// 저장소와 배치 안에서 내용 지문이 같은 레코드 제외 (처음 것만 유지)
fn remove_duplicates(records: Vec<InspectionRecord>, existing: &[Vec<String>]) -> Vec<InspectionRecord> {
    let mut seen: HashSet<String> = existing
        .iter()
        .skip(1)
        .map(|row| InspectionRecord::from_row(row).fingerprint())
        .collect();

    records
        .into_iter()
        .filter(|record| seen.insert(record.fingerprint()))
        .collect()
}
