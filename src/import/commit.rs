//! 가져온 레코드를 저장소에 반영

use crate::error::Result;
use crate::store::RecordStore;
use haccp_board_common::types::header_row;
use haccp_board_common::InspectionRecord;
use tracing::info;

/// 반영 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// 올릴 레코드 없음 (저장소 변경 없음)
    NothingToUpload,
    /// 비어 있던 저장소를 헤더 + 레코드로 교체
    Replaced(usize),
    /// 기존 행 뒤에 추가
    Appended(usize),
}

impl CommitOutcome {
    pub fn count(&self) -> usize {
        match self {
            CommitOutcome::NothingToUpload => 0,
            CommitOutcome::Replaced(n) | CommitOutcome::Appended(n) => *n,
        }
    }
}

/// 레코드 묶음 반영
///
/// 저장소가 1행 이하(헤더만 있거나 비어 있음)면 헤더를 다시 쓰고,
/// 그 외에는 기존 행을 건드리지 않고 뒤에 추가한다.
pub fn commit_batch(store: &mut dyn RecordStore, records: &[InspectionRecord]) -> Result<CommitOutcome> {
    if records.is_empty() {
        return Ok(CommitOutcome::NothingToUpload);
    }

    let rows: Vec<Vec<String>> = records.iter().map(InspectionRecord::to_row).collect();
    let current = store.read_all()?;

    if current.len() <= 1 {
        let mut content = Vec::with_capacity(rows.len() + 1);
        content.push(header_row());
        content.extend(rows);
        store.replace_all(&content)?;
        info!(count = records.len(), "저장소 교체");
        Ok(CommitOutcome::Replaced(records.len()))
    } else {
        store.append_rows(&rows)?;
        info!(count = records.len(), "저장소 추가");
        Ok(CommitOutcome::Appended(records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use haccp_board_common::HEADER;

    fn records(n: usize) -> Vec<InspectionRecord> {
        (0..n)
            .map(|i| InspectionRecord {
                id: format!("IMPORTED_1_{}", i),
                issue_text: format!("문제 {}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_empty_batch_does_not_touch_store() {
        let mut store = MemoryStore::with_rows(vec![vec!["stale".into()]]);
        let outcome = commit_batch(&mut store, &[]).unwrap();
        assert_eq!(outcome, CommitOutcome::NothingToUpload);
        assert_eq!(store.rows(), &[vec!["stale".to_string()]]);
    }

    #[test]
    fn test_header_only_store_is_replaced() {
        let mut store = MemoryStore::with_rows(vec![vec!["old header".into()]]);
        let outcome = commit_batch(&mut store, &records(3)).unwrap();

        assert_eq!(outcome, CommitOutcome::Replaced(3));
        assert_eq!(store.rows().len(), 4);
        assert_eq!(store.rows()[0][0], HEADER[0]);
        assert_eq!(store.rows()[0].len(), HEADER.len());
    }

    #[test]
    fn test_empty_store_is_replaced() {
        let mut store = MemoryStore::new();
        let outcome = commit_batch(&mut store, &records(1)).unwrap();
        assert_eq!(outcome, CommitOutcome::Replaced(1));
        assert_eq!(store.rows().len(), 2);
    }

    #[test]
    fn test_existing_rows_are_appended() {
        let mut initial = vec![header_row()];
        initial.extend(records(5).iter().map(InspectionRecord::to_row));
        let mut store = MemoryStore::with_rows(initial.clone());

        let outcome = commit_batch(&mut store, &records(3)).unwrap();

        assert_eq!(outcome, CommitOutcome::Appended(3));
        assert_eq!(store.rows().len(), 9);
        assert_eq!(&store.rows()[..6], initial.as_slice());
    }
}
