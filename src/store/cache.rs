//! 조회 캐시 모듈
//!
//! 저장소 전체 조회 결과를 짧은 시간 동안 파일에 보관해
//! 대시보드를 다시 열 때 저장소를 매번 읽지 않도록 한다.
//! 쓰기가 있어도 무효화하지 않으므로 유효 시간 동안은 이전 값이 보일 수 있다.

use super::RecordStore;
use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// 캐시 파일 구조
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// 버전 (호환성 확인용)
    version: u32,
    /// 조회 시각 (unix 초)
    pub fetched_at: i64,
    /// 헤더를 포함한 전체 값
    pub rows: Vec<Vec<String>>,
}

impl Snapshot {
    const CURRENT_VERSION: u32 = 1;
}

/// 유효 시간이 있는 조회 캐시
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 캐시 파일 읽기 (없거나 깨졌거나 버전이 다르면 None)
    pub fn load(&self) -> Option<Snapshot> {
        let file = File::open(&self.path).ok()?;
        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, Snapshot>(reader) {
            Ok(snapshot) if snapshot.version == Snapshot::CURRENT_VERSION => Some(snapshot),
            Ok(_) => {
                warn!("캐시 버전 불일치, 다시 조회합니다");
                None
            }
            Err(_) => None,
        }
    }

    /// 캐시 파일 저장
    pub fn save(&self, rows: &[Vec<String>], fetched_at: i64) -> Result<()> {
        let snapshot = Snapshot {
            version: Snapshot::CURRENT_VERSION,
            fetched_at,
            rows: rows.to_vec(),
        };
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, &snapshot)?;
        Ok(())
    }

    /// 캐시를 거쳐 전체 조회
    pub fn read_through(&self, store: &dyn RecordStore) -> Result<Vec<Vec<String>>> {
        self.read_through_at(store, Utc::now().timestamp())
    }

    /// 기준 시각을 지정해 캐시를 거쳐 전체 조회
    pub fn read_through_at(&self, store: &dyn RecordStore, now: i64) -> Result<Vec<Vec<String>>> {
        if let Some(snapshot) = self.load() {
            let age = now - snapshot.fetched_at;
            if age >= 0 && (age as u64) < self.ttl.as_secs() {
                debug!(age, "캐시 사용");
                return Ok(snapshot.rows);
            }
        }

        let rows = store.read_all()?;
        if let Err(e) = self.save(&rows, now) {
            // 캐시 저장 실패는 조회 결과에 영향 없음
            warn!("캐시 저장 실패: {}", e);
        }
        Ok(rows)
    }

    /// 캐시 파일 삭제
    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
