//! 대시보드 집계 모듈
//!
//! 저장소 행을 읽어 기간 필터, 개선율 요약, 그룹별 통계,
//! 장소별 순위, 최근 목록, 미조치 목록을 만든다.

use crate::importer::parse_loose_date;
use crate::types::InspectionRecord;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 최근 목록 기본 건수
pub const DEFAULT_RECENT: usize = 10;

/// 날짜를 해석할 수 없는 행에 쓰는 날짜
pub fn fallback_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
}

/// 집계용 행 (날짜 파생값 포함)
#[derive(Debug, Clone)]
pub struct DashboardRow {
    pub record: InspectionRecord,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    /// ISO 주차
    pub week: u32,
}

impl DashboardRow {
    pub fn from_record(record: InspectionRecord) -> Self {
        let date = parse_loose_date(&record.inspection_date).unwrap_or_else(fallback_date);
        Self {
            year: date.year(),
            month: date.month(),
            week: date.iso_week().week(),
            date,
            record,
        }
    }
}

/// 저장소 전체 값에서 집계용 행 생성
///
/// 첫 행은 헤더로 보고 건너뛴다. 개선 필요사항이 비어 있는 행은
/// 삭제하지 않고 여기서만 제외한다.
pub fn load_rows(values: &[Vec<String>]) -> Vec<DashboardRow> {
    values
        .iter()
        .skip(1)
        .map(|row| InspectionRecord::from_row(row))
        .filter(|record| !record.issue_text.trim().is_empty())
        .map(DashboardRow::from_record)
        .collect()
}

/// 그룹 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Grouping {
    /// 월별 (여러 달이 선택된 경우)
    Month,
    /// 장소별
    Location,
}

impl Grouping {
    pub fn label(&self) -> &'static str {
        match self {
            Grouping::Month => "월",
            Grouping::Location => "장소",
        }
    }
}

/// 기간 필터 (비어 있으면 전체)
#[derive(Debug, Clone, Default)]
pub struct PeriodFilter {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub weeks: Vec<u32>,
}

/// 필터 적용 결과
#[derive(Debug, Clone)]
pub struct FilteredRows {
    pub rows: Vec<DashboardRow>,
    pub grouping: Grouping,
}

impl PeriodFilter {
    /// 연도 → 월 → 주차 순으로 필터 적용
    ///
    /// 그룹 기준은 주차 필터 전 선택된 월 수로 정한다.
    pub fn apply(&self, rows: &[DashboardRow]) -> FilteredRows {
        let mut filtered: Vec<DashboardRow> = rows
            .iter()
            .filter(|r| self.years.is_empty() || self.years.contains(&r.year))
            .filter(|r| self.months.is_empty() || self.months.contains(&r.month))
            .cloned()
            .collect();

        let selected_months: BTreeSet<u32> = filtered.iter().map(|r| r.month).collect();
        let grouping = if selected_months.len() > 1 {
            Grouping::Month
        } else {
            Grouping::Location
        };

        if !self.weeks.is_empty() {
            filtered.retain(|r| self.weeks.contains(&r.week));
        }

        FilteredRows { rows: filtered, grouping }
    }
}

/// 연도 선택지
pub fn available_years(rows: &[DashboardRow]) -> Vec<i32> {
    let years: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();
    years.into_iter().collect()
}

/// 개선율 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub done: usize,
    /// 백분율
    pub rate: f64,
}

pub fn summarize(rows: &[DashboardRow]) -> Summary {
    let total = rows.len();
    let done = rows.iter().filter(|r| r.record.is_done()).count();
    Summary {
        total,
        done,
        rate: percent(done, total),
    }
}

/// 그룹별 통계
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub key: String,
    pub total: usize,
    pub done: usize,
    /// 소수 첫째 자리 반올림 백분율
    pub rate: f64,
}

impl GroupStat {
    fn new(key: String, (total, done): (usize, usize)) -> Self {
        Self {
            key,
            total,
            done,
            rate: round1(percent(done, total)),
        }
    }
}

pub fn group_stats(rows: &[DashboardRow], grouping: Grouping) -> Vec<GroupStat> {
    match grouping {
        Grouping::Month => {
            let mut counts: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
            for row in rows {
                tally(counts.entry(row.month).or_default(), row);
            }
            counts
                .into_iter()
                .map(|(month, c)| GroupStat::new(format!("{}월", month), c))
                .collect()
        }
        Grouping::Location => {
            let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
            for row in rows {
                tally(counts.entry(row.record.location.clone()).or_default(), row);
            }
            counts
                .into_iter()
                .map(|(location, c)| GroupStat::new(location, c))
                .collect()
        }
    }
}

/// 장소별 개선율 순위 (높은 순)
pub fn location_ranking(rows: &[DashboardRow]) -> Vec<GroupStat> {
    let mut stats = group_stats(rows, Grouping::Location);
    stats.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    stats
}

/// 최근 n건 (저장소 역순)
pub fn recent(rows: &[DashboardRow], n: usize) -> Vec<&DashboardRow> {
    rows.iter().rev().take(n).collect()
}

/// 미조치 항목 (담당자 지정 시 완전 일치만)
pub fn pending_tasks<'a>(rows: &'a [DashboardRow], owner: Option<&str>) -> Vec<&'a DashboardRow> {
    rows.iter()
        .filter(|r| !r.record.is_done())
        .filter(|r| owner.map_or(true, |o| r.record.owner == o))
        .collect()
}

/// 미조치 항목의 담당자 목록 (정렬, 중복 제거)
pub fn pending_owners(rows: &[DashboardRow]) -> Vec<String> {
    let owners: BTreeSet<&str> = pending_tasks(rows, None)
        .into_iter()
        .map(|r| r.record.owner.as_str())
        .collect();
    owners.into_iter().map(String::from).collect()
}

/// 대시보드 전체 (JSON 출력용)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// 선택 가능한 연도 (필터 전 전체 기준)
    pub years: Vec<i32>,
    pub summary: Summary,
    pub grouping: Grouping,
    pub groups: Vec<GroupStat>,
    pub ranking: Vec<GroupStat>,
    pub recent: Vec<InspectionRecord>,
}

pub fn build_dashboard(rows: &[DashboardRow], filter: &PeriodFilter, recent_count: usize) -> Dashboard {
    let filtered = filter.apply(rows);
    Dashboard {
        years: available_years(rows),
        summary: summarize(&filtered.rows),
        grouping: filtered.grouping,
        groups: group_stats(&filtered.rows, filtered.grouping),
        ranking: location_ranking(&filtered.rows),
        recent: recent(&filtered.rows, recent_count)
            .into_iter()
            .map(|r| r.record.clone())
            .collect(),
    }
}

fn tally(counts: &mut (usize, usize), row: &DashboardRow) {
    counts.0 += 1;
    if row.record.is_done() {
        counts.1 += 1;
    }
}

fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
