//! 단건 등록/조치 완료
//!
//! 대화형 입력으로 레코드 하나를 추가하거나, ID로 찾은 행의 조치 내용을 채운다.

use crate::blob::{upload_optional, BlobStore, PhotoOptions};
use crate::error::{AppError, Result};
use crate::store::RecordStore;
use chrono::{NaiveDate, Utc};
use haccp_board_common::types::{column, is_known_location};
use haccp_board_common::{InspectionRecord, Status};
use std::path::PathBuf;
use tracing::info;

/// 새 개선 필요사항
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub date: NaiveDate,
    pub location: String,
    pub issue: String,
    pub owner: String,
    pub photo: Option<PathBuf>,
}

/// 등록 결과
#[derive(Debug)]
pub struct CreateOutcome {
    pub record: InspectionRecord,
    /// 사진 업로드 실패 (레코드는 저장됨)
    pub photo_warning: Option<AppError>,
}

/// 레코드 등록
///
/// ID는 현재 Unix 초, 상태는 항상 진행중.
pub fn create_issue(
    store: &mut dyn RecordStore,
    blob: &dyn BlobStore,
    new: &NewIssue,
    photo_options: PhotoOptions,
) -> Result<CreateOutcome> {
    if new.issue.trim().is_empty() {
        return Err(AppError::EmptyIssue);
    }
    if !is_known_location(&new.location) {
        return Err(AppError::UnknownLocation(new.location.clone()));
    }

    let (photo_before, photo_warning) = upload_optional(blob, new.photo.as_deref(), photo_options);

    let record = InspectionRecord {
        id: Utc::now().timestamp().to_string(),
        inspection_date: new.date.format("%Y-%m-%d").to_string(),
        location: new.location.clone(),
        issue_text: new.issue.clone(),
        owner: new.owner.clone(),
        status: Status::InProgress.as_str().to_string(),
        remediation: String::new(),
        completion_date: String::new(),
        photo_before,
        photo_after: String::new(),
    };

    store.append_rows(&[record.to_row()])?;
    info!(id = %record.id, location = %record.location, "개선 필요사항 등록");

    Ok(CreateOutcome {
        record,
        photo_warning,
    })
}

/// 조치 완료 입력
#[derive(Debug, Clone)]
pub struct Remediation {
    pub id: String,
    pub text: String,
    pub completed_on: NaiveDate,
    pub photo: Option<PathBuf>,
}

/// 조치 완료 결과
#[derive(Debug)]
pub struct RemediationOutcome {
    /// 수정한 행 번호 (1부터)
    pub row: usize,
    pub photo_after: Option<String>,
    pub photo_warning: Option<AppError>,
}

/// 조치 완료 반영
///
/// ID가 없으면 RecordNotFound, 어떤 셀도 바뀌지 않는다.
/// 사진 참조가 새로 생긴 경우에만 사진_후 칸을 덮어쓴다.
pub fn apply_remediation(
    store: &mut dyn RecordStore,
    blob: &dyn BlobStore,
    remediation: &Remediation,
    photo_options: PhotoOptions,
) -> Result<RemediationOutcome> {
    if remediation.text.trim().is_empty() {
        return Err(AppError::EmptyRemediation);
    }

    let row = store
        .find_row_by_id(&remediation.id)?
        .ok_or_else(|| AppError::RecordNotFound(remediation.id.clone()))?;

    let (photo_after, photo_warning) =
        upload_optional(blob, remediation.photo.as_deref(), photo_options);

    let completed_on = remediation.completed_on.format("%Y-%m-%d").to_string();
    store.update_cell(row, column::REMEDIATION, &remediation.text)?;
    store.update_cell(row, column::COMPLETION_DATE, &completed_on)?;
    store.update_cell(row, column::STATUS, Status::Done.as_str())?;

    let photo_after = if photo_after.is_empty() {
        None
    } else {
        store.update_cell(row, column::PHOTO_AFTER, &photo_after)?;
        Some(photo_after)
    };

    info!(id = %remediation.id, row, "조치 완료 반영");

    Ok(RemediationOutcome {
        row,
        photo_after,
        photo_warning,
    })
}
