//! 대화형 입력
//!
//! 명령행 인자로 주어지지 않은 값만 물어본다.

use crate::error::{AppError, Result};
use chrono::{Local, NaiveDate};
use dialoguer::{Input, Select};
use haccp_board_common::{DashboardRow, LOCATIONS};
use std::path::PathBuf;

fn prompt_error(e: dialoguer::Error) -> AppError {
    AppError::Prompt(e.to_string())
}

/// 날짜 입력 (기본값: 오늘)
pub fn date(prompt: &str, given: Option<NaiveDate>) -> Result<NaiveDate> {
    if let Some(date) = given {
        return Ok(date);
    }

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(today)
        .interact_text()
        .map_err(prompt_error)?;

    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Prompt(format!("날짜 형식은 YYYY-MM-DD 입니다: {}", input)))
}

/// 장소 선택
pub fn location(given: Option<String>) -> Result<String> {
    if let Some(location) = given {
        return Ok(location);
    }

    let index = Select::new()
        .with_prompt("장소")
        .items(&LOCATIONS)
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    Ok(LOCATIONS[index].to_string())
}

/// 한 줄 텍스트 입력
pub fn text(prompt: &str, given: Option<String>, allow_empty: bool) -> Result<String> {
    if let Some(value) = given {
        return Ok(value);
    }

    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(prompt_error)
}

/// 사진 경로 입력 (비워 두면 없음)
pub fn photo(given: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if given.is_some() {
        return Ok(given);
    }

    let input = text("사진 경로 (없으면 Enter)", None, true)?;
    let trimmed = input.trim();
    Ok(if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    })
}

/// 미완료 과제 중 하나 선택 (ID 반환)
pub fn pending_task(tasks: &[&DashboardRow]) -> Result<String> {
    let items: Vec<String> = tasks.iter().map(|t| task_label(t)).collect();

    let index = Select::new()
        .with_prompt("조치할 과제")
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    Ok(tasks[index].record.id.clone())
}

/// 과제 한 줄 표시: [장소] 내용 (ID)
pub fn task_label(task: &DashboardRow) -> String {
    let first_line = task.record.issue_text.lines().next().unwrap_or_default();
    format!("[{}] {} ({})", task.record.location, first_line, task.record.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haccp_board_common::InspectionRecord;

    #[test]
    fn test_given_values_skip_prompt() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date("점검일", Some(day)).unwrap(), day);
        assert_eq!(location(Some("발효실".into())).unwrap(), "발효실");
        assert_eq!(text("담당자", Some("생산팀".into()), false).unwrap(), "생산팀");
        assert_eq!(
            photo(Some(PathBuf::from("a.jpg"))).unwrap(),
            Some(PathBuf::from("a.jpg"))
        );
    }

    #[test]
    fn test_task_label_uses_first_line() {
        let row = DashboardRow::from_record(InspectionRecord {
            id: "IMPORTED_1_0".into(),
            location: "전처리실".into(),
            issue_text: "전처리실\n칼이 녹슬었음".into(),
            ..Default::default()
        });
        assert_eq!(task_label(&row), "[전처리실] 전처리실 (IMPORTED_1_0)");
    }
}
