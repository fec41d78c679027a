//! HACCP Board
//!
//! 위생점검 개선과제를 스프레드시트 저장소에 기록하고 추적한다.

pub mod blob;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod prompt;
pub mod records;
pub mod sheet;
pub mod store;
