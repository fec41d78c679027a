//! HACCP Board Common Library
//!
//! 가져오기 정합, 대시보드 집계, 레코드 타입 등 입출력이 없는 순수 로직

pub mod types;
pub mod rules;
pub mod error;
pub mod importer;
pub mod dashboard;
pub mod photo_ref;

pub use types::{Cell, InspectionRecord, Status, HEADER, LOCATIONS};
pub use rules::{ColumnRole, HeaderRules};
pub use error::{Error, Result};
pub use importer::{reconcile, ImportBatch, RowOutcome};
pub use dashboard::{build_dashboard, load_rows, Dashboard, DashboardRow, PeriodFilter};
pub use photo_ref::PhotoRef;
