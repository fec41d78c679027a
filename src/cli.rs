use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "haccp")]
#[command(about = "HACCP 점검 개선과제 기록/추적 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 실행과제 파일(xlsx/csv)을 가져와 저장소에 추가
    Import {
        /// 가져올 파일
        #[arg(required = true)]
        file: PathBuf,

        /// 헤더 규칙 JSON 파일 (기본 규칙 대신 사용)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// 이미 있는 내용(점검일/내용/담당)과 같은 행은 제외
        #[arg(long)]
        skip_duplicates: bool,

        /// 저장하지 않고 결과만 표시
        #[arg(long)]
        dry_run: bool,
    },

    /// 개선 필요사항 등록
    Create {
        /// 점검일 (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// 장소
        #[arg(short, long)]
        location: Option<String>,

        /// 개선 필요사항
        #[arg(short, long)]
        issue: Option<String>,

        /// 담당자
        #[arg(short, long)]
        owner: Option<String>,

        /// 개선 전 사진
        #[arg(short, long)]
        photo: Option<PathBuf>,
    },

    /// 조치 완료 입력
    Remediate {
        /// 과제 ID (생략 시 미완료 과제에서 선택)
        #[arg(long)]
        id: Option<String>,

        /// 조치 내용
        #[arg(short, long)]
        text: Option<String>,

        /// 완료일 (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// 개선 후 사진
        #[arg(short, long)]
        photo: Option<PathBuf>,

        /// 선택 목록을 담당자로 좁히기
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// 현황 대시보드
    Dashboard {
        /// 연도 (여러 번 지정 가능)
        #[arg(long)]
        year: Vec<i32>,

        /// 월
        #[arg(long)]
        month: Vec<u32>,

        /// ISO 주차
        #[arg(long)]
        week: Vec<u32>,

        /// 최근 등록 표시 건수
        #[arg(long, default_value = "10")]
        recent: usize,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,

        /// 조회 캐시를 쓰지 않음
        #[arg(long)]
        no_cache: bool,
    },

    /// 미완료 과제 목록
    Tasks {
        /// 담당자
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// 사진 참조 확인/내보내기
    Photo {
        /// 파일 ID 또는 링크
        #[arg(required = true)]
        reference: String,

        /// 저장할 경로
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// data URL로 출력
        #[arg(long)]
        data_url: bool,
    },

    /// 설정 표시/편집
    Config {
        /// 기록 저장소 경로
        #[arg(long)]
        store: Option<PathBuf>,

        /// 사진 폴더
        #[arg(long)]
        photo_folder: Option<PathBuf>,

        /// 조회 캐시 유효 시간 (초)
        #[arg(long)]
        cache_ttl: Option<u64>,

        /// 설정 표시
        #[arg(long)]
        show: bool,
    },

    /// 조회 캐시 관리
    Cache {
        /// 캐시 삭제
        #[arg(long)]
        clear: bool,

        /// 캐시 정보 표시
        #[arg(long)]
        info: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import() {
        let cli = Cli::parse_from(["haccp", "import", "tasks.xlsx", "--skip-duplicates"]);
        match cli.command {
            Commands::Import { file, skip_duplicates, dry_run, rules } => {
                assert_eq!(file, PathBuf::from("tasks.xlsx"));
                assert!(skip_duplicates);
                assert!(!dry_run);
                assert!(rules.is_none());
            }
            _ => panic!("import 명령이 아님"),
        }
    }

    #[test]
    fn test_parse_dashboard_filters() {
        let cli = Cli::parse_from([
            "haccp", "dashboard", "--year", "2024", "--month", "3", "--month", "4", "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Dashboard { year, month, week, recent, .. } => {
                assert_eq!(year, vec![2024]);
                assert_eq!(month, vec![3, 4]);
                assert!(week.is_empty());
                assert_eq!(recent, 10);
            }
            _ => panic!("dashboard 명령이 아님"),
        }
    }

    #[test]
    fn test_parse_create_date() {
        let cli = Cli::parse_from(["haccp", "create", "--date", "2024-03-05"]);
        match cli.command {
            Commands::Create { date, .. } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5));
            }
            _ => panic!("create 명령이 아님"),
        }
    }
}
