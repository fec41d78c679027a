use anyhow::Context;
use chrono::Local;
use clap::Parser;
use haccp_board::blob::{BlobStore, LocalBlobStore, PhotoOptions, PhotoSource};
use haccp_board::import::{self, CommitOutcome, ImportOptions};
use haccp_board::records::{self, NewIssue, Remediation};
use haccp_board::store::{RecordStore, SnapshotCache, WorkbookStore};
use haccp_board::{cli, config, prompt};
use haccp_board_common::dashboard::{pending_owners, pending_tasks};
use haccp_board_common::importer::DegradedField;
use haccp_board_common::{build_dashboard, load_rows, HeaderRules, PeriodFilter};
use indicatif::{ProgressBar, ProgressStyle};
use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "haccp_board=debug,haccp_board_common=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().context("설정을 읽을 수 없습니다")?;

    // 저장소 핸들은 여기서 한 번만 만든다
    let mut store = WorkbookStore::new(&config.store_path, &config.sheet_name);
    let blob = LocalBlobStore::new(&config.photo_folder);
    let cache = SnapshotCache::new(config.cache_path(), config.cache_ttl());
    let photo_options = PhotoOptions {
        max_size: config.max_photo_size,
        quality: config.jpeg_quality,
    };

    match cli.command {
        Commands::Import { file, rules, skip_duplicates, dry_run } => {
            println!("📥 haccp - 실행과제 가져오기\n");

            let rules = match rules {
                Some(path) => HeaderRules::from_file(&path)
                    .with_context(|| format!("헤더 규칙을 읽을 수 없습니다: {}", path.display()))?,
                None => HeaderRules::default(),
            };
            let options = ImportOptions {
                rules,
                skip_duplicates,
                dry_run,
                batch_timestamp: None,
            };

            let bar = ProgressBar::new(100);
            if let Ok(style) = ProgressStyle::with_template("[{bar:40}] {pos}%") {
                bar.set_style(style);
            }
            let mut progress = |fraction: f64| bar.set_position((fraction * 100.0).round() as u64);
            let report = import::import_file(&file, &mut store, &options, &mut progress)?;
            bar.finish_and_clear();

            let batch = &report.batch;
            println!("✔ 헤더: {}행", batch.header_index + 1);
            println!("✔ 변환: {}건", batch.records.len() + report.duplicates_skipped);
            if !batch.skipped_rows.is_empty() {
                println!("- 점검일 없음으로 건너뜀: {}행", batch.skipped_rows.len());
            }
            for degraded in &batch.degraded_rows {
                let fields: Vec<&str> = degraded
                    .fields
                    .iter()
                    .map(|f| match f {
                        DegradedField::InspectionDate => "점검일",
                        DegradedField::CompletionDate => "개선완료일",
                    })
                    .collect();
                println!("⚠️  {}번째 행: 날짜 해석 실패 ({}) → 빈 값", degraded.row_index + 1, fields.join(", "));
            }
            if report.duplicates_skipped > 0 {
                println!("- 중복 제외: {}건", report.duplicates_skipped);
            }

            match report.outcome {
                None => println!("\n🔎 dry run: 저장하지 않았습니다"),
                Some(CommitOutcome::NothingToUpload) => println!("\n올릴 데이터가 없습니다"),
                Some(CommitOutcome::Replaced(n)) => {
                    println!("\n✅ {}건 업로드 완료 (헤더 포함 새로 작성)", n)
                }
                Some(CommitOutcome::Appended(n)) => println!("\n✅ {}건 업로드 완료", n),
            }
        }

        Commands::Create { date, location, issue, owner, photo } => {
            println!("📝 haccp - 개선 필요사항 등록\n");
            let interactive = issue.is_none();

            let new = NewIssue {
                date: prompt::date("점검일", date)?,
                location: prompt::location(location)?,
                issue: prompt::text("개선 필요사항", issue, false)?,
                owner: prompt::text("담당자", owner, true)?,
                photo: if interactive { prompt::photo(photo)? } else { photo },
            };

            let outcome = records::create_issue(&mut store, &blob, &new, photo_options)?;
            if let Some(warning) = &outcome.photo_warning {
                println!("⚠️  {} (사진 없이 저장)", warning);
            }
            println!("✅ 저장 완료 (ID: {})", outcome.record.id);
        }

        Commands::Remediate { id, text, date, photo, owner } => {
            println!("🔧 haccp - 조치 완료 입력\n");
            let interactive = id.is_none() || text.is_none();

            let id = match id {
                Some(id) => id,
                None => {
                    let rows = load_rows(&store.read_all()?);
                    let tasks = pending_tasks(&rows, owner.as_deref());
                    if tasks.is_empty() {
                        println!("🎉 미완료 과제가 없습니다");
                        return Ok(());
                    }
                    prompt::pending_task(&tasks)?
                }
            };

            let remediation = Remediation {
                id,
                text: prompt::text("조치 내용", text, false)?,
                completed_on: prompt::date("완료일", date)?,
                photo: if interactive { prompt::photo(photo)? } else { photo },
            };

            let outcome = records::apply_remediation(&mut store, &blob, &remediation, photo_options)?;
            if let Some(warning) = &outcome.photo_warning {
                println!("⚠️  {} (사진 없이 저장)", warning);
            }
            println!("✅ 조치 완료 처리 ({}행)", outcome.row);
        }

        Commands::Dashboard { year, month, week, recent, json, no_cache } => {
            let values = if no_cache {
                store.read_all()?
            } else {
                cache.read_through(&store)?
            };
            let rows = load_rows(&values);
            let filter = PeriodFilter {
                years: year,
                months: month,
                weeks: week,
            };
            let dashboard = build_dashboard(&rows, &filter, recent);

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                return Ok(());
            }

            println!("📊 haccp - 현황\n");
            let summary = &dashboard.summary;
            println!("총 과제: {}건", summary.total);
            println!("완료: {}건", summary.done);
            println!("완료율: {:.1}%", summary.rate);
            if !dashboard.years.is_empty() {
                let years: Vec<String> = dashboard.years.iter().map(i32::to_string).collect();
                println!("연도: {}", years.join(", "));
            }

            println!("\n[{}별 현황]", dashboard.grouping.label());
            for group in &dashboard.groups {
                println!("  {:<12} {:>4}건  완료 {:>4}건  {:>5.1}%", group.key, group.total, group.done, group.rate);
            }

            println!("\n[장소별 완료율 순위]");
            for (rank, group) in dashboard.ranking.iter().enumerate() {
                println!("  {}. {} ({:.1}%)", rank + 1, group.key, group.rate);
            }

            println!("\n[최근 등록 {}건]", dashboard.recent.len());
            for record in &dashboard.recent {
                let first_line = record.issue_text.lines().next().unwrap_or_default();
                println!("  {} [{}] {} - {}", record.inspection_date, record.location, first_line, record.status);
            }
        }

        Commands::Tasks { owner } => {
            let rows = load_rows(&cache.read_through(&store)?);
            let owners = pending_owners(&rows);
            let tasks = pending_tasks(&rows, owner.as_deref());

            println!("📋 haccp - 미완료 과제 ({}건)\n", tasks.len());
            if !owners.is_empty() {
                println!("담당자: {}\n", owners.join(", "));
            }
            for task in tasks {
                println!("  {}", prompt::task_label(task));
            }
        }

        Commands::Photo { reference, output, data_url } => {
            let source = match blob.resolve(&reference)? {
                Some(source) => source,
                None => {
                    println!("사진을 찾을 수 없습니다: {}", reference);
                    return Ok(());
                }
            };

            if data_url {
                println!("{}", source.display_url());
            } else if let Some(path) = output {
                match &source {
                    PhotoSource::Bytes(bytes) => {
                        std::fs::write(&path, bytes)
                            .with_context(|| format!("저장 실패: {}", path.display()))?;
                        println!("✔ 저장: {}", path.display());
                    }
                    PhotoSource::Url(url) => println!("외부 링크라 저장할 수 없습니다: {}", url),
                }
            } else {
                match &source {
                    PhotoSource::Bytes(bytes) => println!("✔ 로컬 사진 ({} bytes)", bytes.len()),
                    PhotoSource::Url(url) => println!("🔗 {}", url),
                }
            }
        }

        Commands::Config { store: store_path, photo_folder, cache_ttl, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(path) = store_path {
                config.store_path = path;
                changed = true;
            }
            if let Some(folder) = photo_folder {
                config.photo_folder = folder;
                changed = true;
            }
            if let Some(ttl) = cache_ttl {
                config.cache_ttl_seconds = ttl;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 설정을 저장했습니다");
            }

            if show || !changed {
                println!("설정:");
                println!("  저장소: {}", config.store_path.display());
                println!("  시트: {}", config.sheet_name);
                println!("  사진 폴더: {}", config.photo_folder.display());
                println!("  조회 캐시: {}초", config.cache_ttl_seconds);
                println!("  사진 최대 크기: {}px (JPEG {}%)", config.max_photo_size, config.jpeg_quality);
            }
        }

        Commands::Cache { clear, info } => {
            if info || !clear {
                match cache.load() {
                    Some(snapshot) => {
                        let age = Local::now().timestamp() - snapshot.fetched_at;
                        println!("조회 캐시:");
                        println!("  경로: {}", cache.path().display());
                        println!("  행 수: {}", snapshot.rows.len());
                        println!("  경과: {}초 (유효 {}초)", age, config.cache_ttl_seconds);
                    }
                    None => println!("조회 캐시가 없습니다: {}", cache.path().display()),
                }
            }

            if clear {
                match cache.clear() {
                    Ok(true) => println!("✔ 조회 캐시를 삭제했습니다: {}", cache.path().display()),
                    Ok(false) => println!("조회 캐시가 없습니다"),
                    Err(e) => println!("캐시 삭제 오류: {}", e),
                }
            }
        }
    }

    Ok(())
}
