use clap::Parser;
use read_csv::adapters::OfflineUploader;
use read_csv::core::render::render_text;
use read_csv::core::{FileSource, Uploader};
use read_csv::utils::error::ErrorSeverity;
use read_csv::utils::{logger, validation::Validate};
use read_csv::{
    AppError, CliConfig, CsvParser, HttpUploader, LocalFileSource, SelectOutcome, Session,
    UploadOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

type CliSession = Session<CsvParser, Box<dyn Uploader>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting read-csv");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let settings = match config.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load settings: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let uploader: Box<dyn Uploader> = if config.no_upload {
        tracing::info!("Upload disabled, table unlocks right after parsing");
        Box::new(OfflineUploader)
    } else {
        tracing::info!("Upload endpoint: {}", settings.endpoint());
        Box::new(
            HttpUploader::with_timeout(
                settings.endpoint(),
                Duration::from_secs(settings.timeout_seconds()),
            )?
            .chunk_size(settings.chunk_size()),
        )
    };

    let session: Arc<CliSession> = Arc::new(Session::new(
        CsvParser::with_delimiter(settings.delimiter()),
        uploader,
        settings.view_options(),
    ));
    let source = LocalFileSource::new(None).with_media_type(config.media_type.clone());

    if config.interactive {
        if let Some(path) = &config.file {
            select_path(&session, &source, path).await;
        }
        return run_interactive(session, source, config.json).await;
    }

    let Some(path) = &config.file else {
        return Ok(());
    };
    if let Err(e) = select(&session, &source, path).await {
        report(&e);
        std::process::exit(exit_code(&e));
    }

    match session.upload().await {
        UploadOutcome::Failed { reason } => {
            eprintln!("❌ Upload did not complete: {}", reason);
            print_view(&session, config.json)?;
            std::process::exit(exit_code_for(ErrorSeverity::Medium));
        }
        outcome => tracing::debug!("Upload outcome: {:?}", outcome),
    }

    if let Some(term) = &config.search {
        session.search(term);
    }
    session.change_page(config.page - 1);
    print_view(&session, config.json)
}

async fn select(
    session: &CliSession,
    source: &LocalFileSource,
    path: &str,
) -> read_csv::Result<SelectOutcome> {
    let file = source.open(path).await?;
    let outcome = session.select(Some(file)).await?;
    if outcome == SelectOutcome::Rejected {
        tracing::warn!("'{}' was not accepted as CSV", path);
    }
    Ok(outcome)
}

async fn select_path(session: &CliSession, source: &LocalFileSource, path: &str) {
    if let Err(e) = select(session, source, path).await {
        report(&e);
    }
}

async fn run_interactive(
    session: Arc<CliSession>,
    source: LocalFileSource,
    json: bool,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_view(&session, json)?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "show" => {}
            "search" => session.search(arg),
            "next" => session.next_page(),
            "prev" | "previous" => session.previous_page(),
            "page" => match arg.parse::<usize>() {
                Ok(page) if page >= 1 => session.change_page(page - 1),
                _ => {
                    eprintln!("usage: page <n>  (n starts at 1)");
                    continue;
                }
            },
            "select" if arg.is_empty() => {
                if let Err(e) = session.select(None).await {
                    report(&e);
                }
            }
            "select" => select_path(&session, &source, arg).await,
            "upload" => {
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    match session.upload().await {
                        UploadOutcome::Completed => println!("upload complete"),
                        UploadOutcome::Failed { reason } => println!("upload failed: {}", reason),
                        UploadOutcome::Skipped => println!("nothing to upload"),
                        UploadOutcome::Superseded => println!("upload superseded by a newer file"),
                    }
                });
                continue;
            }
            other => {
                eprintln!(
                    "unknown command '{}'; try search, page, next, prev, select, upload, show, quit",
                    other
                );
                continue;
            }
        }
        print_view(&session, json)?;
    }

    Ok(())
}

fn print_view(session: &CliSession, json: bool) -> anyhow::Result<()> {
    let view = session.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_text(&view));
    }
    Ok(())
}

fn report(e: &AppError) {
    tracing::error!(
        "{} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

fn exit_code(e: &AppError) -> i32 {
    exit_code_for(e.severity())
}

fn exit_code_for(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
