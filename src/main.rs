use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, bail};
use log::{debug, info};

use ytsum::channel::{MessageRouter, listen};
use ytsum::config::Config;
use ytsum::content::register_transcript_handler;
use ytsum::extractor::TranscriptExtractor;
use ytsum::fetch::HttpFetcher;
use ytsum::output::Report;
use ytsum::pdf::PdfExporter;
use ytsum::popup::{PopupController, Tab};
use ytsum::summarize::Summarizer;

mod cli;

use cli::{Cli, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn build_after_help() -> String {
    let config_path = ytsum::config::config_path();
    let config_line = if config_path.exists() {
        format!("  \x1b[32m✅\x1b[0m config     {}", config_path.display())
    } else {
        format!("  \x1b[33m–\x1b[0m  config     {} (not present, using defaults)", config_path.display())
    };

    let log_path = log_dir().join("ytsum.log");

    format!(
        "\nCONFIGURATION:\n{config_line}\n\nSummaries are posted to {} unless --summarizer-url is set.\nLogs are written to: {}",
        ytsum::summarize::DEFAULT_SUMMARIZER_URL,
        log_path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    // CLI flags take priority over config
    let lang = cli.lang.clone().unwrap_or_else(|| config.lang().to_string());
    let summarizer_url = cli
        .summarizer_url
        .clone()
        .unwrap_or_else(|| config.summarizer_url().to_string());
    let output_dir = cli.output_dir.clone().unwrap_or_else(|| config.output_dir());

    if cli.verbose {
        let config_path = ytsum::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        debug!("Language: {lang}, output: {}", output_dir.display());
    }

    let client = reqwest::Client::new();
    let summarizer = Summarizer::new(client.clone(), &summarizer_url);
    if cli.verbose {
        eprintln!("Summarizer: {}", summarizer.endpoint());
    }
    let exporter = PdfExporter::new(&output_dir).with_layout(config.pdf_layout());

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.is_empty() {
        bail!("no URL or video ID provided\n\nUsage: ytsum <URL>\n       echo <URL> | ytsum");
    }

    for url_input in &urls {
        let url_input = url_input.trim().to_string();
        if url_input.is_empty() {
            continue;
        }

        let video_id = ytsum::extract_video_id(&url_input)
            .ok_or_else(|| eyre::eyre!("could not extract video ID from: {url_input}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>"))?;

        // Load the watch page and attach the transcript listener to it
        let page = ytsum::page::fetch_watch_page(&client, &video_id).await?;
        if cli.verbose {
            eprintln!("Video: {video_id}\nInline scripts: {}", page.scripts.len());
        }

        let tab = Tab { url: page.url.clone() };
        let extractor = TranscriptExtractor::new(page, HttpFetcher::new(client.clone())).with_lang(&lang);
        debug!("Preferred caption language: {}", extractor.lang());
        let mut router = MessageRouter::new();
        register_transcript_handler(&mut router, Arc::new(extractor));
        let page_handle = listen(router);

        let mut popup = PopupController::new();
        popup.request_transcript(Some(&tab), &page_handle).await?;

        let mut report = Report {
            video_id: video_id.clone(),
            transcript: popup.state().transcript.clone(),
            summary: None,
            pdf: None,
        };

        if cli.summarize || cli.pdf {
            let summary = popup.summarize(&summarizer).await?;
            report.summary = Some(summary.to_string());
        }

        if cli.pdf {
            let path = popup.download_pdf(&exporter, chrono::Local::now().date_naive())?;
            if cli.verbose {
                eprintln!("PDF written to: {}", path.display());
            }
            report.pdf = Some(path);
        }

        let rendered = match cli.format {
            OutputFormat::Text => ytsum::output::render_text(&report),
            OutputFormat::Json => ytsum::output::render_json(&report),
        };
        println!("{rendered}");
    }

    Ok(())
}
