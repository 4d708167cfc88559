use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "YouTube caption transcript extractor and summarizer",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Summarize the transcript via the summarizer backend
    #[arg(short, long)]
    pub summarize: bool,

    /// Export the summary as a PDF (implies --summarize)
    #[arg(short, long)]
    pub pdf: bool,

    /// Directory for exported PDFs
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Preferred caption language
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Summarizer endpoint
    #[arg(long)]
    pub summarizer_url: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show extraction details
    #[arg(short, long)]
    pub verbose: bool,
}
