use std::path::PathBuf;

use serde::Serialize;

/// What one run produced for a video
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub video_id: String,
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<PathBuf>,
}

/// Transcript, then the summary under a separator if there is one
pub fn render_text(report: &Report) -> String {
    match report.summary {
        Some(ref summary) => format!("{}\n\n--- Summary ---\n{summary}", report.transcript),
        None => report.transcript.clone(),
    }
}

pub fn render_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_default()
}
