use std::path::PathBuf;

use chrono::NaiveDate;
use eyre::{Result, bail};
use log::{debug, error, warn};

use crate::channel::{PageHandle, Request};
use crate::pdf::PdfExporter;
use crate::summarize::Summarizer;

/// The tab the popup was opened on
#[derive(Debug, Clone)]
pub struct Tab {
    pub url: Option<String>,
}

impl Tab {
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
        }
    }
}

/// Everything the popup shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupState {
    pub transcript: String,
    pub placeholder: String,
    /// Last successful summary
    pub summary: Option<String>,
    /// Progress or error text shown in the summary area
    pub summary_status: String,
    pub download_enabled: bool,
}

/// Drives transcript, summary and PDF export for one popup session
#[derive(Debug, Default)]
pub struct PopupController {
    state: PopupState,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    /// Ask the page for its transcript and load it into the popup.
    ///
    /// Connection problems and extraction failures are reported differently,
    /// and either way the popup stays usable for another attempt.
    pub async fn request_transcript(&mut self, tab: Option<&Tab>, page: &PageHandle) -> Result<()> {
        self.state = PopupState {
            placeholder: "Fetching transcript...".to_string(),
            ..PopupState::default()
        };

        let Some(tab) = tab else {
            return self.fail_transcript("Error: Could not find active tab.");
        };

        if !tab.url.as_deref().is_some_and(crate::is_youtube_url) {
            debug!("Not a YouTube page, skipping transcript fetch");
            return self.fail_transcript("Not a YouTube page.");
        }

        let reply = match page.send_message(&Request::GetTranscript).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error sending message: {e}");
                return self.fail_transcript("Error connecting to page. Try reloading the YouTube tab.");
            }
        };

        match reply.into_result() {
            Ok(transcript) => {
                self.state.transcript = transcript;
                self.state.placeholder = "Transcript loaded.".to_string();
                self.state.download_enabled = true;
                Ok(())
            }
            Err(reason) => {
                warn!("Failed to get transcript: {reason}");
                self.fail_transcript(&reason)
            }
        }
    }

    fn fail_transcript(&mut self, reason: &str) -> Result<()> {
        self.state.placeholder = reason.to_string();
        self.state.download_enabled = false;
        bail!("{reason}");
    }

    /// Send the loaded transcript to the summarizer
    pub async fn summarize(&mut self, summarizer: &Summarizer) -> Result<&str> {
        if self.state.transcript.trim().is_empty() {
            bail!("Transcript is empty or could not be fetched.");
        }

        self.state.summary_status = "Summarizing...".to_string();

        match summarizer.summarize(&self.state.transcript).await {
            Ok(summary) => {
                self.state.summary_status.clear();
                self.state.download_enabled = true;
                Ok(self.state.summary.insert(summary).as_str())
            }
            Err(e) => {
                error!("Error calling backend {}: {e}", summarizer.endpoint());
                self.state.summary_status = format!("Error: {e}");
                self.state.summary = None;
                self.state.download_enabled = false;
                Err(e)
            }
        }
    }

    /// Export the current summary as a dated PDF
    pub fn download_pdf(&mut self, exporter: &PdfExporter, date: NaiveDate) -> Result<PathBuf> {
        let Some(summary) = self.state.summary.as_deref().filter(|s| !s.trim().is_empty()) else {
            bail!("Summary is empty. Cannot download PDF.");
        };
        if !self.state.download_enabled {
            bail!("PDF export is disabled until a summary is available.");
        }

        self.state.download_enabled = false;
        let result = exporter.export(summary, date);
        self.state.download_enabled = true;

        result.map_err(|e| {
            error!("Error generating summary PDF: {e}");
            e.wrap_err("An error occurred while generating the PDF.")
        })
    }
}
