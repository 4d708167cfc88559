pub mod captions;
pub mod channel;
pub mod config;
pub mod content;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod manifest;
pub mod output;
pub mod page;
pub mod pdf;
pub mod popup;
pub mod summarize;

use serde::{Deserialize, Serialize};

use error::ExtractError;

/// Language code preferred when selecting a caption track
pub const DEFAULT_LANG: &str = "en";

/// Display name of a caption track, in either of YouTube's text shapes
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrackName {
    #[serde(rename = "simpleText", default, skip_serializing_if = "Option::is_none")]
    pub simple_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextRun {
    #[serde(default)]
    pub text: String,
}

impl TrackName {
    pub fn text(&self) -> Option<String> {
        if let Some(ref s) = self.simple_text {
            return Some(s.clone());
        }
        if self.runs.is_empty() {
            return None;
        }
        Some(self.runs.iter().map(|r| r.text.as_str()).collect())
    }
}

/// One selectable caption stream
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaptionTrack {
    #[serde(rename = "languageCode", default)]
    pub language_code: String,
    #[serde(rename = "baseUrl", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TrackName>,
}

impl CaptionTrack {
    pub fn new(language_code: &str, base_url: &str) -> Self {
        Self {
            language_code: language_code.to_string(),
            base_url: Some(base_url.to_string()),
            name: None,
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .as_ref()
            .and_then(|n| n.text())
            .unwrap_or_else(|| "Unknown Name".to_string())
    }
}

/// Caption tracks advertised by the page, in page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionManifest {
    pub tracks: Vec<CaptionTrack>,
}

/// Plain-text transcript, or the reason it could not be produced
pub type TranscriptResult = Result<String, ExtractError>;

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    // Bare 11-character video ID
    if regex::Regex::new(r"^[a-zA-Z0-9_-]{11}$").ok()?.is_match(input) {
        return Some(input.to_string());
    }

    let patterns = [
        r"(?:youtube\.com/watch\?.*v=)([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
    ];

    for pattern in patterns {
        if let Some(caps) = regex::Regex::new(pattern).ok()?.captures(input) {
            return Some(caps[1].to_string());
        }
    }

    None
}

/// Whether a tab URL points at YouTube at all
pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com")
}

/// Canonical watch page URL for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
