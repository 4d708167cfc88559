use log::{debug, info, warn};

use crate::captions::parse_caption_xml;
use crate::error::ExtractError;
use crate::fetch::CaptionFetcher;
use crate::manifest::locate_manifest;
use crate::page::PageContext;
use crate::{CaptionTrack, DEFAULT_LANG, TranscriptResult};

/// Page-side transcript extraction: manifest, track, fetch, parse.
pub struct TranscriptExtractor<F> {
    page: PageContext,
    fetcher: F,
    lang: String,
}

impl<F: CaptionFetcher> TranscriptExtractor<F> {
    pub fn new(page: PageContext, fetcher: F) -> Self {
        Self {
            page,
            fetcher,
            lang: DEFAULT_LANG.to_string(),
        }
    }

    /// Override the preferred language code (defaults to "en")
    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub async fn extract_transcript(&self) -> TranscriptResult {
        let manifest = locate_manifest(&self.page)?;
        let track = select_track(&manifest.tracks, &self.lang)?;
        // select_track never hands back a track without a URL
        let url = track.base_url.as_deref().ok_or(ExtractError::NoSuitableTrack)?;

        info!(
            "Found caption track: {} ({}), URL: {url}",
            track.display_name(),
            track.language_code
        );

        let xml = self.fetcher.fetch_text(url).await?;
        parse_caption_xml(&xml)
    }
}

/// Pick the caption track to transcribe.
///
/// Exact language match first, then any `"<lang>-"` regional variant (matched
/// loosely, so `en-PIRATE` counts), then the first track. First match wins on
/// duplicates. The chosen track must carry a URL.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Result<&'a CaptionTrack, ExtractError> {
    let regional = format!("{lang}-");

    let track = tracks
        .iter()
        .find(|t| t.language_code == lang)
        .or_else(|| tracks.iter().find(|t| t.language_code.starts_with(&regional)))
        .or_else(|| {
            let first = tracks.first();
            if let Some(t) = first {
                warn!("No {lang} track found, using first available track: {}", t.language_code);
            }
            first
        });

    match track {
        Some(t) if t.base_url.as_deref().is_some_and(|u| !u.is_empty()) => {
            debug!("Selected caption track: lang={}", t.language_code);
            Ok(t)
        }
        _ => {
            warn!("No suitable caption track with baseUrl found");
            Err(ExtractError::NoSuitableTrack)
        }
    }
}
