use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;

use crate::error::ExtractError;
use crate::page::PageContext;
use crate::{CaptionManifest, CaptionTrack};

/// Name of the page global that carries the player response
pub const PLAYER_RESPONSE_VAR: &str = "ytInitialPlayerResponse";

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

impl PlayerResponse {
    fn into_manifest(self) -> CaptionManifest {
        let tracks = self
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();
        CaptionManifest { tracks }
    }
}

/// Find the caption manifest on a page.
///
/// The page global wins when present and well-formed. Otherwise inline scripts
/// are scanned for `ytInitialPlayerResponse = {...};` and the first assignment
/// that parses as a JSON object is used. A player response without a caption
/// list yields an empty manifest, not an error.
pub fn locate_manifest(page: &PageContext) -> Result<CaptionManifest, ExtractError> {
    if let Some(ref global) = page.player_response {
        match PlayerResponse::deserialize(global) {
            Ok(resp) => {
                debug!("Using {PLAYER_RESPONSE_VAR} from page global");
                return Ok(resp.into_manifest());
            }
            Err(e) => warn!("Page global {PLAYER_RESPONSE_VAR} has unexpected shape: {e}"),
        }
    }

    match scan_scripts(&page.scripts)? {
        Some(resp) => Ok(resp.into_manifest()),
        None => {
            warn!("{PLAYER_RESPONSE_VAR} not found");
            Err(ExtractError::ManifestNotFound)
        }
    }
}

fn scan_scripts(scripts: &[String]) -> Result<Option<PlayerResponse>, ExtractError> {
    let re = Regex::new(r"ytInitialPlayerResponse\s*=\s*\{")
        .map_err(|e| ExtractError::ParseError(e.to_string()))?;

    for (idx, script) in scripts.iter().enumerate() {
        if !script.contains(PLAYER_RESPONSE_VAR) {
            continue;
        }
        for m in re.find_iter(script) {
            // Start at the opening brace, let the JSON parser find the end
            let json = &script[m.end() - 1..];
            match parse_first_object(json) {
                Some(resp) => {
                    debug!("Parsed {PLAYER_RESPONSE_VAR} from inline script #{idx}");
                    return Ok(Some(resp));
                }
                None => warn!("Error parsing {PLAYER_RESPONSE_VAR} from inline script #{idx}"),
            }
        }
    }

    Ok(None)
}

fn parse_first_object(json: &str) -> Option<PlayerResponse> {
    let mut stream = serde_json::Deserializer::from_str(json).into_iter::<serde_json::Value>();
    let value = stream.next()?.ok()?;
    if !value.is_object() {
        return None;
    }
    PlayerResponse::deserialize(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_response(tracks: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": tracks
                }
            },
            "videoDetails": {"title": "Test"}
        })
    }

    #[test]
    fn test_global_binding_wins() {
        let global = player_response(serde_json::json!([
            {"baseUrl": "https://a", "languageCode": "en"}
        ]));
        let script = r#"var ytInitialPlayerResponse = {"captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [{"baseUrl": "https://b", "languageCode": "fr"}]}}};"#;
        let page = PageContext::new(Some(global), vec![script.to_string()]);

        let manifest = locate_manifest(&page).unwrap();
        assert_eq!(manifest.tracks.len(), 1);
        assert_eq!(manifest.tracks[0].base_url.as_deref(), Some("https://a"));
    }

    #[test]
    fn test_script_scan_fallback() {
        let script = r#"var meta = 1;var ytInitialPlayerResponse = {"captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [{"baseUrl": "https://b?x=1&y=}", "languageCode": "fr", "name": {"simpleText": "French"}}]}}};var ytInitialData = {};"#;
        let page = PageContext::new(None, vec!["window.a = 1;".to_string(), script.to_string()]);

        let manifest = locate_manifest(&page).unwrap();
        assert_eq!(manifest.tracks.len(), 1);
        assert_eq!(manifest.tracks[0].language_code, "fr");
        assert_eq!(manifest.tracks[0].base_url.as_deref(), Some("https://b?x=1&y=}"));
        assert_eq!(manifest.tracks[0].display_name(), "French");
    }

    #[test]
    fn test_malformed_json_is_not_found() {
        let script = r#"var ytInitialPlayerResponse = {"captions": {broken;"#;
        let page = PageContext::new(None, vec![script.to_string()]);
        assert_eq!(locate_manifest(&page), Err(ExtractError::ManifestNotFound));
    }

    #[test]
    fn test_malformed_first_script_then_valid_second() {
        let bad = r#"ytInitialPlayerResponse = {oops};"#.to_string();
        let good = r#"ytInitialPlayerResponse = {"captions": null};"#.to_string();
        let page = PageContext::new(None, vec![bad, good]);
        let manifest = locate_manifest(&page).unwrap();
        assert!(manifest.tracks.is_empty());
    }

    #[test]
    fn test_no_manifest_anywhere() {
        let page = PageContext::new(None, vec!["console.log('hi');".to_string()]);
        assert_eq!(locate_manifest(&page), Err(ExtractError::ManifestNotFound));
        assert_eq!(locate_manifest(&PageContext::default()), Err(ExtractError::ManifestNotFound));
    }

    #[test]
    fn test_mention_without_assignment_is_not_found() {
        let page = PageContext::new(None, vec!["if (window.ytInitialPlayerResponse) {}".to_string()]);
        assert_eq!(locate_manifest(&page), Err(ExtractError::ManifestNotFound));
    }

    #[test]
    fn test_response_without_captions_is_empty_manifest() {
        let global = serde_json::json!({"videoDetails": {"title": "No captions"}});
        let page = PageContext::new(Some(global), vec![]);
        let manifest = locate_manifest(&page).unwrap();
        assert!(manifest.tracks.is_empty());
    }

    #[test]
    fn test_malformed_global_falls_back_to_scripts() {
        let global = serde_json::json!({"captions": "not an object"});
        let script = r#"ytInitialPlayerResponse = {"captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [{"baseUrl": "https://c", "languageCode": "en"}]}}};"#;
        let page = PageContext::new(Some(global), vec![script.to_string()]);
        let manifest = locate_manifest(&page).unwrap();
        assert_eq!(manifest.tracks[0].base_url.as_deref(), Some("https://c"));
    }
}
