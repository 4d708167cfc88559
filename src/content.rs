use std::sync::Arc;

use log::{info, warn};

use crate::TranscriptResult;
use crate::channel::{GET_TRANSCRIPT, Handled, MessageRouter, Reply};
use crate::error::ExtractError;
use crate::extractor::TranscriptExtractor;
use crate::fetch::CaptionFetcher;

/// Answer `get_transcript` requests on this page with the given extractor.
///
/// The reply is deferred until extraction finishes; failures of any kind come
/// back as `success: false`.
pub fn register_transcript_handler<F>(router: &mut MessageRouter, extractor: Arc<TranscriptExtractor<F>>)
where
    F: CaptionFetcher + 'static,
{
    router.on(GET_TRANSCRIPT, move |_request, responder| {
        let extractor = Arc::clone(&extractor);
        Handled::Deferred(Box::pin(async move {
            let reply = reply_for(extractor.extract_transcript().await);
            responder.send(reply);
        }))
    });
}

/// Convert an extraction outcome into the wire reply.
///
/// An empty transcript is a valid extraction but there is nothing to hand to
/// the popup, so it is reported as not found.
pub fn reply_for(result: TranscriptResult) -> Reply {
    match result {
        Ok(text) if !text.is_empty() => {
            info!("Sending transcript back to popup ({} chars)", text.len());
            Reply::transcript(text)
        }
        Ok(_) => {
            warn!("Caption track parsed but contained no text");
            Reply::error("Transcript not found or couldn't be parsed.")
        }
        Err(e @ (ExtractError::ManifestNotFound | ExtractError::NoSuitableTrack)) => {
            warn!("Could not fetch or parse transcript: {e}");
            Reply::error(format!("Transcript not found or couldn't be parsed: {e}."))
        }
        Err(e) => {
            warn!("Error fetching transcript: {e}");
            Reply::error(format!("Error fetching transcript: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_for_success() {
        assert_eq!(reply_for(Ok("hello".to_string())), Reply::transcript("hello"));
    }

    #[test]
    fn test_reply_for_empty_transcript() {
        let reply = reply_for(Ok(String::new()));
        assert!(!reply.success);
        assert!(reply.transcript.is_none());
    }

    #[test]
    fn test_reply_for_fetch_error() {
        let reply = reply_for(Err(ExtractError::FetchError(404)));
        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("Error fetching transcript: HTTP error! status: 404"));
    }

    #[test]
    fn test_reply_for_manifest_not_found() {
        let reply = reply_for(Err(ExtractError::ManifestNotFound));
        assert!(!reply.success);
        assert!(reply.error.unwrap().contains("manifest not found"));
    }
}
