use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

/// Local summarizer backend the popup talks to by default
pub const DEFAULT_SUMMARIZER_URL: &str = "http://127.0.0.1:5000/summarize";

const NO_SUMMARY: &str = "Could not generate summary.";

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    transcript: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: Option<String>,
}

/// Client for the remote summarization endpoint
#[derive(Debug, Clone)]
pub struct Summarizer {
    client: reqwest::Client,
    endpoint: String,
}

impl Summarizer {
    pub fn new(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `{transcript}` and return the `summary` field of the reply
    pub async fn summarize(&self, transcript: &str) -> Result<String> {
        debug!("Summarizing {} chars via {}", transcript.len(), self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&SummarizeRequest { transcript })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            bail!("{}", backend_error(status.as_u16(), &body));
        }

        extract_summary(&body)
    }
}

/// The backend reports its own errors in the `summary` field
fn backend_error(status: u16, body: &str) -> String {
    serde_json::from_str::<SummarizeResponse>(body)
        .ok()
        .and_then(|r| r.summary)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("Backend error: {status}"))
}

fn extract_summary(body: &str) -> Result<String> {
    let parsed: SummarizeResponse =
        serde_json::from_str(body).map_err(|e| eyre::eyre!("malformed summarizer response: {e}"))?;
    match parsed.summary {
        Some(summary) if !summary.trim().is_empty() => Ok(summary),
        _ => bail!(NO_SUMMARY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(SummarizeRequest { transcript: "hello" }).unwrap();
        assert_eq!(body, serde_json::json!({"transcript": "hello"}));
    }

    #[test]
    fn test_extract_summary() {
        assert_eq!(extract_summary(r#"{"summary": "Short version."}"#).unwrap(), "Short version.");
    }

    #[test]
    fn test_extract_summary_missing() {
        let err = extract_summary(r#"{"other": 1}"#).unwrap_err();
        assert_eq!(err.to_string(), NO_SUMMARY);
        assert!(extract_summary(r#"{"summary": "  "}"#).is_err());
    }

    #[test]
    fn test_extract_summary_malformed() {
        let err = extract_summary("<html>oops</html>").unwrap_err();
        assert!(err.to_string().starts_with("malformed summarizer response"));
    }

    #[test]
    fn test_backend_error_prefers_reported_message() {
        assert_eq!(backend_error(500, r#"{"summary": "model not loaded"}"#), "model not loaded");
        assert_eq!(backend_error(502, "Bad Gateway"), "Backend error: 502");
        assert_eq!(backend_error(500, r#"{"summary": ""}"#), "Backend error: 500");
    }
}
