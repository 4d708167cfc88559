use eyre::Result;
use log::debug;
use regex::Regex;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Read-only view of a loaded watch page, as the extractor sees it.
///
/// `player_response` stands in for the page's `ytInitialPlayerResponse` global.
/// It is owned by the page, so the extractor only ever reads it and treats its
/// absence as a normal outcome.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub url: Option<String>,
    pub player_response: Option<serde_json::Value>,
    pub scripts: Vec<String>,
}

impl PageContext {
    pub fn new(player_response: Option<serde_json::Value>, scripts: Vec<String>) -> Self {
        Self {
            url: None,
            player_response,
            scripts,
        }
    }

    /// Build a page from raw HTML, keeping only inline script bodies.
    pub fn from_html(html: &str) -> Result<Self> {
        let re = Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script>")?;
        let scripts: Vec<String> = re
            .captures_iter(html)
            .filter(|caps| !caps[1].to_ascii_lowercase().contains("src="))
            .map(|caps| caps[2].to_string())
            .filter(|body| !body.trim().is_empty())
            .collect();

        debug!("Collected {} inline scripts from page", scripts.len());

        Ok(Self {
            url: None,
            player_response: None,
            scripts,
        })
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

/// Download a watch page the way a desktop browser would.
pub async fn fetch_watch_page(client: &reqwest::Client, video_id: &str) -> Result<PageContext> {
    let watch_url = crate::watch_url(video_id);
    debug!("Fetching watch page: {watch_url}");

    let html = client
        .get(&watch_url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    Ok(PageContext::from_html(&html)?.with_url(&watch_url))
}
