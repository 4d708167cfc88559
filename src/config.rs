use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_LANG;
use crate::pdf::PdfLayout;
use crate::summarize::DEFAULT_SUMMARIZER_URL;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_lang: Option<String>,
    pub summarizer_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub font_size: Option<f32>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn lang(&self) -> &str {
        self.default_lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn summarizer_url(&self) -> &str {
        self.summarizer_url.as_deref().unwrap_or(DEFAULT_SUMMARIZER_URL)
    }

    /// Where PDFs land when no `--output-dir` is given
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn pdf_layout(&self) -> PdfLayout {
        let mut layout = PdfLayout::default();
        if let Some(size) = self.font_size.filter(|s| *s > 0.0) {
            layout.font_size = size;
        }
        layout
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
default_lang = "es"
summarizer_url = "http://localhost:8080/summarize"
output_dir = "/tmp/summaries"
font_size = 12.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.lang(), "es");
        assert_eq!(config.summarizer_url(), "http://localhost:8080/summarize");
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/summaries"));
        assert!((config.pdf_layout().font_size - 12.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.lang(), "en");
        assert_eq!(config.summarizer_url(), "http://127.0.0.1:5000/summarize");
        assert!((config.pdf_layout().font_size - 11.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"default_lang = "fr""#).unwrap();
        assert_eq!(config.default_lang.as_deref(), Some("fr"));
        assert!(config.summarizer_url.is_none());
    }

    #[test]
    fn test_nonpositive_font_size_ignored() {
        let config: Config = toml::from_str("font_size = 0.0").unwrap();
        assert!((config.pdf_layout().font_size - 11.0).abs() < f32::EPSILON);
    }
}
