//! "Fetch text given a URL": plain HTTP fetch plus HTML-to-text extraction.
//!
//! Failures never leave this module; callers get an empty string and a log line.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::FetchConfig;
use crate::text::{collapse_whitespace, truncate_chars};

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Page text, or an empty string on any failure.
    async fn fetch_text(&self, url: &str) -> String;
}

/// Readable text from an HTML document, whitespace-collapsed and capped.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let text = match html2text::from_read(html.as_bytes(), 120) {
        Ok(text) => collapse_whitespace(&text),
        Err(e) => {
            warn!("⚠️ [FETCH] Could not parse HTML: {}", e);
            html.to_string()
        }
    };
    truncate_chars(&text, max_chars).to_string()
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    max_chars: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_chars: config.max_text_chars,
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        match self.fetch_html(url).await {
            Ok(html) => {
                info!("🌐 [FETCH] Successfully fetched content from {}", url);
                extract_text(&html, self.max_chars)
            }
            Err(e) => {
                error!("❌ [FETCH] Error fetching page {}: {}", url, e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_reads_body_text() {
        let html = "<html><head><title>USGS</title></head><body><h1>Quake</h1><p>M6.2   detected\n near coast</p></body></html>";
        let text = extract_text(html, 1500);
        assert!(text.contains("Quake"));
        assert!(text.contains("M6.2 detected near coast"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_extract_text_caps_length() {
        let html = format!("<html><body><p>{}</p></body></html>", "word ".repeat(1000));
        let text = extract_text(&html, 100);
        assert!(text.chars().count() <= 100);
    }

    #[test]
    fn test_extract_text_empty_input() {
        assert_eq!(extract_text("", 100), "");
        assert_eq!(extract_text("   \n", 100), "");
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_empty_string() {
        let config = FetchConfig {
            timeout_secs: 2,
            ..FetchConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        // Port 9 (discard) on localhost is closed in test environments
        let text = fetcher.fetch_text("http://127.0.0.1:9/").await;
        assert_eq!(text, "");
    }
}
