//! Headless Chrome fetcher for script-heavy pages (feature `browser`).

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::time::Duration;
use tracing::{error, info};

use super::scraper::{extract_text, PageFetcher};
use crate::config::FetchConfig;
use crate::constants::timing::BROWSER_SETTLE;

pub struct BrowserFetcher {
    timeout: Duration,
    max_chars: usize,
    user_agent: String,
}

impl BrowserFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_chars: config.max_text_chars,
            user_agent: config.user_agent.clone(),
        }
    }

    /// One browser per page; the browser process exits when dropped.
    fn load_page(url: &str, timeout: Duration, user_agent: &str) -> Result<String, String> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(timeout)
            .build()
            .map_err(|e| format!("Launch options invalid: {}", e))?;
        let browser = Browser::new(options)
            .map_err(|e| format!("Chrome launch failed: {}. Install Chrome/Chromium.", e))?;
        let tab = browser
            .new_tab()
            .map_err(|e| format!("Browser tab failed: {}", e))?;
        tab.set_default_timeout(timeout);
        tab.set_user_agent(user_agent, None, None)
            .map_err(|e| format!("Set user agent failed: {}", e))?;
        tab.navigate_to(url)
            .map_err(|e| format!("Navigate failed: {}", e))?
            .wait_until_navigated()
            .map_err(|e| format!("Page load failed: {}", e))?;
        std::thread::sleep(BROWSER_SETTLE);
        tab.get_content()
            .map_err(|e| format!("Get content failed: {}", e))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        let target = url.to_string();
        let timeout = self.timeout;
        let user_agent = self.user_agent.clone();

        let result = tokio::task::spawn_blocking(move || Self::load_page(&target, timeout, &user_agent))
            .await
            .map_err(|e| format!("Task join: {}", e))
            .and_then(|r| r);

        match result {
            Ok(html) => {
                info!("🌐 [FETCH] Successfully fetched content from {} using headless browser", url);
                extract_text(&html, self.max_chars)
            }
            Err(e) => {
                error!("❌ [FETCH] Error fetching page {} with headless browser: {}", url, e);
                String::new()
            }
        }
    }
}
