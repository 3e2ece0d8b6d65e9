#[cfg(feature = "browser")]
pub mod browser;
pub mod fred;
pub mod scraper;
pub mod store;


use std::sync::Arc;

use crate::config::{AppConfig, FetchMode};
use crate::error::MonitorError;
use scraper::{HttpFetcher, PageFetcher};

/// Picks the fetch backend named in the configuration.
pub fn build_fetcher(config: &AppConfig) -> Result<Arc<dyn PageFetcher>, MonitorError> {
    match config.fetch.mode {
        FetchMode::Http => Ok(Arc::new(HttpFetcher::new(&config.fetch)?)),
        #[cfg(feature = "browser")]
        FetchMode::Browser => Ok(Arc::new(browser::BrowserFetcher::new(&config.fetch))),
        #[cfg(not(feature = "browser"))]
        FetchMode::Browser => Err(crate::error::ConfigError::Invalid(
            "fetch.mode 'browser' requires building with the `browser` feature".into(),
        )
        .into()),
    }
}
