use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::SourceConfig;
use crate::constants::{context, events};
use crate::data::fred::StatisticsSource;
use crate::data::scraper::PageFetcher;

/// Everything the first role gets to read, built once per cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedContext {
    text: String,
    sources_ok: usize,
    stats_ok: usize,
}

impl AggregatedContext {
    /// Context over raw text, counted as one successful source.
    #[cfg(test)]
    pub(crate) fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources_ok: 1,
            stats_ok: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters, not bytes.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn sources_ok(&self) -> usize {
        self.sources_ok
    }

    pub fn stats_ok(&self) -> usize {
        self.stats_ok
    }

    /// Only headers and placeholders: no source and no statistic came back.
    pub fn is_effectively_empty(&self) -> bool {
        self.sources_ok == 0 && self.stats_ok == 0
    }
}

/// Result of one source fetch, already substituted if it failed.
#[derive(Clone, Debug)]
struct SourceSection {
    name: String,
    text: String,
    ok: bool,
}

pub struct ContextAggregator {
    sources: Vec<SourceConfig>,
    series: Vec<String>,
    fetcher: Arc<dyn PageFetcher>,
    stats: Arc<dyn StatisticsSource>,
    max_concurrent: usize,
}

impl ContextAggregator {
    pub fn new(
        sources: Vec<SourceConfig>,
        series: Vec<String>,
        fetcher: Arc<dyn PageFetcher>,
        stats: Arc<dyn StatisticsSource>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            sources,
            series,
            fetcher,
            stats,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetches every source with at most `max_concurrent` in flight, waits for
    /// all of them, then reads statistics one by one. Never fails.
    pub async fn gather(&self) -> AggregatedContext {
        info!(
            "🧭 [AGGREGATOR] Gathering context from {} sources (max concurrent: {})...",
            self.sources.len(),
            self.max_concurrent
        );

        // `buffered` keeps configuration order regardless of completion order
        let sections: Vec<SourceSection> = stream::iter(self.sources.clone())
            .map(|source| {
                let fetcher = self.fetcher.clone();
                async move { Self::fetch_source(fetcher, source).await }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut stats_lines = Vec::with_capacity(self.series.len());
        let mut stats_ok = 0;
        for series_id in &self.series {
            match self.stats.summarize(series_id).await {
                Ok(line) => {
                    stats_ok += 1;
                    stats_lines.push(line);
                }
                Err(e) => {
                    warn!("⚠️ [AGGREGATOR] Statistics unavailable for {}: {}", series_id, e);
                    stats_lines.push(e.to_string());
                }
            }
        }

        let context = AggregatedContext {
            text: Self::render(&sections, &stats_lines),
            sources_ok: sections.iter().filter(|s| s.ok).count(),
            stats_ok,
        };

        info!(
            "🧭 [AGGREGATOR] Context gathering complete ({}/{} sources, {}/{} series, {} chars)",
            context.sources_ok,
            sections.len(),
            context.stats_ok,
            self.series.len(),
            context.char_count()
        );

        context
    }

    /// Runs the fetch on its own task so a panicking fetcher only loses its own source.
    async fn fetch_source(fetcher: Arc<dyn PageFetcher>, source: SourceConfig) -> SourceSection {
        info!("🌐 [AGGREGATOR] Scraping {} from {}...", source.name, source.url);
        let url = source.url.clone();
        let fetched = tokio::spawn(async move { fetcher.fetch_text(&url).await }).await;

        let text = match fetched {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(
                    event = events::SOURCE_FAILED,
                    "⚠️ [AGGREGATOR] {} returned no content",
                    source.name
                );
                String::new()
            }
            Err(e) => {
                error!(
                    event = events::SOURCE_FAILED,
                    "❌ [AGGREGATOR] {} generated an exception during scraping: {}",
                    source.name,
                    e
                );
                String::new()
            }
        };

        let ok = !text.is_empty();
        SourceSection {
            text: if ok {
                text
            } else {
                context::source_placeholder(&source.name)
            },
            name: source.name,
            ok,
        }
    }

    fn render(sections: &[SourceSection], stats_lines: &[String]) -> String {
        let mut out = format!("{}\n\n", context::HEADER);
        for section in sections {
            out.push_str(&format!(
                "--- {} ---\n{}\n\n",
                section.name.to_uppercase(),
                section.text
            ));
        }
        out.push_str(&format!("--- {} ---\n", context::STATS_SECTION));
        for line in stats_lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
