//! Application-wide constants and fixed strings
//!
//! Placeholders, markers and notification templates live here so the
//! aggregator, chain runner and orchestrator agree on the exact wording.

use std::time::Duration;

/// Context aggregation constants
pub mod context {
    /// First line of every aggregated context
    pub const HEADER: &str = "Collected Real-Time Data:";

    /// Section title for the statistics block
    pub const STATS_SECTION: &str = "ECONOMIC DATA";

    /// Default fetch fan-out ceiling
    pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;

    /// Readable text kept per source after HTML extraction
    pub const DEFAULT_MAX_TEXT_CHARS: usize = 1500;

    /// Placeholder used when a source yields nothing
    pub fn source_placeholder(source: &str) -> String {
        format!("Failed to retrieve content from {}.", source)
    }
}

/// Agent chain constants
pub mod agents {
    /// Prefix of the text recorded for a role whose generation failed
    pub const ERROR_MARKER_PREFIX: &str = "Error in ";

    /// Role that synthesizes everything and always runs last
    pub const DEFAULT_TERMINAL_ROLE: &str = "disaster_economist";

    pub fn error_marker(role: &str, error: &str) -> String {
        format!("{}{} analysis: {}", ERROR_MARKER_PREFIX, role, error)
    }

    /// Recommendation used when the terminal role produced no entry
    pub const NO_RECOMMENDATION: &str = "No economic recommendation generated.";
}

/// Notification templates
pub mod messages {
    pub const ACTIVATED: &str =
        "📈 Intelligent Disaster Monitor activated. Starting monitoring cycles.";

    pub const SYNTHESIS_FAILED: &str =
        "Critical Error: Monitoring cycle completed but failed to generate summary/recommendation.";

    pub const DEFAULT_PREVIEW_CHARS: usize = 800;

    pub fn scenario_alert(preview: &str, truncated: bool, dashboard_url: &str) -> String {
        let ellipsis = if truncated { "..." } else { "" };
        format!(
            "🚨 *New Disaster Monitor Scenario* 🚨\n\n*Economic Recommendation:*\n{}{}\n\n[🔍 Check dashboard for full details]({})",
            preview, ellipsis, dashboard_url
        )
    }

    pub fn cycle_crashed(error: &str) -> String {
        format!(
            "🆘 CRITICAL ERROR in Disaster Monitor: {}. System may need attention.",
            error
        )
    }

    pub fn startup_failed(error: &str) -> String {
        format!(
            "🆘 CRITICAL STARTUP FAILURE for Disaster Monitor: {}. System is DOWN.",
            error
        )
    }
}

/// Timing defaults
pub mod timing {
    use super::*;

    pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 3600;

    /// Page fetch timeout (browser pages can be slow to settle)
    pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 90;

    pub const DEFAULT_STATS_TIMEOUT_SECS: u64 = 10;

    pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

    /// Settle time after navigation before the browser DOM is read
    pub const BROWSER_SETTLE: Duration = Duration::from_secs(5);
}

/// Logging event names for structured logging
pub mod events {
    pub const CYCLE_STARTED: &str = "cycle_started";
    pub const CYCLE_PERSISTED: &str = "cycle_persisted";
    pub const CYCLE_SKIPPED: &str = "cycle_skipped";
    pub const CYCLE_FAILED: &str = "cycle_failed";
    pub const CYCLE_CRASHED: &str = "cycle_crashed";
    pub const SOURCE_FAILED: &str = "source_failed";
    pub const ROLE_FAILED: &str = "role_failed";
}
