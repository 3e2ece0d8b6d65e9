//! Custom error types for the monitoring system
//!
//! One enum per capability boundary, plus `MonitorError` for startup and
//! anything the supervisor has to report.

use thiserror::Error;

/// Top-level monitor errors
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Startup error: {0}")]
    Startup(String),
}

/// Errors raised while constructing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Missing critical environment variables: {}. Please check your .env file.", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Text generation failures (recovered per role by the chain runner)
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("LLM API error: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("LLM returned no content")]
    EmptyResponse,

    #[error("{0}")]
    Other(String),
}

/// Statistics lookups. The `Display` text is what ends up in the context.
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("FRED data not available (API key missing).")]
    MissingApiKey,

    #[error("Error fetching FRED data for {series}: {source}")]
    Http {
        series: String,
        source: reqwest::Error,
    },

    #[error("No recent observations found for {0}.")]
    NoObservations(String),
}

/// Scenario store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Notification delivery errors (always logged, never propagated past the orchestrator)
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notifier not configured")]
    Disabled,
}
