use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::{agents, context, messages, timing};
use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RoleConfig {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Http,
    Browser,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_concurrent: usize,
    pub mode: FetchMode,
    pub timeout_secs: u64,
    pub max_text_chars: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: context::DEFAULT_MAX_CONCURRENT_FETCHES,
            mode: FetchMode::Http,
            timeout_secs: timing::DEFAULT_FETCH_TIMEOUT_SECS,
            max_text_chars: context::DEFAULT_MAX_TEXT_CHARS,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub base_url: String,
    pub series: Vec<String>,
    pub observations: usize,
    pub timeout_secs: u64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stlouisfed.org/fred".to_string(),
            series: vec!["GDP".into(), "FEDFUNDS".into(), "CPIAUCSL".into()],
            observations: 5,
            timeout_secs: timing::DEFAULT_STATS_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Hard cap on prompt length sent to the model; `None` sends everything
    pub max_prompt_chars: Option<usize>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: Some("https://generativelanguage.googleapis.com/v1beta/openai".to_string()),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.3,
            max_output_tokens: 2048,
            max_prompt_chars: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub preview_chars: usize,
    pub dashboard_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.telegram.org".to_string(),
            timeout_secs: timing::DEFAULT_NOTIFY_TIMEOUT_SECS,
            preview_chars: messages::DEFAULT_PREVIEW_CHARS,
            dashboard_url: "https://seusite.com/dashboard".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/disaster_monitor.db".to_string(),
        }
    }
}

/// Credentials read from the environment. Never printed.
#[derive(Clone, Default)]
pub struct Secrets {
    pub google_api_key: String,
    pub fred_api_key: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
}

impl Secrets {
    pub const REQUIRED: [&'static str; 4] = [
        "GOOGLE_API_KEY",
        "FRED_API_KEY",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
    ];

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds secrets from any key lookup; all missing keys are reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(Self::REQUIRED.len());
        let mut missing = Vec::new();
        for key in Self::REQUIRED {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(v) => values.push(v),
                None => {
                    missing.push(key.to_string());
                    values.push(String::new());
                }
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }

        let mut values = values.into_iter();
        Ok(Self {
            google_api_key: values.next().unwrap_or_default(),
            fred_api_key: values.next().unwrap_or_default(),
            telegram_bot_token: values.next().unwrap_or_default(),
            telegram_chat_id: values.next().unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |s: &str| if s.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("Secrets")
            .field("google_api_key", &mask(&self.google_api_key))
            .field("fred_api_key", &mask(&self.fred_api_key))
            .field("telegram_bot_token", &mask(&self.telegram_bot_token))
            .field("telegram_chat_id", &mask(&self.telegram_chat_id))
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cycle_interval_secs: u64,
    pub fetch: FetchConfig,
    pub sources: Vec<SourceConfig>,
    pub statistics: StatisticsConfig,
    pub roles: Vec<RoleConfig>,
    pub terminal_role: String,
    pub llm: LlmConfig,
    pub notify: NotifyConfig,
    pub database: DatabaseConfig,

    #[serde(skip)]
    pub secrets: Secrets,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: timing::DEFAULT_CYCLE_INTERVAL_SECS,
            fetch: FetchConfig::default(),
            sources: default_sources(),
            statistics: StatisticsConfig::default(),
            roles: default_roles(),
            terminal_role: agents::DEFAULT_TERMINAL_ROLE.to_string(),
            llm: LlmConfig::default(),
            notify: NotifyConfig::default(),
            database: DatabaseConfig::default(),
            secrets: Secrets::default(),
        }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.yaml";

    /// Reads the YAML file (built-in defaults when it does not exist), pulls
    /// secrets from the environment and validates the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.secrets = Secrets::from_env()?;
        config.validate()?;
        info!("Configuration loaded and validated.");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("{} not found, using built-in defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_interval_secs == 0 {
            return Err(ConfigError::Invalid("cycle_interval_secs must be > 0".into()));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(ConfigError::Invalid("fetch.max_concurrent must be > 0".into()));
        }
        if self.notify.preview_chars == 0 {
            return Err(ConfigError::Invalid("notify.preview_chars must be > 0".into()));
        }
        if self.statistics.series.is_empty() {
            return Err(ConfigError::Invalid("statistics.series must not be empty".into()));
        }
        if self.statistics.observations == 0 {
            return Err(ConfigError::Invalid("statistics.observations must be > 0".into()));
        }
        if self.roles.is_empty() {
            return Err(ConfigError::Invalid("roles must not be empty".into()));
        }
        if let Some(dup) = first_duplicate(self.sources.iter().map(|s| s.name.as_str())) {
            return Err(ConfigError::Invalid(format!("duplicate source name '{}'", dup)));
        }
        if let Some(dup) = first_duplicate(self.roles.iter().map(|r| r.name.as_str())) {
            return Err(ConfigError::Invalid(format!("duplicate role name '{}'", dup)));
        }
        if !self.roles.iter().any(|r| r.name == self.terminal_role) {
            warn!(
                "⚠️ Terminal role '{}' is not among the configured roles; recommendations will be empty markers",
                self.terminal_role
            );
        }
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}

fn default_sources() -> Vec<SourceConfig> {
    [
        (
            "earthquake_usgs",
            "https://earthquake.usgs.gov/earthquakes/map/?extent=-85.22099,-175.78125&extent=85.22099,-20.03906",
        ),
        ("noaa_hurricanes", "https://www.nhc.noaa.gov/"),
        ("noaa_weather_alerts", "https://www.weather.gov/alerts"),
        ("marketwatch_news", "https://www.marketwatch.com/latest-news"),
        ("investing_news", "https://www.investing.com/news/stock-market-news"),
    ]
    .into_iter()
    .map(|(name, url)| SourceConfig {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

fn default_roles() -> Vec<RoleConfig> {
    [
        (
            "climatologist",
            "Expert in atmospheric patterns, flood risks, and extreme weather, focusing on events with potential economic impact, especially in the Mississippi River Basin.",
        ),
        (
            "solar_specialist",
            "Expert in Coronal Mass Ejections (CME), solar flares, and their potential to disrupt communication, power grids, and financial systems.",
        ),
        (
            "seismologist",
            "Expert in earthquake risk, tectonic shifts, and real-time seismic alerts, assessing impact on infrastructure and economic activity.",
        ),
        (
            "insurance_analyst",
            "Models potential insurance claims, risk exposure, and reinsurance market impacts based on predicted disaster scenarios.",
        ),
        (
            "disaster_economist",
            "Evaluates macroeconomic impacts of disasters, predicts market reactions, supply chain disruptions, and likely central bank/government responses. Synthesizes all agent inputs into a final economic recommendation.",
        ),
    ]
    .into_iter()
    .map(|(name, description)| RoleConfig {
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}
