use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

use crate::config::StatisticsConfig;
use crate::error::StatsError;

/// "Summarize a statistical series". The error's `Display` is the
/// explanatory string that stands in for the data.
#[async_trait]
pub trait StatisticsSource: Send + Sync {
    async fn summarize(&self, series_id: &str) -> Result<String, StatsError>;
}

#[derive(Deserialize, Debug, Clone)]
pub struct Observation {
    pub date: String,
    pub value: String,
}

#[derive(Deserialize, Debug, Default)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

/// Formats newest-first observations for the model to read.
pub fn format_observations(series_id: &str, observations: &[Observation]) -> Option<String> {
    if observations.is_empty() {
        return None;
    }
    let formatted: Vec<String> = observations
        .iter()
        .map(|obs| format!("{}: {}", obs.date, obs.value))
        .collect();
    Some(format!(
        "Recent {} observations: {}",
        series_id,
        formatted.join("; ")
    ))
}

#[derive(Clone)]
pub struct FredClient {
    client: Client,
    base_url: String,
    api_key: String,
    limit: usize,
}

impl FredClient {
    pub fn new(config: &StatisticsConfig, api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            limit: config.observations,
        })
    }

    pub async fn get_observations(&self, series_id: &str) -> Result<Vec<Observation>, reqwest::Error> {
        let url = format!("{}/series/observations", self.base_url);
        let limit = self.limit.to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let data: ObservationsResponse = resp.json().await?;
        Ok(data.observations)
    }
}

#[async_trait]
impl StatisticsSource for FredClient {
    async fn summarize(&self, series_id: &str) -> Result<String, StatsError> {
        if self.api_key.is_empty() {
            return Err(StatsError::MissingApiKey);
        }

        let observations = self.get_observations(series_id).await.map_err(|source| {
            // the request URL carries the api key
            let source = source.without_url();
            error!("❌ [FRED] Error fetching data for {}: {}", series_id, source);
            StatsError::Http {
                series: series_id.to_string(),
                source,
            }
        })?;

        info!("📊 [FRED] Fetched {} observations for {}", observations.len(), series_id);
        format_observations(series_id, &observations)
            .ok_or_else(|| StatsError::NoObservations(series_id.to_string()))
    }
}
