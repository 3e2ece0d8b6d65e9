//! One monitoring cycle: gather -> chain -> synthesize -> persist -> notify.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::agents::{AgentChainRunner, InsightLedger, Role};
use crate::config::AppConfig;
use crate::constants::{agents, events, messages};
use crate::data::build_fetcher;
use crate::data::fred::FredClient;
use crate::data::store::{NewScenario, ScenarioStore, SqliteScenarioStore};
use crate::error::{MonitorError, StoreError};
use crate::events::CycleOutcome;
use crate::llm::LLMClient;
use crate::services::aggregator::ContextAggregator;
use crate::services::notifier::{notify_best_effort, Notifier};
use crate::text::truncate_chars;

/// Anything the supervisor can run repeatedly.
#[async_trait]
pub trait Cycle: Send + Sync + 'static {
    async fn run_once(&self) -> CycleOutcome;
}

/// Summary and recommendation derived from a finished ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Synthesis {
    pub summary: String,
    pub recommendation: String,
}

impl Synthesis {
    pub fn from_ledger(ledger: &InsightLedger, terminal_role: &str) -> Self {
        let recommendation = ledger
            .get(terminal_role)
            .map(|entry| entry.text.clone())
            .unwrap_or_else(|| agents::NO_RECOMMENDATION.to_string());
        Self {
            summary: ledger.summary(),
            recommendation,
        }
    }

    /// Both parts must carry something other than whitespace to be stored.
    pub fn is_complete(&self) -> bool {
        !self.summary.trim().is_empty() && !self.recommendation.trim().is_empty()
    }
}

/// Notification body: bounded preview of the recommendation plus the dashboard link.
pub fn scenario_alert(recommendation: &str, preview_chars: usize, dashboard_url: &str) -> String {
    let preview = truncate_chars(recommendation, preview_chars);
    messages::scenario_alert(preview, preview.len() < recommendation.len(), dashboard_url)
}

pub struct Monitor {
    aggregator: ContextAggregator,
    chain: AgentChainRunner,
    roles: Vec<Role>,
    store: Arc<dyn ScenarioStore>,
    notifier: Arc<dyn Notifier>,
    preview_chars: usize,
    dashboard_url: String,
}

impl Monitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        aggregator: ContextAggregator,
        chain: AgentChainRunner,
        roles: Vec<Role>,
        store: Arc<dyn ScenarioStore>,
        notifier: Arc<dyn Notifier>,
        preview_chars: usize,
        dashboard_url: impl Into<String>,
    ) -> Self {
        Self {
            aggregator,
            chain,
            roles,
            store,
            notifier,
            preview_chars,
            dashboard_url: dashboard_url.into(),
        }
    }

    /// Builds every capability from configuration. Any failure here is a
    /// startup failure.
    pub fn from_config(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self, MonitorError> {
        let fetcher = build_fetcher(config)?;
        let stats = Arc::new(FredClient::new(
            &config.statistics,
            config.secrets.fred_api_key.clone(),
        )?);
        let aggregator = ContextAggregator::new(
            config.sources.clone(),
            config.statistics.series.clone(),
            fetcher,
            stats,
            config.fetch.max_concurrent,
        );

        let llm = Arc::new(LLMClient::new(config.secrets.google_api_key.clone(), &config.llm));
        info!("Using LLM Model: {}", llm.model);
        let chain = AgentChainRunner::new(llm, config.terminal_role.clone());

        let store = Arc::new(SqliteScenarioStore::open(Path::new(&config.database.path))?);

        Ok(Self::new(
            aggregator,
            chain,
            config.roles.iter().map(Role::from).collect(),
            store,
            notifier,
            config.notify.preview_chars,
            config.notify.dashboard_url.clone(),
        ))
    }

    /// Insert runs on the blocking pool; SQLite calls are synchronous.
    async fn persist(&self, scenario: NewScenario) -> Result<i64, StoreError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.insert(&scenario))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?
    }
}

#[async_trait]
impl Cycle for Monitor {
    async fn run_once(&self) -> CycleOutcome {
        info!("🛰️ [MONITOR] Starting new monitoring cycle...");

        let context = self.aggregator.gather().await;
        if context.is_effectively_empty() {
            // proceed anyway: a data outage must not silence monitoring
            warn!("⚠️ [MONITOR] Initial context is empty or minimal. Cycle might be ineffective.");
        }

        let ledger = self.chain.run(&self.roles, &context).await;
        let synthesis = Synthesis::from_ledger(&ledger, self.chain.terminal_role());

        if !synthesis.is_complete() {
            error!(
                event = events::CYCLE_FAILED,
                "❌ [MONITOR] Failed to generate a comprehensive summary or recommendation."
            );
            notify_best_effort(self.notifier.as_ref(), messages::SYNTHESIS_FAILED).await;
            return CycleOutcome::Failed {
                reason: "summary or recommendation empty".to_string(),
            };
        }

        let stored = match ledger.to_agent_inputs_json() {
            Ok(agent_inputs) => {
                self.persist(NewScenario {
                    summary: synthesis.summary.clone(),
                    recommendation: synthesis.recommendation.clone(),
                    agent_inputs,
                })
                .await
            }
            Err(e) => Err(StoreError::from(e)),
        };

        let outcome = match stored {
            Ok(scenario_id) => {
                info!(event = events::CYCLE_PERSISTED, "🗄️ [MONITOR] Scenario {} stored", scenario_id);
                CycleOutcome::Persisted { scenario_id }
            }
            Err(e) => {
                error!(
                    event = events::CYCLE_SKIPPED,
                    "❌ [MONITOR] Failed to store scenario in database: {}",
                    e
                );
                CycleOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };

        // sent even when the write failed, from the in-memory recommendation
        let alert = scenario_alert(&synthesis.recommendation, self.preview_chars, &self.dashboard_url);
        notify_best_effort(self.notifier.as_ref(), &alert).await;

        info!("🛰️ [MONITOR] Monitoring cycle complete ({})", outcome.label());
        outcome
    }
}
