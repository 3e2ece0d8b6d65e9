//! Unit tests for the cycle orchestrator - synthesis, persistence and notification rules.

#[cfg(test)]
mod monitor_tests {
    use crate::agents::{AgentChainRunner, AgentOutput, InsightLedger, Role};
    use crate::bus::EventBus;
    use crate::config::{AppConfig, SourceConfig};
    use crate::data::fred::StatisticsSource;
    use crate::data::scraper::PageFetcher;
    use crate::data::store::{NewScenario, Scenario, ScenarioStore, SqliteScenarioStore};
    use crate::error::{GenerationError, NotifyError, StatsError, StoreError};
    use crate::events::CycleOutcome;
    use crate::llm::TextGenerator;
    use crate::services::aggregator::ContextAggregator;
    use crate::services::monitor::{scenario_alert, Cycle, Monitor, Synthesis};
    use crate::services::notifier::Notifier;
    use crate::services::supervisor::{Supervisor, SupervisorState};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // ============= Test doubles =============

    struct QuakeFetcher;

    #[async_trait]
    impl PageFetcher for QuakeFetcher {
        async fn fetch_text(&self, url: &str) -> String {
            if url.contains("usgs") {
                "Quake M6.2 detected".to_string()
            } else {
                String::new()
            }
        }
    }

    struct NoStats;

    #[async_trait]
    impl StatisticsSource for NoStats {
        async fn summarize(&self, _series_id: &str) -> Result<String, StatsError> {
            Err(StatsError::MissingApiKey)
        }
    }

    /// Replies per role (matched on the persona line); unknown roles get a generic answer.
    #[derive(Default)]
    struct RoleLlm {
        replies: HashMap<String, String>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl TextGenerator for RoleLlm {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            for role in &self.failing {
                if prompt.contains(&persona(role)) {
                    return Err(GenerationError::Other("model overloaded".into()));
                }
            }
            for (role, reply) in &self.replies {
                if prompt.contains(&persona(role)) {
                    return Ok(reply.clone());
                }
            }
            Ok("generic analysis".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.to_string());
            if self.fail {
                Err(NotifyError::Rejected {
                    status: 502,
                    body: "bad gateway".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    struct BrokenStore;

    impl ScenarioStore for BrokenStore {
        fn insert(&self, _scenario: &NewScenario) -> Result<i64, StoreError> {
            Err(StoreError::Poisoned)
        }
        fn recent(&self, _limit: usize) -> Result<Vec<Scenario>, StoreError> {
            Err(StoreError::Poisoned)
        }
        fn count(&self) -> Result<u64, StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    fn persona(role: &str) -> String {
        format!("You are the {} persona.", role)
    }

    fn roles(names: &[&str]) -> Vec<Role> {
        names.iter().map(|n| Role::new(*n, persona(n))).collect()
    }

    fn monitor(
        llm: RoleLlm,
        role_names: &[&str],
        store: Arc<dyn ScenarioStore>,
        notifier: Arc<RecordingNotifier>,
    ) -> Monitor {
        let aggregator = ContextAggregator::new(
            vec![
                SourceConfig {
                    name: "usgs".into(),
                    url: "https://usgs.example/".into(),
                },
                SourceConfig {
                    name: "nhc".into(),
                    url: "https://nhc.example/".into(),
                },
            ],
            vec!["GDP".into()],
            Arc::new(QuakeFetcher),
            Arc::new(NoStats),
            5,
        );
        Monitor::new(
            aggregator,
            AgentChainRunner::new(Arc::new(llm), "c"),
            roles(role_names),
            store,
            notifier,
            800,
            "https://dashboard.example/",
        )
    }

    fn replies(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ============= Synthesis Tests =============

    #[test]
    fn test_synthesis_uses_terminal_output() {
        let ledger = InsightLedger::new()
            .appended(AgentOutput::completed("a", "alpha"))
            .appended(AgentOutput::completed("c", "final call"));
        let synthesis = Synthesis::from_ledger(&ledger, "c");
        assert_eq!(synthesis.recommendation, "final call");
        assert!(synthesis.summary.contains("--- A ANALYSIS ---\nalpha"));
        assert!(synthesis.is_complete());
    }

    #[test]
    fn test_synthesis_marks_absent_terminal() {
        let ledger = InsightLedger::new().appended(AgentOutput::completed("a", "alpha"));
        let synthesis = Synthesis::from_ledger(&ledger, "c");
        assert_eq!(synthesis.recommendation, "No economic recommendation generated.");
        assert!(synthesis.is_complete());
    }

    #[test]
    fn test_synthesis_whitespace_recommendation_is_incomplete() {
        let ledger = InsightLedger::new()
            .appended(AgentOutput::completed("a", "alpha"))
            .appended(AgentOutput::completed("c", "  \n\t "));
        assert!(!Synthesis::from_ledger(&ledger, "c").is_complete());
    }

    #[test]
    fn test_synthesis_empty_ledger_is_incomplete() {
        assert!(!Synthesis::from_ledger(&InsightLedger::new(), "c").is_complete());
    }

    // ============= Alert Formatting Tests =============

    #[test]
    fn test_alert_preview_is_bounded() {
        let long = "r".repeat(2000);
        let alert = scenario_alert(&long, 800, "https://dash/");
        assert!(alert.contains(&format!("{}...", "r".repeat(800))));
        assert!(!alert.contains(&"r".repeat(801)));
        assert!(alert.contains("(https://dash/)"));
    }

    #[test]
    fn test_alert_short_recommendation_has_no_ellipsis() {
        let alert = scenario_alert("Buy gold", 800, "https://dash/");
        assert!(alert.contains("Buy gold\n"));
        assert!(!alert.contains("Buy gold..."));
    }

    // ============= run_once Tests =============

    #[tokio::test]
    async fn test_successful_cycle_persists_one_scenario() {
        let store = Arc::new(SqliteScenarioStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let llm = RoleLlm {
            replies: replies(&[("a", "A says"), ("b", "B says"), ("c", "Hedge with gold")]),
            ..Default::default()
        };
        let monitor = monitor(llm, &["a", "b", "c"], store.clone(), notifier.clone());

        let outcome = monitor.run_once().await;

        assert!(matches!(outcome, CycleOutcome::Persisted { .. }));
        assert_eq!(store.count().unwrap(), 1);
        let row = &store.recent(1).unwrap()[0];
        assert_eq!(row.recommendation, "Hedge with gold");
        let inputs: HashMap<String, String> = serde_json::from_str(&row.agent_inputs).unwrap();
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs["b"], "B says");

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Hedge with gold"));
    }

    #[tokio::test]
    async fn test_empty_recommendation_fails_without_persisting() {
        let store = Arc::new(SqliteScenarioStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let llm = RoleLlm {
            replies: replies(&[("c", "   ")]),
            ..Default::default()
        };
        let monitor = monitor(llm, &["a", "c"], store.clone(), notifier.clone());

        let outcome = monitor.run_once().await;

        assert!(matches!(outcome, CycleOutcome::Failed { .. }));
        assert_eq!(store.count().unwrap(), 0);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Critical Error"));
    }

    #[tokio::test]
    async fn test_no_roles_fails_without_persisting() {
        let store = Arc::new(SqliteScenarioStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let monitor = monitor(RoleLlm::default(), &[], store.clone(), notifier.clone());

        assert!(matches!(monitor.run_once().await, CycleOutcome::Failed { .. }));
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_still_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let llm = RoleLlm {
            replies: replies(&[("c", "Reduce airline exposure")]),
            ..Default::default()
        };
        let monitor = monitor(llm, &["a", "c"], Arc::new(BrokenStore), notifier.clone());

        let outcome = monitor.run_once().await;

        assert!(matches!(outcome, CycleOutcome::Skipped { .. }));
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Reduce airline exposure"));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_change_outcome() {
        let store = Arc::new(SqliteScenarioStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let monitor = monitor(RoleLlm::default(), &["a", "c"], store.clone(), notifier.clone());

        assert!(monitor.run_once().await.is_persisted());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_terminal_role_records_marker_as_recommendation() {
        let store = Arc::new(SqliteScenarioStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let llm = RoleLlm {
            failing: vec!["c".into()],
            ..Default::default()
        };
        let monitor = monitor(llm, &["a", "c"], store.clone(), notifier);

        assert!(monitor.run_once().await.is_persisted());
        let row = &store.recent(1).unwrap()[0];
        assert!(row.recommendation.starts_with("Error in c analysis"));
    }

    // ============= Startup Construction Tests =============

    /// Defaults with the database inside a fresh temp dir.
    fn startup_config(dir: &tempfile::TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.path = dir.path().join("data").join("monitor.db").display().to_string();
        config
    }

    /// A regular file standing where the database directory should be.
    fn blocked_database_path(dir: &tempfile::TempDir) -> String {
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"plain file").unwrap();
        blocker.join("monitor.db").display().to_string()
    }

    #[test]
    fn test_from_config_builds_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = startup_config(&dir);
        let notifier = Arc::new(RecordingNotifier::default());

        assert!(Monitor::from_config(&config, notifier).is_ok());
        assert!(dir.path().join("data").join("monitor.db").exists());
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_from_config_rejects_browser_mode_without_feature() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = startup_config(&dir);
        config.fetch.mode = crate::config::FetchMode::Browser;

        match Monitor::from_config(&config, Arc::new(RecordingNotifier::default())) {
            Err(e) => assert!(e.to_string().contains("requires building with the `browser` feature")),
            Ok(_) => panic!("browser mode must not build without the feature"),
        }
    }

    #[test]
    fn test_from_config_rejects_unopenable_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = startup_config(&dir);
        config.database.path = blocked_database_path(&dir);

        match Monitor::from_config(&config, Arc::new(RecordingNotifier::default())) {
            Err(e) => assert!(e.to_string().starts_with("Persistence error")),
            Ok(_) => panic!("database under a regular file must not open"),
        }
    }

    #[tokio::test]
    async fn test_construction_failure_is_fatal_for_supervisor() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = startup_config(&dir);
        config.database.path = blocked_database_path(&dir);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut supervisor: Supervisor<Monitor> =
            Supervisor::new(notifier.clone(), EventBus::new(16), Duration::from_millis(1));

        let booted = supervisor
            .boot(|| Monitor::from_config(&config, notifier.clone()))
            .await;

        assert!(booted.is_err());
        assert_eq!(supervisor.state(), SupervisorState::FatalExit);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("CRITICAL STARTUP FAILURE"));
        assert!(sent[0].contains("Persistence error"));
        drop(sent);

        assert!(supervisor.run_single().await.is_none());
    }
}
