use clap::Parser;
use disaster_monitor::cli::Args;
use disaster_monitor::config::AppConfig;
use disaster_monitor::constants::messages;
use disaster_monitor::services::monitor::Monitor;
use disaster_monitor::services::notifier::{notify_best_effort, Notifier, TelegramNotifier};
use disaster_monitor::services::supervisor::Supervisor;
use disaster_monitor::{EventBus, MonitorError};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Setup Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Intelligent Disaster Monitor...");

    // Load Configuration
    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("🆘 [CONFIG] {}", e);
            if let Some(notifier) = TelegramNotifier::from_env_best_effort() {
                notify_best_effort(&notifier, &messages::startup_failed(&e.to_string())).await;
            }
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Loaded Configuration: {} sources, {} roles, every {}s",
        config.sources.len(),
        config.roles.len(),
        config.cycle_interval_secs
    );

    let notifier: Arc<dyn Notifier> = match TelegramNotifier::new(&config.notify, &config.secrets) {
        Ok(n) => Arc::new(n),
        Err(e) => {
            let err = MonitorError::Startup(format!("Telegram client could not be built: {}", e));
            error!("🆘 [NOTIFY] CRITICAL: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let bus = EventBus::new(100);
    let mut supervisor = Supervisor::new(notifier.clone(), bus, config.cycle_interval());
    if supervisor
        .boot(|| Monitor::from_config(&config, notifier.clone()))
        .await
        .is_err()
    {
        return ExitCode::FAILURE;
    }

    if args.once {
        match supervisor.run_single().await {
            Some(report) => info!("Single cycle finished: {}", report.outcome.label()),
            None => warn!("Single cycle crashed"),
        }
        return ExitCode::SUCCESS;
    }

    tokio::select! {
        _ = supervisor.run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown signal received, stopping monitor.");
        }
    }

    ExitCode::SUCCESS
}
