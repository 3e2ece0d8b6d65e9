//! Continuous monitoring loop with crash isolation.
//!
//! State machine: Idle -> Running -> Sleeping -> Running ... ; Idle -> FatalExit
//! only when the cycle cannot be constructed. A cycle that panics is reported
//! and the loop carries on after the normal sleep.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::bus::EventBus;
use crate::constants::{events, messages};
use crate::error::MonitorError;
use crate::events::{CycleOutcome, CycleReport, Event};
use crate::services::monitor::Cycle;
use crate::services::notifier::{notify_best_effort, Notifier};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    Sleeping,
    FatalExit,
}

pub struct Supervisor<C: Cycle> {
    cycle: Option<Arc<C>>,
    notifier: Arc<dyn Notifier>,
    bus: EventBus,
    interval: Duration,
    state: SupervisorState,
    cycles_run: u64,
}

impl<C: Cycle> Supervisor<C> {
    pub fn new(notifier: Arc<dyn Notifier>, bus: EventBus, interval: Duration) -> Self {
        Self {
            cycle: None,
            notifier,
            bus,
            interval,
            state: SupervisorState::Idle,
            cycles_run: 0,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Constructs the cycle. On failure the supervisor is finished: it reports
    /// the startup failure and moves to `FatalExit`.
    pub async fn boot<F>(&mut self, build: F) -> Result<(), MonitorError>
    where
        F: FnOnce() -> Result<C, MonitorError>,
    {
        match build() {
            Ok(cycle) => {
                self.cycle = Some(Arc::new(cycle));
                info!("🚀 [SUPERVISOR] Intelligent Disaster Monitor starting continuous monitoring...");
                notify_best_effort(self.notifier.as_ref(), messages::ACTIVATED).await;
                Ok(())
            }
            Err(e) => {
                error!("🆘 [SUPERVISOR] CRITICAL: Failed to initialize monitor: {}", e);
                self.transition(SupervisorState::FatalExit);
                notify_best_effort(self.notifier.as_ref(), &messages::startup_failed(&e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    /// Runs until the process is stopped. Returns immediately if boot failed.
    pub async fn run_forever(&mut self) {
        while self.ready() {
            self.tick().await;
        }
    }

    /// Runs exactly `n` cycles (each followed by the interval sleep).
    pub async fn run_cycles(&mut self, n: u64) -> Vec<Option<CycleReport>> {
        let mut reports = Vec::new();
        for _ in 0..n {
            if !self.ready() {
                break;
            }
            reports.push(self.tick().await);
        }
        reports
    }

    /// Runs one cycle without the trailing sleep.
    pub async fn run_single(&mut self) -> Option<CycleReport> {
        if !self.ready() {
            return None;
        }
        let report = self.execute().await;
        self.transition(SupervisorState::Idle);
        report
    }

    fn ready(&self) -> bool {
        self.state != SupervisorState::FatalExit && self.cycle.is_some()
    }

    fn transition(&mut self, next: SupervisorState) {
        tracing::debug!("[SUPERVISOR] {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn tick(&mut self) -> Option<CycleReport> {
        let report = self.execute().await;
        self.transition(SupervisorState::Sleeping);
        info!(
            "⏳ [SUPERVISOR] Next monitoring cycle in {} seconds.",
            self.interval.as_secs()
        );
        tokio::time::sleep(self.interval).await;
        report
    }

    /// One supervised cycle. `None` means the cycle crashed.
    async fn execute(&mut self) -> Option<CycleReport> {
        let cycle = self.cycle.clone()?;
        self.transition(SupervisorState::Running);
        self.cycles_run += 1;
        let n = self.cycles_run;
        let cycle_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(event = events::CYCLE_STARTED, "🔁 [SUPERVISOR] Cycle {} ({}) starting", n, cycle_id);
        let _ = self.bus.publish(Event::CycleStarted { cycle: n, cycle_id });

        // own task: a panic inside the cycle surfaces as a JoinError here
        let span = tracing::info_span!("cycle", n, id = %cycle_id);
        let joined = tokio::spawn(async move { cycle.run_once().await }.instrument(span)).await;

        match joined {
            Ok(outcome) => {
                let report = CycleReport {
                    cycle: n,
                    cycle_id,
                    started_at,
                    finished_at: Utc::now(),
                    outcome,
                };
                if let CycleOutcome::Failed { reason } = &report.outcome {
                    info!("[SUPERVISOR] Cycle {} failed: {}", n, reason);
                }
                let _ = self.bus.publish(Event::CycleFinished(report.clone()));
                Some(report)
            }
            Err(e) => {
                let error = if e.is_panic() {
                    format!("cycle panicked: {}", panic_message(e.into_panic()))
                } else {
                    e.to_string()
                };
                error!(
                    event = events::CYCLE_CRASHED,
                    "🆘 [SUPERVISOR] CRITICAL error in monitoring loop: {}",
                    error
                );
                notify_best_effort(self.notifier.as_ref(), &messages::cycle_crashed(&error)).await;
                let _ = self.bus.publish(Event::CycleCrashed {
                    cycle: n,
                    cycle_id,
                    error,
                });
                None
            }
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
