use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How a single monitoring cycle ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Scenario written; id assigned by the store
    Persisted { scenario_id: i64 },
    /// Synthesis succeeded but the store rejected the write (notification still sent)
    Skipped { reason: String },
    /// Summary or recommendation empty; nothing written
    Failed { reason: String },
}

impl CycleOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, CycleOutcome::Persisted { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Persisted { .. } => "persisted",
            CycleOutcome::Skipped { .. } => "skipped",
            CycleOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: CycleOutcome,
}

// Global Event Enum
#[derive(Clone, Debug)]
pub enum Event {
    CycleStarted { cycle: u64, cycle_id: Uuid },
    CycleFinished(CycleReport),
    /// The cycle escaped its own error handling (panicked); the loop keeps going
    CycleCrashed {
        cycle: u64,
        cycle_id: Uuid,
        error: String,
    },
}
