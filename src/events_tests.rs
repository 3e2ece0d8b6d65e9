//! Unit tests for cycle event types.

#[cfg(test)]
mod events_tests {
    use crate::events::{CycleOutcome, Event};
    use uuid::Uuid;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(CycleOutcome::Persisted { scenario_id: 1 }.label(), "persisted");
        assert_eq!(CycleOutcome::Skipped { reason: "db".into() }.label(), "skipped");
        assert_eq!(CycleOutcome::Failed { reason: "empty".into() }.label(), "failed");
    }

    #[test]
    fn test_only_persisted_counts_as_persisted() {
        assert!(CycleOutcome::Persisted { scenario_id: 1 }.is_persisted());
        assert!(!CycleOutcome::Skipped { reason: String::new() }.is_persisted());
        assert!(!CycleOutcome::Failed { reason: String::new() }.is_persisted());
    }

    #[test]
    fn test_event_clone_preserves_payload() {
        let id = Uuid::new_v4();
        let event = Event::CycleCrashed {
            cycle: 4,
            cycle_id: id,
            error: "panicked".into(),
        };
        match event.clone() {
            Event::CycleCrashed { cycle, cycle_id, error } => {
                assert_eq!(cycle, 4);
                assert_eq!(cycle_id, id);
                assert_eq!(error, "panicked");
            }
            _ => panic!("Expected CycleCrashed"),
        }
    }
}
