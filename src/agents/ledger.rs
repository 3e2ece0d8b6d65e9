use serde_json::{Map, Value};

/// One role's contribution to a cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentOutput {
    pub role: String,
    pub text: String,
    /// True when `text` is an error marker rather than model output
    pub failed: bool,
}

impl AgentOutput {
    pub fn completed(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
            failed: false,
        }
    }

    pub fn failed(role: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: marker.into(),
            failed: true,
        }
    }
}

/// Ordered record of every role's output within one cycle.
///
/// Appending consumes the ledger and hands back a new one, so each chain step
/// sees exactly the entries that came before it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsightLedger {
    entries: Vec<AgentOutput>,
}

impl InsightLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn appended(mut self, output: AgentOutput) -> Self {
        self.entries.push(output);
        self
    }

    pub fn entries(&self) -> &[AgentOutput] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, role: &str) -> Option<&AgentOutput> {
        self.entries.iter().find(|e| e.role == role)
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.failed).count()
    }

    /// History block shown to the next role in the chain.
    pub fn render_history(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("\n--- Insights from {} ---\n{}\n", e.role, e.text))
            .collect()
    }

    /// Per-role labeled concatenation of every output.
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("--- {} ANALYSIS ---\n{}\n", e.role.to_uppercase(), e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pretty-printed JSON object of role name -> text, in chain order.
    pub fn to_agent_inputs_json(&self) -> Result<String, serde_json::Error> {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.role.clone(), Value::String(e.text.clone())))
            .collect();
        serde_json::to_string_pretty(&Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample() -> InsightLedger {
        InsightLedger::new()
            .appended(AgentOutput::completed("seismologist", "M6.2 near coast"))
            .appended(AgentOutput::failed("solar_specialist", "Error in solar_specialist analysis: timeout"))
            .appended(AgentOutput::completed("disaster_economist", "Hedge shipping exposure"))
    }

    #[test]
    fn test_appended_keeps_order() {
        let ledger = sample();
        let roles: Vec<_> = ledger.entries().iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, vec!["seismologist", "solar_specialist", "disaster_economist"]);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.failures(), 1);
    }

    #[test]
    fn test_empty_ledger_renders_nothing() {
        let ledger = InsightLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.render_history(), "");
        assert_eq!(ledger.summary(), "");
    }

    #[test]
    fn test_history_is_verbatim() {
        let history = sample().render_history();
        assert!(history.contains("--- Insights from seismologist ---\nM6.2 near coast\n"));
        assert!(history.contains("Error in solar_specialist analysis: timeout"));
    }

    #[test]
    fn test_summary_labels_each_role() {
        let summary = sample().summary();
        assert!(summary.starts_with("--- SEISMOLOGIST ANALYSIS ---\nM6.2 near coast\n"));
        assert!(summary.contains("--- DISASTER_ECONOMIST ANALYSIS ---\nHedge shipping exposure"));
    }

    #[test]
    fn test_agent_inputs_json_has_one_entry_per_role_in_order() {
        let json = sample().to_agent_inputs_json().unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed["disaster_economist"], "Hedge shipping exposure");

        // pretty-printed and order-preserving
        assert!(json.contains('\n'));
        assert!(json.find("seismologist").unwrap() < json.find("disaster_economist").unwrap());
    }
}
