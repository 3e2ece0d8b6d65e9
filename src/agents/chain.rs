use std::sync::Arc;
use tracing::{info, warn};

use super::{Agent, InsightLedger, Role};
use crate::llm::TextGenerator;
use crate::services::aggregator::AggregatedContext;

/// Moves the terminal role to the end, keeping every other role in declared
/// order. Applying it twice gives the same order.
pub fn order_roles(roles: &[Role], terminal_role: &str) -> Vec<Role> {
    let (terminal, mut ordered): (Vec<Role>, Vec<Role>) = roles
        .iter()
        .cloned()
        .partition(|role| role.name == terminal_role);
    ordered.extend(terminal);
    ordered
}

/// Runs roles one after another, threading each output into the next prompt.
pub struct AgentChainRunner {
    llm: Arc<dyn TextGenerator>,
    terminal_role: String,
}

impl AgentChainRunner {
    pub fn new(llm: Arc<dyn TextGenerator>, terminal_role: impl Into<String>) -> Self {
        Self {
            llm,
            terminal_role: terminal_role.into(),
        }
    }

    pub fn terminal_role(&self) -> &str {
        &self.terminal_role
    }

    /// Strictly sequential: role N's prompt depends on roles 1..N-1.
    pub async fn run(&self, roles: &[Role], context: &AggregatedContext) -> InsightLedger {
        let order = order_roles(roles, &self.terminal_role);
        if !order.iter().any(|r| r.name == self.terminal_role) {
            warn!(
                "⚠️ [CHAIN] Terminal role '{}' not configured; no synthesis step this cycle",
                self.terminal_role
            );
        }

        info!(
            "🔗 [CHAIN] Running {} roles: {}",
            order.len(),
            order.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(" -> ")
        );

        let mut ledger = InsightLedger::new();
        for role in &order {
            let output = role.run(context.as_str(), &ledger, self.llm.as_ref()).await;
            ledger = ledger.appended(output);
        }

        info!(
            "🔗 [CHAIN] Chain complete ({} entries, {} failed)",
            ledger.len(),
            ledger.failures()
        );
        ledger
    }
}
