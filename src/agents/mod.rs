pub mod chain;
pub mod ledger;
pub mod prompts;

use crate::config::RoleConfig;
use crate::constants::agents::error_marker;
use crate::llm::TextGenerator;

pub use chain::{order_roles, AgentChainRunner};
pub use ledger::{AgentOutput, InsightLedger};

use tracing::{error, info};

pub trait Agent {
    fn name(&self) -> &str;
    fn system_prompt(&self) -> &str;

    /// Run one analysis step. Generation failures become an error-marker output
    /// so the ledger always carries an entry for this agent.
    async fn run(&self, context: &str, ledger: &InsightLedger, llm: &dyn TextGenerator) -> AgentOutput {
        info!("🤖 [AGENT] Running analysis for {}", self.name());
        let prompt = prompts::agent_prompt(self.system_prompt(), context, &ledger.render_history());

        match llm.generate(&prompt).await {
            Ok(text) => {
                info!("🤖 [AGENT] Analysis received from {} ({} chars)", self.name(), text.len());
                AgentOutput::completed(self.name(), text)
            }
            Err(e) => {
                error!(
                    event = crate::constants::events::ROLE_FAILED,
                    "❌ [AGENT] Error running agent {}: {}",
                    self.name(),
                    e
                );
                AgentOutput::failed(self.name(), error_marker(self.name(), &e.to_string()))
            }
        }
    }
}

/// A configured persona: name plus the capability description that shapes its prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub description: String,
}

impl Role {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<&RoleConfig> for Role {
    fn from(config: &RoleConfig) -> Self {
        Role::new(config.name.clone(), config.description.clone())
    }
}

impl Agent for Role {
    fn name(&self) -> &str {
        &self.name
    }

    fn system_prompt(&self) -> &str {
        &self.description
    }
}
