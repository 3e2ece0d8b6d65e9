//! Prompt assembly for role analyses.

/// Builds the prompt for one role: persona, the collected data, then every
/// earlier role's output verbatim.
pub fn agent_prompt(role_description: &str, context: &str, previous_insights: &str) -> String {
    let previous = if previous_insights.trim().is_empty() {
        "None yet. You are the first analyst in this cycle."
    } else {
        previous_insights
    };

    format!(
        r#"You are part of a disaster-monitoring team that assesses natural and space-weather events for their economic impact.

YOUR ROLE:
{role_description}

REAL-TIME DATA:
{context}

INSIGHTS FROM OTHER ANALYSTS:
{previous}

INSTRUCTIONS:
1. Analyze the data strictly from the perspective of your role.
2. Identify current or developing events that matter to your specialty.
3. Build on the other analysts' insights where relevant; flag disagreements.
4. Estimate likely economic and market consequences.
5. Be concise and concrete. If the data is missing or inconclusive, say so rather than guessing.
"#
    )
}
