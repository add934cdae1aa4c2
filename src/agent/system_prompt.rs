//! System prompt builder for one agent in the team.
//!
//! Layers (in order):
//! 1. Identity (internal name and description)
//! 2. Instruction (the agent's single responsibility)
//! 3. Delegation roster (only for agents with sub-agents)

use super::AgentDescriptor;
use crate::tools::TRANSFER_TOOL;
use tracing::debug;

/// Build the system prompt for the active agent.
pub fn build_system_prompt(agent: &AgentDescriptor) -> String {
    let mut prompt = String::with_capacity(2048);

    // Layer 1: Identity
    prompt.push_str(&format!(
        "You are an agent. Your internal name is \"{}\".",
        agent.name
    ));
    if !agent.description.is_empty() {
        prompt.push_str(&format!(
            " The description about you is \"{}\".",
            agent.description
        ));
    }
    prompt.push_str("\n\n");

    // Layer 2: Instruction
    prompt.push_str(&agent.instruction);
    prompt.push('\n');

    // Layer 3: Delegation roster
    if !agent.sub_agents.is_empty() {
        prompt.push_str("\n# Agents you can transfer to\n\n");
        for sub in &agent.sub_agents {
            prompt.push_str(&format!("- `{}`: {}\n", sub.name, sub.description));
        }
        prompt.push_str(&format!(
            "\nIf another agent is better suited to answer the user's request, call the \
             `{}` function with that agent's name. When transferring, do not generate any \
             text other than the function call.\n",
            TRANSFER_TOOL
        ));
    }

    debug!("System prompt for '{}': {} chars", agent.name, prompt.len());
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::team::{build_team, FAREWELL_AGENT, GREETING_AGENT};

    #[test]
    fn test_root_prompt_has_roster() {
        let root = build_team("gemini-2.0-flash").unwrap();
        let prompt = build_system_prompt(&root);

        assert!(prompt.starts_with("You are an agent. Your internal name is \"weather_agent_team\"."));
        assert!(prompt.contains(&root.instruction));
        assert!(prompt.contains(&format!("- `{}`:", GREETING_AGENT)));
        assert!(prompt.contains(&format!("- `{}`:", FAREWELL_AGENT)));
        assert!(prompt.contains(TRANSFER_TOOL));
    }

    #[test]
    fn test_leaf_prompt_has_no_roster() {
        let root = build_team("gemini-2.0-flash").unwrap();
        let greeter = root.sub_agent(GREETING_AGENT).unwrap();
        let prompt = build_system_prompt(greeter);

        assert!(prompt.contains("say_hello"));
        assert!(!prompt.contains(TRANSFER_TOOL));
    }
}
