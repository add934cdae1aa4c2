//! Agent descriptors: read-only configuration for one agent in the team.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AgentBuildError;
use crate::tools::{Tool, ToolSet};

/// Author name reserved for user events in the session.
pub const USER_AUTHOR: &str = "user";

/// Declarative configuration of one agent: what it is told to do, what it
/// may call, and which agents it may hand off to.
#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    pub name: String,
    pub model: String,
    pub instruction: String,
    pub description: String,
    pub tools: ToolSet,
    pub sub_agents: Vec<Arc<AgentDescriptor>>,
}

impl AgentDescriptor {
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder {
            name: name.into(),
            model: String::new(),
            instruction: String::new(),
            description: String::new(),
            tools: ToolSet::new(),
            sub_agents: Vec::new(),
        }
    }

    /// Direct sub-agent with the given name.
    pub fn sub_agent(&self, name: &str) -> Option<&Arc<AgentDescriptor>> {
        self.sub_agents.iter().find(|a| a.name == name)
    }

    pub fn sub_agent_names(&self) -> Vec<&str> {
        self.sub_agents.iter().map(|a| a.name.as_str()).collect()
    }

    /// Depth-first search of the tree rooted here.
    pub fn find_agent(&self, name: &str) -> Option<&AgentDescriptor> {
        if self.name == name {
            return Some(self);
        }
        self.sub_agents.iter().find_map(|a| a.find_agent(name))
    }

    fn collect_names<'a>(&'a self, seen: &mut HashSet<&'a str>) -> Result<(), AgentBuildError> {
        if !seen.insert(self.name.as_str()) {
            return Err(AgentBuildError::DuplicateAgentName(self.name.clone()));
        }
        for sub in &self.sub_agents {
            sub.collect_names(seen)?;
        }
        Ok(())
    }
}

/// Builder returned by [`AgentDescriptor::builder`].
pub struct AgentBuilder {
    name: String,
    model: String,
    instruction: String,
    description: String,
    tools: ToolSet,
    sub_agents: Vec<Arc<AgentDescriptor>>,
}

impl AgentBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools = self.tools.with(tool);
        self
    }

    pub fn tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn sub_agent(mut self, agent: AgentDescriptor) -> Self {
        self.sub_agents.push(Arc::new(agent));
        self
    }

    /// Validate and produce the descriptor.
    pub fn build(self) -> Result<AgentDescriptor, AgentBuildError> {
        if !is_identifier(&self.name) {
            return Err(AgentBuildError::InvalidName(self.name));
        }
        if self.name == USER_AUTHOR {
            return Err(AgentBuildError::ReservedName(self.name));
        }
        if !is_model_identifier(&self.model) {
            return Err(AgentBuildError::InvalidModel {
                agent: self.name,
                model: self.model,
            });
        }
        if self.instruction.trim().is_empty() {
            return Err(AgentBuildError::EmptyInstruction(self.name));
        }

        let mut tool_names = HashSet::new();
        for name in self.tools.names() {
            if !tool_names.insert(name) {
                return Err(AgentBuildError::DuplicateTool {
                    agent: self.name.clone(),
                    tool: name.to_string(),
                });
            }
        }

        let agent = AgentDescriptor {
            name: self.name,
            model: self.model,
            instruction: self.instruction,
            description: self.description,
            tools: self.tools,
            sub_agents: self.sub_agents,
        };
        agent.collect_names(&mut HashSet::new())?;
        Ok(agent)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_model_identifier(model: &str) -> bool {
    !model.is_empty()
        && model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '/' | '-'))
}
