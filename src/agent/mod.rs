pub mod context;
pub mod descriptor;
pub mod system_prompt;
pub mod team;

pub use descriptor::{AgentBuilder, AgentDescriptor, USER_AUTHOR};
pub use team::{build_team, create_farewell_agent, create_greeting_agent, create_root_agent};
