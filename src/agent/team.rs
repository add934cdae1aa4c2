//! The weather agent team: a coordinator plus greeting and farewell specialists.

use tracing::{error, info};

use super::AgentDescriptor;
use crate::tools::{CurrentTimeTool, GoodbyeTool, HelloTool, WeatherTool};

pub const GREETING_AGENT: &str = "greeting_agent";
pub const FAREWELL_AGENT: &str = "farewell_agent";
pub const ROOT_AGENT: &str = "weather_agent_team";

const GREETING_INSTRUCTION: &str = "You are the Greeting Agent. Your ONLY task is to provide a \
friendly greeting to the user. Use the 'say_hello' tool to generate the greeting. If the user \
provides their name, make sure to pass it to the tool. Do not engage in any other conversation \
or tasks.";

const FAREWELL_INSTRUCTION: &str = "You are the Farewell Agent. Your ONLY task is to provide a \
polite goodbye message. Use the 'say_goodbye' tool when the user indicates they are leaving or \
ending the conversation (e.g., using words like 'bye', 'goodbye', 'thanks bye', 'see you'). Do \
not perform any other actions.";

const ROOT_INSTRUCTION: &str = "You are the main Weather Agent coordinating a team. Your primary \
responsibility is to provide weather information. Use the 'get_weather' tool ONLY for specific \
weather requests (e.g., 'weather in London'). Use the 'get_current_time' tool ONLY for requests \
about the current time in a city. You have specialized sub-agents: \
1. 'greeting_agent': Handles simple greetings like 'Hi', 'Hello'. Delegate to it for these. \
2. 'farewell_agent': Handles simple farewells like 'Bye', 'See you'. Delegate to it for these. \
Analyze the user's query. If it's a greeting, delegate to 'greeting_agent'. If it's a farewell, \
delegate to 'farewell_agent'. If it's a weather or time request, handle it yourself using your \
tools. For anything else, respond appropriately or state you cannot handle it.";

/// Create the greeting specialist. Logs and returns `None` on failure.
pub fn create_greeting_agent(model: &str) -> Option<AgentDescriptor> {
    let built = AgentDescriptor::builder(GREETING_AGENT)
        .model(model)
        .instruction(GREETING_INSTRUCTION)
        .description("Handles simple greetings and hellos using the 'say_hello' tool.")
        .tool(HelloTool)
        .build();

    match built {
        Ok(agent) => {
            info!("Agent '{}' created using model '{}'", agent.name, agent.model);
            Some(agent)
        }
        Err(e) => {
            error!("Could not create Greeting agent: {}", e);
            None
        }
    }
}

/// Create the farewell specialist. Logs and returns `None` on failure.
pub fn create_farewell_agent(model: &str) -> Option<AgentDescriptor> {
    let built = AgentDescriptor::builder(FAREWELL_AGENT)
        .model(model)
        .instruction(FAREWELL_INSTRUCTION)
        .description("Handles simple farewells and goodbyes using the 'say_goodbye' tool.")
        .tool(GoodbyeTool)
        .build();

    match built {
        Ok(agent) => {
            info!("Agent '{}' created using model '{}'", agent.name, agent.model);
            Some(agent)
        }
        Err(e) => {
            error!("Could not create Farewell agent: {}", e);
            None
        }
    }
}

/// Create the coordinator over both specialists.
///
/// Returns `None` without attempting construction when either specialist is
/// missing, so a half-built team is never handed to the runner.
pub fn create_root_agent(
    model: &str,
    greeting_agent: Option<AgentDescriptor>,
    farewell_agent: Option<AgentDescriptor>,
) -> Option<AgentDescriptor> {
    let (Some(greeting_agent), Some(farewell_agent)) = (greeting_agent, farewell_agent) else {
        error!("Cannot create root agent because one or more sub-agents are missing.");
        return None;
    };

    let built = AgentDescriptor::builder(ROOT_AGENT)
        .model(model)
        .instruction(ROOT_INSTRUCTION)
        .description(
            "The main coordinator agent. Handles weather requests and delegates \
             greetings/farewells to specialists.",
        )
        .tool(WeatherTool)
        .tool(CurrentTimeTool)
        .sub_agent(greeting_agent)
        .sub_agent(farewell_agent)
        .build();

    match built {
        Ok(agent) => {
            info!(
                "Root agent '{}' created with sub-agents: {:?}",
                agent.name,
                agent.sub_agent_names()
            );
            Some(agent)
        }
        Err(e) => {
            error!("Could not create Root agent: {}", e);
            None
        }
    }
}

/// Build the whole team for one model.
pub fn build_team(model: &str) -> Option<AgentDescriptor> {
    let greeting = create_greeting_agent(model);
    let farewell = create_farewell_agent(model);
    create_root_agent(model, greeting, farewell)
}
