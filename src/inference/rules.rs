//! Offline decision engine driven by keyword rules.
//!
//! Deterministic stand-in for the remote model: it recognizes weather, time,
//! farewell and greeting utterances, runs the matching tool when the active
//! agent owns it, and otherwise transfers to the sub-agent that does.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{Decision, DecisionEngine, DecisionRequest, InferenceError};
use crate::agent::AgentDescriptor;
use crate::types::{ChatRole, ToolCall, ToolValue};

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "hiya", "howdy", "greetings"];
const GREETING_PHRASES: &[&str] = &["good morning", "good afternoon", "good evening"];
const FAREWELL_WORDS: &[&str] = &["bye", "goodbye", "farewell"];
const FAREWELL_PHRASES: &[&str] = &["see you", "see ya", "good night"];
const NAME_MARKERS: &[&str] = &["my name is ", "i'm ", "i am ", "this is "];
const TRAILING_FILLERS: &[&str] = &[" right now", " today", " now"];

/// What the user is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Weather { city: Option<String> },
    Time { city: Option<String> },
    Farewell,
    Greeting { name: Option<String> },
    Other,
}

impl Intent {
    /// Tool that serves this intent, with its arguments.
    fn tool_call(&self) -> Option<(&'static str, serde_json::Value)> {
        match self {
            Self::Weather { city: Some(city) } => Some(("get_weather", json!({ "city": city }))),
            Self::Time { city: Some(city) } => Some(("get_current_time", json!({ "city": city }))),
            Self::Farewell => Some(("say_goodbye", json!({}))),
            Self::Greeting { name: Some(name) } => Some(("say_hello", json!({ "name": name }))),
            Self::Greeting { name: None } => Some(("say_hello", json!({}))),
            _ => None,
        }
    }
}

/// Classify an utterance by keyword.
pub fn classify(utterance: &str) -> Intent {
    let lower = utterance.to_ascii_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect();
    let has_word = |set: &[&str]| words.iter().any(|w| set.contains(w));
    let has_phrase = |set: &[&str]| set.iter().any(|p| lower.contains(p));

    if words.contains(&"weather") {
        Intent::Weather {
            city: extract_city(utterance),
        }
    } else if words.contains(&"time") {
        Intent::Time {
            city: extract_city(utterance),
        }
    } else if has_word(FAREWELL_WORDS) || has_phrase(FAREWELL_PHRASES) {
        Intent::Farewell
    } else if has_word(GREETING_WORDS) || has_phrase(GREETING_PHRASES) {
        Intent::Greeting {
            name: extract_name(utterance),
        }
    } else {
        Intent::Other
    }
}

fn trim_punctuation(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '\''))
}

/// City named after the last " in ", e.g. "weather in New York?" → "New York".
fn extract_city(utterance: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets aligned with the original.
    let lower = utterance.to_ascii_lowercase();
    let idx = lower.rfind(" in ")?;
    let mut city = trim_punctuation(&utterance[idx + 4..]);

    for filler in TRAILING_FILLERS {
        let lower_city = city.to_ascii_lowercase();
        if lower_city.ends_with(filler) {
            city = trim_punctuation(&city[..city.len() - filler.len()]);
        }
    }

    (!city.is_empty()).then(|| city.to_string())
}

/// First word after a self-introduction such as "I'm" or "my name is".
fn extract_name(utterance: &str) -> Option<String> {
    let lower = utterance.to_ascii_lowercase();
    NAME_MARKERS.iter().find_map(|marker| {
        let idx = lower.find(marker)?;
        let rest = &utterance[idx + marker.len()..];
        let name = trim_punctuation(rest.split_whitespace().next()?);
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Keyword-driven [`DecisionEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn decide_for(&self, agent: &AgentDescriptor, request: &DecisionRequest<'_>) -> Decision {
        // A tool just answered: relay its text.
        if let Some(last) = request.messages.last() {
            if last.role == ChatRole::Tool {
                return Decision::respond(ToolValue::from_content(&last.content).text());
            }
        }

        let intent = classify(request.utterance);
        debug!("[{}] rule engine intent: {:?}", agent.name, intent);

        let Some((tool, args)) = intent.tool_call() else {
            return match intent {
                Intent::Weather { .. } => {
                    Decision::respond("Which city would you like the weather for?")
                }
                Intent::Time { .. } => Decision::respond("Which city would you like the time for?"),
                _ => Decision::respond(
                    "I'm sorry, I can only help with weather and time questions, greetings and goodbyes.",
                ),
            };
        };

        if agent.tools.contains(tool) {
            return Decision::CallTools {
                calls: vec![ToolCall::new(tool, args)],
            };
        }

        if let Some(owner) = agent.sub_agents.iter().find(|a| a.tools.contains(tool)) {
            return Decision::transfer(owner.name.clone());
        }

        Decision::respond("I'm sorry, I can't handle that request.")
    }
}

#[async_trait]
impl DecisionEngine for RuleEngine {
    fn name(&self) -> &str {
        "rules"
    }

    async fn decide(&self, request: DecisionRequest<'_>) -> Result<Decision, InferenceError> {
        Ok(self.decide_for(request.agent, &request))
    }
}
