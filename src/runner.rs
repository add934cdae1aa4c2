//! The delegation boundary: drives one conversational turn.
//!
//! Each turn:
//! 1. Records the user query in the session
//! 2. Asks the decision engine what the active agent does next
//! 3. Executes local tools or transfers to a sub-agent, recording each step
//! 4. Repeats until a terminal event is produced
//!
//! Turns must not overlap on the same session; the driver awaits each one
//! before sending the next.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::{context, system_prompt, AgentDescriptor};
use crate::error::RuntimeFault;
use crate::inference::{Decision, DecisionEngine, DecisionRequest};
use crate::session::{Event, InMemorySessionService, SessionKey};
use crate::tools::{self, ToolDefinition};
use crate::types::*;

/// Everything a single turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Events appended to the session during the turn, in order.
    pub events: Vec<Event>,
    /// Boundary states visited, starting and ending at `AwaitingQuery`.
    pub transitions: Vec<BoundaryState>,
}

impl TurnOutcome {
    /// The terminal event, if the turn produced one.
    pub fn final_event(&self) -> Option<&Event> {
        self.events.iter().find(|e| e.is_final_response())
    }
}

/// Runs turns for one agent tree against a session service.
pub struct Runner {
    root: Arc<AgentDescriptor>,
    app_name: String,
    sessions: Arc<InMemorySessionService>,
    engine: Arc<dyn DecisionEngine>,
    max_steps_per_turn: u32,
    history_window: usize,
}

impl Runner {
    pub fn new(
        root: AgentDescriptor,
        app_name: &str,
        sessions: Arc<InMemorySessionService>,
        engine: Arc<dyn DecisionEngine>,
    ) -> Self {
        info!(
            "Runner created for agent '{}' (engine: {})",
            root.name,
            engine.name()
        );
        Self {
            root: Arc::new(root),
            app_name: app_name.to_string(),
            sessions,
            engine,
            max_steps_per_turn: 8,
            history_window: 20,
        }
    }

    pub fn with_limits(mut self, max_steps_per_turn: u32, history_window: usize) -> Self {
        self.max_steps_per_turn = max_steps_per_turn.max(1);
        self.history_window = history_window.max(1);
        self
    }

    pub fn root(&self) -> &AgentDescriptor {
        &self.root
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Process one user query to its terminal event.
    pub async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        query: &str,
    ) -> Result<TurnOutcome, RuntimeFault> {
        let key = SessionKey::new(&self.app_name, user_id, session_id);
        let invocation_id = format!("inv_{}", ulid::Ulid::new());
        let mut turn = TurnRecorder::new(&self.sessions, &key, &invocation_id);

        info!("[{}] Turn started: {}", invocation_id, query);
        turn.append(Event::user(&invocation_id, query)).await?;

        let mut active: Arc<AgentDescriptor> = self.root.clone();

        for step in 0..self.max_steps_per_turn {
            turn.enter(BoundaryState::Classifying);

            let events = self.sessions.events(&key).await?;
            let prompt = system_prompt::build_system_prompt(&active);
            let messages =
                context::build_messages(&prompt, &events, &active.name, self.history_window);
            let request = DecisionRequest {
                agent: &active,
                utterance: query,
                messages,
                tools: available_tools(&active),
            };

            let decision = self.engine.decide(request).await?;
            debug!("[{}] step {} '{}': {:?}", invocation_id, step, active.name, decision);

            match decision {
                Decision::CallTools { calls } => {
                    turn.enter(BoundaryState::ExecutingLocalTool);
                    turn.append(Event::tool_calls(&invocation_id, &active.name, calls.clone()))
                        .await?;

                    let mut outcomes = Vec::with_capacity(calls.len());
                    for call in &calls {
                        info!("[{}] Tool: {}({})", active.name, call.name, call.arguments);
                        let outcome = active.tools.execute(call).await;
                        if outcome.success() {
                            info!("[{}] Tool result: {} chars", active.name, outcome.value.text().len());
                        } else {
                            warn!("[{}] Tool error: {}", active.name, outcome.value.text());
                        }
                        outcomes.push(outcome);
                    }
                    turn.append(Event::tool_outcomes(&invocation_id, &active.name, outcomes))
                        .await?;
                }

                Decision::Transfer { call, agent_name } => {
                    let Some(target) = active.sub_agent(&agent_name).cloned() else {
                        return Err(RuntimeFault::UnknownAgent {
                            from: active.name.clone(),
                            target: agent_name,
                        });
                    };

                    turn.enter(BoundaryState::DelegatingToSubAgent);
                    info!("[{}] Delegating to '{}'", active.name, target.name);

                    let outcome = ToolOutcome {
                        tool_call_id: call.id.clone(),
                        name: call.name.clone(),
                        value: ToolValue::Structured(ToolResult::success(format!(
                            "Transferred to {}",
                            target.name
                        ))),
                    };
                    turn.append(Event::tool_calls(&invocation_id, &active.name, vec![call]))
                        .await?;
                    turn.append(Event::transfer(&invocation_id, &active.name, outcome, &target.name))
                        .await?;
                    active = target;
                }

                Decision::Respond { text } => {
                    turn.enter(BoundaryState::Responding);
                    turn.append(Event::reply(&invocation_id, &active.name, text)).await?;
                    return Ok(turn.finish());
                }

                Decision::Escalate { message } => {
                    turn.enter(BoundaryState::Responding);
                    warn!("[{}] Escalated: {:?}", active.name, message);
                    turn.append(Event::escalation(&invocation_id, &active.name, message))
                        .await?;
                    return Ok(turn.finish());
                }
            }
        }

        warn!(
            "[{}] Step limit of {} reached without a final response",
            invocation_id, self.max_steps_per_turn
        );
        turn.enter(BoundaryState::Responding);
        turn.append(Event::escalation(
            &invocation_id,
            &active.name,
            Some(format!(
                "Step limit of {} reached without a final response.",
                self.max_steps_per_turn
            )),
        ))
        .await?;
        Ok(turn.finish())
    }
}

/// Tool definitions offered to an agent: its own plus the transfer tool.
fn available_tools(agent: &AgentDescriptor) -> Vec<ToolDefinition> {
    let mut defs = agent.tools.definitions();
    if !agent.sub_agents.is_empty() {
        defs.push(tools::transfer_definition(&agent.sub_agent_names()));
    }
    defs
}

/// Appends a turn's events to the session and remembers them.
struct TurnRecorder<'a> {
    sessions: &'a InMemorySessionService,
    key: &'a SessionKey,
    invocation_id: &'a str,
    events: Vec<Event>,
    transitions: Vec<BoundaryState>,
}

impl<'a> TurnRecorder<'a> {
    fn new(sessions: &'a InMemorySessionService, key: &'a SessionKey, invocation_id: &'a str) -> Self {
        Self {
            sessions,
            key,
            invocation_id,
            events: Vec::new(),
            transitions: vec![BoundaryState::AwaitingQuery],
        }
    }

    fn enter(&mut self, state: BoundaryState) {
        debug!("[{}] -> {}", self.invocation_id, state);
        self.transitions.push(state);
    }

    async fn append(&mut self, event: Event) -> Result<(), RuntimeFault> {
        self.sessions.append_event(self.key, event.clone()).await?;
        self.events.push(event);
        Ok(())
    }

    fn finish(mut self) -> TurnOutcome {
        self.enter(BoundaryState::AwaitingQuery);
        info!("[{}] Turn finished after {} events", self.invocation_id, self.events.len());
        TurnOutcome {
            events: self.events,
            transitions: self.transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::team::{build_team, GREETING_AGENT, ROOT_AGENT};
    use crate::inference::{InferenceError, RuleEngine};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed list of decisions, then keeps calling a tool.
    struct ScriptedEngine {
        script: Mutex<VecDeque<Decision>>,
    }

    impl ScriptedEngine {
        fn new(script: Vec<Decision>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    #[async_trait]
    impl DecisionEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn decide(&self, _request: DecisionRequest<'_>) -> Result<Decision, InferenceError> {
            let next = self.script.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| Decision::CallTools {
                calls: vec![ToolCall::new("get_weather", json!({"city": "Paris"}))],
            }))
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl DecisionEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        async fn decide(&self, _request: DecisionRequest<'_>) -> Result<Decision, InferenceError> {
            Err(InferenceError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    async fn runner_with(engine: Arc<dyn DecisionEngine>) -> (Runner, Arc<InMemorySessionService>) {
        let sessions = Arc::new(InMemorySessionService::new());
        sessions.create_session("app", "u", "s").await.unwrap();
        let root = build_team("gemini-2.0-flash").unwrap();
        (Runner::new(root, "app", sessions.clone(), engine), sessions)
    }

    #[tokio::test]
    async fn test_local_tool_turn() {
        let (runner, _) = runner_with(Arc::new(RuleEngine)).await;
        let outcome = runner.run("u", "s", "What is the weather in New York?").await.unwrap();

        assert_eq!(
            outcome.transitions,
            vec![
                BoundaryState::AwaitingQuery,
                BoundaryState::Classifying,
                BoundaryState::ExecutingLocalTool,
                BoundaryState::Classifying,
                BoundaryState::Responding,
                BoundaryState::AwaitingQuery,
            ]
        );
        let last = outcome.final_event().unwrap();
        assert_eq!(last.author, ROOT_AGENT);
        assert!(last.content.as_deref().unwrap().contains("sunny"));
    }

    #[tokio::test]
    async fn test_delegated_turn() {
        let (runner, sessions) = runner_with(Arc::new(RuleEngine)).await;
        let outcome = runner.run("u", "s", "Hello there!").await.unwrap();

        assert!(outcome.transitions.contains(&BoundaryState::DelegatingToSubAgent));
        let transfer = outcome
            .events
            .iter()
            .find(|e| e.actions.transfer_to_agent.is_some())
            .unwrap();
        assert_eq!(transfer.author, ROOT_AGENT);
        assert_eq!(transfer.actions.transfer_to_agent.as_deref(), Some(GREETING_AGENT));

        let last = outcome.final_event().unwrap();
        assert_eq!(last.author, GREETING_AGENT);
        assert_eq!(last.content.as_deref(), Some("Hello, there!"));

        // Exactly one terminal event, and it is the last one recorded.
        assert_eq!(outcome.events.iter().filter(|e| e.is_final_response()).count(), 1);
        let stored = sessions.events(&SessionKey::new("app", "u", "s")).await.unwrap();
        assert_eq!(stored.len(), outcome.events.len());
        assert_eq!(stored.last().unwrap().id, last.id);
    }

    #[tokio::test]
    async fn test_unknown_transfer_target_is_fault() {
        let engine = ScriptedEngine::new(vec![Decision::transfer("nobody")]);
        let (runner, _) = runner_with(Arc::new(engine)).await;
        let err = runner.run("u", "s", "hi").await.unwrap_err();
        assert!(matches!(err, RuntimeFault::UnknownAgent { ref target, .. } if target == "nobody"));
    }

    #[tokio::test]
    async fn test_step_limit_escalates() {
        let engine = ScriptedEngine::new(vec![]);
        let (runner, _) = runner_with(Arc::new(engine)).await;
        let runner = runner.with_limits(3, 20);

        let outcome = runner.run("u", "s", "loop forever").await.unwrap();
        let last = outcome.final_event().unwrap();
        assert!(last.actions.escalate);
        assert_eq!(
            last.error_message.as_deref(),
            Some("Step limit of 3 reached without a final response.")
        );
        let classifying = outcome
            .transitions
            .iter()
            .filter(|s| **s == BoundaryState::Classifying)
            .count();
        assert_eq!(classifying, 3);
    }

    #[tokio::test]
    async fn test_smallest_window_still_answers() {
        let (runner, _) = runner_with(Arc::new(RuleEngine)).await;
        let runner = runner.with_limits(8, 1);

        let outcome = runner.run("u", "s", "What is the weather in New York?").await.unwrap();
        let last = outcome.final_event().unwrap();
        assert!(!last.actions.escalate);
        assert!(last.content.as_deref().unwrap().contains("sunny"));
    }

    #[tokio::test]
    async fn test_engine_escalation_ends_turn() {
        let engine = ScriptedEngine::new(vec![Decision::Escalate {
            message: Some("quota exceeded".into()),
        }]);
        let (runner, _) = runner_with(Arc::new(engine)).await;

        let outcome = runner.run("u", "s", "Hello there!").await.unwrap();
        assert_eq!(
            outcome.transitions,
            vec![
                BoundaryState::AwaitingQuery,
                BoundaryState::Classifying,
                BoundaryState::Responding,
                BoundaryState::AwaitingQuery,
            ]
        );
        let last = outcome.final_event().unwrap();
        assert!(last.actions.escalate);
        assert_eq!(last.author, ROOT_AGENT);
        assert_eq!(
            crate::driver::final_response_text(&outcome.events),
            "Agent escalated: quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_engine_failure_is_fault() {
        let (runner, _) = runner_with(Arc::new(FailingEngine)).await;
        let err = runner.run("u", "s", "Hello there!").await.unwrap_err();
        assert!(matches!(err, RuntimeFault::Inference(_)));
    }

    #[tokio::test]
    async fn test_missing_session_is_fault() {
        let (runner, _) = runner_with(Arc::new(RuleEngine)).await;
        let err = runner.run("u", "other", "Hello there!").await.unwrap_err();
        assert!(matches!(err, RuntimeFault::Session(_)));
    }

    #[test]
    fn test_available_tools() {
        let root = build_team("gemini-2.0-flash").unwrap();
        let names: Vec<_> = available_tools(&root).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["get_weather", "get_current_time", tools::TRANSFER_TOOL]);

        let greeter = root.sub_agent(GREETING_AGENT).unwrap();
        let names: Vec<_> = available_tools(greeter).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["say_hello"]);
    }
}
