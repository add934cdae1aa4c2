//! Model inference over an OpenAI-compatible chat-completions API.
//!
//! The default endpoint is Gemini's OpenAI compatibility layer; any server
//! speaking the same dialect works.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Decision, DecisionEngine, DecisionRequest, InferenceError};
use crate::config::{Credentials, TeamConfig};
use crate::error::{truncate_text, MAX_FAULT_CHARS};
use crate::tools::{ToolDefinition, TRANSFER_TOOL};
use crate::types::*;

/// Inference client for the remote language model.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    base_url: String,
    credentials: Credentials,
    http: reqwest::Client,
    max_tokens: u32,
    temperature: f64,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct MessagePayload {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    r#type: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCallPayload {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl InferenceClient {
    /// Create a new inference client.
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            http: reqwest::Client::new(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    /// Create a client using the endpoint and sampling settings in `config`.
    pub fn from_config(config: &TeamConfig, credentials: Credentials) -> Self {
        Self {
            max_tokens: config.max_tokens_per_turn,
            temperature: config.temperature,
            ..Self::new(&config.api_base_url, credentials)
        }
    }

    /// Run inference with tool support. Returns a response with optional tool calls.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<InferenceResponse, InferenceError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = build_request(model, messages, tools, self.max_tokens, self.temperature);

        debug!(
            "Inference request to model {}: {} messages, {} tools",
            model,
            messages.len(),
            tools.len()
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.credentials.api_key())
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: truncate_text(&body, MAX_FAULT_CHARS),
            });
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;

        Ok(parse_response(body))
    }
}

#[async_trait]
impl DecisionEngine for InferenceClient {
    fn name(&self) -> &str {
        "inference"
    }

    async fn decide(&self, request: DecisionRequest<'_>) -> Result<Decision, InferenceError> {
        let response = self
            .chat(&request.agent.model, &request.messages, &request.tools)
            .await?;

        info!(
            "[{}] tokens: {} prompt + {} completion",
            request.agent.name, response.usage.prompt_tokens, response.usage.completion_tokens
        );

        to_decision(response)
    }
}

fn build_request<'a>(
    model: &'a str,
    messages: &[ChatMessage],
    tools: &'a [ToolDefinition],
    max_tokens: u32,
    temperature: f64,
) -> ChatRequest<'a> {
    let msg_payloads: Vec<MessagePayload> = messages
        .iter()
        .map(|m| {
            let tool_calls = if m.tool_calls.is_empty() {
                None
            } else {
                Some(
                    m.tool_calls
                        .iter()
                        .map(|tc| ToolCallPayload {
                            id: tc.id.clone(),
                            r#type: "function".into(),
                            function: FunctionCallPayload {
                                name: tc.name.clone(),
                                arguments: tc.arguments.to_string(),
                            },
                        })
                        .collect(),
                )
            };
            let content = if tool_calls.is_some() && m.content.is_empty() {
                None
            } else {
                Some(m.content.clone())
            };

            MessagePayload {
                role: match m.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                    ChatRole::Tool => "tool",
                },
                content,
                tool_calls,
                tool_call_id: m.tool_call_id.clone(),
            }
        })
        .collect();

    let tool_payloads: Option<Vec<ToolPayload>> = if tools.is_empty() {
        None
    } else {
        Some(
            tools
                .iter()
                .map(|t| ToolPayload {
                    r#type: "function",
                    function: FunctionPayload {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters,
                    },
                })
                .collect(),
        )
    };

    ChatRequest {
        model,
        messages: msg_payloads,
        tools: tool_payloads,
        max_tokens,
        temperature,
    }
}

fn parse_response(body: ChatResponse) -> InferenceResponse {
    let message = body
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .unwrap_or_default();

    // Parse tool calls
    let tool_calls: Vec<ToolCall> = message
        .tool_calls
        .into_iter()
        .map(|tc| {
            let args: serde_json::Value =
                serde_json::from_str(&tc.function.arguments).unwrap_or_default();
            ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: args,
            }
        })
        .collect();

    let usage = body
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    InferenceResponse {
        content: message.content,
        tool_calls,
        usage,
    }
}

/// Map a raw model response onto the runner's vocabulary.
///
/// A transfer call wins over any other tool calls in the same response.
fn to_decision(response: InferenceResponse) -> Result<Decision, InferenceError> {
    if let Some(call) = response
        .tool_calls
        .iter()
        .find(|tc| tc.name == TRANSFER_TOOL)
    {
        let agent_name = call
            .arguments
            .get("agent_name")
            .and_then(|v| v.as_str())
            .ok_or(InferenceError::MalformedTransfer)?
            .to_string();
        return Ok(Decision::Transfer {
            call: call.clone(),
            agent_name,
        });
    }

    if !response.tool_calls.is_empty() {
        return Ok(Decision::CallTools {
            calls: response.tool_calls,
        });
    }

    let text = response.content.filter(|c| !c.trim().is_empty());
    Ok(Decision::Respond { text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::transfer_definition;
    use serde_json::json;

    fn parse(raw: serde_json::Value) -> InferenceResponse {
        parse_response(serde_json::from_value(raw).unwrap())
    }

    #[test]
    fn test_request_carries_tool_structure() {
        let call = ToolCall::new("get_weather", json!({"city": "New York"}));
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("weather?"),
            ChatMessage::assistant_tool_calls(None, vec![call.clone()]),
            ChatMessage::tool(call.id.clone(), "{\"status\":\"success\",\"report\":\"sunny\"}"),
        ];
        let tools = vec![transfer_definition(&["greeting_agent"])];

        let request = build_request("gemini-2.0-flash", &messages, &tools, 256, 0.2);
        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(wire["model"], "gemini-2.0-flash");
        assert_eq!(wire["max_tokens"], 256);
        assert_eq!(wire["messages"][2]["role"], "assistant");
        assert!(wire["messages"][2]["content"].is_null());
        assert_eq!(wire["messages"][2]["tool_calls"][0]["id"], call.id.as_str());
        assert_eq!(
            wire["messages"][2]["tool_calls"][0]["function"]["arguments"],
            "{\"city\":\"New York\"}"
        );
        assert_eq!(wire["messages"][3]["tool_call_id"], call.id.as_str());
        assert!(wire["messages"][1].get("tool_call_id").is_none());
        assert_eq!(wire["tools"][0]["type"], "function");
        assert_eq!(wire["tools"][0]["function"]["name"], TRANSFER_TOOL);
    }

    #[test]
    fn test_request_omits_empty_tools() {
        let request = build_request("m", &[ChatMessage::user("hi")], &[], 10, 0.0);
        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("tools").is_none());
    }

    #[test]
    fn test_transfer_response() {
        let response = parse(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "transfer_to_agent",
                            "arguments": "{\"agent_name\":\"greeting_agent\"}"
                        }
                    }]
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }));
        assert_eq!(response.usage.total_tokens, 15);

        match to_decision(response).unwrap() {
            Decision::Transfer { call, agent_name } => {
                assert_eq!(agent_name, "greeting_agent");
                assert_eq!(call.id, "call_1");
            }
            other => panic!("expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_transfer() {
        let response = parse(json!({
            "choices": [{"message": {"tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "transfer_to_agent", "arguments": "{}"}
            }]}}]
        }));
        assert!(matches!(
            to_decision(response),
            Err(InferenceError::MalformedTransfer)
        ));
    }

    #[test]
    fn test_tool_call_response() {
        let response = parse(json!({
            "choices": [{"message": {"tool_calls": [{
                "id": "call_9",
                "type": "function",
                "function": {"name": "get_weather", "arguments": "{\"city\":\"Paris\"}"}
            }]}}]
        }));
        assert_eq!(
            to_decision(response).unwrap(),
            Decision::CallTools {
                calls: vec![ToolCall {
                    id: "call_9".into(),
                    name: "get_weather".into(),
                    arguments: json!({"city": "Paris"}),
                }]
            }
        );
    }

    #[test]
    fn test_text_and_empty_responses() {
        let text = parse(json!({"choices": [{"message": {"content": "Hello, there!"}}]}));
        assert_eq!(to_decision(text).unwrap(), Decision::respond("Hello, there!"));

        let blank = parse(json!({"choices": [{"message": {"content": "  "}}]}));
        assert_eq!(to_decision(blank).unwrap(), Decision::Respond { text: None });

        let no_choices = parse(json!({"choices": []}));
        assert_eq!(to_decision(no_choices).unwrap(), Decision::Respond { text: None });
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let creds = Credentials::from_value("KEY", Some("k".into())).unwrap();
        let client = InferenceClient::new("https://example.test/v1/", creds);
        assert_eq!(client.base_url, "https://example.test/v1");
    }
}
