//! Model session over the hosted `generateContent` REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::prompts::SYSTEM_PROMPT;
use crate::session::{ModelError, ModelSession, ModelTurn, ToolCall, TurnInput};
use crate::tools::{tool_declarations, ToolDeclaration};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Conversation with a hosted model that supports function calling.
///
/// The full history (user text, model replies including function calls, and
/// function responses) is resent on every turn.
pub struct GeminiSession {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    system_prompt: String,
    tools: Vec<ToolDeclaration>,
    history: Vec<Value>,
    /// History length before the current user turn was appended.
    turn_start: usize,
}

impl GeminiSession {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            tools: tool_declarations(),
            history: Vec::new(),
            turn_start: 0,
        }
    }

    /// Open a session with the API key read from environment variable `var`.
    pub fn from_env(var: &str, model: impl Into<String>) -> Result<Self, ModelError> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key, model)),
            _ => Err(ModelError::MissingCredential(var.to_string())),
        }
    }

    /// Override the base URL (useful for testing with a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn history(&self) -> &[Value] {
        &self.history
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the JSON request body for the current history.
    pub fn build_request_body(&self) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": self.system_prompt }] },
            "contents": self.history,
            "tools": [{ "functionDeclarations": self.tools }],
        })
    }

    async fn generate(&self) -> Result<Value, ModelError> {
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request_body())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| ModelError::Parse("response contained no candidate content".into()))
    }
}

/// Pull `error.message` out of an API error body, else return it raw.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn user_content(input: &TurnInput) -> Value {
    match input {
        TurnInput::UserText(text) => json!({ "role": "user", "parts": [{ "text": text }] }),
        TurnInput::ToolResults(results) => {
            let parts: Vec<Value> = results
                .iter()
                .map(|r| {
                    let mut response = json!({ "name": r.name, "response": r.response });
                    if let Some(id) = &r.id {
                        response["id"] = json!(id);
                    }
                    json!({ "functionResponse": response })
                })
                .collect();
            json!({ "role": "user", "parts": parts })
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Value>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

fn parse_turn(content: &Value) -> Result<ModelTurn, ModelError> {
    let content: Content =
        serde_json::from_value(content.clone()).map_err(|e| ModelError::Parse(e.to_string()))?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in content.parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(call) = part.function_call {
            tool_calls.push(ToolCall {
                id: call.id,
                name: call.name,
                args: call.args,
            });
        }
    }

    Ok(ModelTurn {
        text: (!text.is_empty()).then_some(text),
        tool_calls,
    })
}

#[async_trait]
impl ModelSession for GeminiSession {
    async fn send_turn(&mut self, input: TurnInput) -> Result<ModelTurn, ModelError> {
        if matches!(input, TurnInput::UserText(_)) {
            self.turn_start = self.history.len();
        }
        self.history.push(user_content(&input));

        // A failure anywhere in the user turn discards the whole turn, so a
        // dangling functionCall is never replayed.
        let content = match self.generate().await {
            Ok(content) => content,
            Err(e) => {
                self.abandon_turn();
                return Err(e);
            }
        };
        let turn = match parse_turn(&content) {
            Ok(turn) => turn,
            Err(e) => {
                self.abandon_turn();
                return Err(e);
            }
        };
        debug!(
            model = %self.model,
            tool_calls = turn.tool_calls.len(),
            has_text = turn.text.is_some(),
            "model turn received"
        );
        self.history.push(content);
        Ok(turn)
    }

    fn abandon_turn(&mut self) {
        self.history.truncate(self.turn_start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ToolResponse;

    #[test]
    fn request_body_carries_instruction_tools_and_history() {
        let mut session = GeminiSession::new("key", "test-model");
        session
            .history
            .push(user_content(&TurnInput::UserText("hello".into())));

        let body = session.build_request_body();
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Sentinel Scout"));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        let decls = body["tools"][0]["functionDeclarations"].as_array().unwrap();
        assert_eq!(decls.len(), 4);
    }

    #[test]
    fn tool_results_become_function_responses() {
        let mut call = ToolCall::new("getTrend", json!({}));
        call.id = Some("call-1".into());
        let input = TurnInput::ToolResults(vec![ToolResponse::new(&call, json!([]))]);

        let content = user_content(&input);
        let fr = &content["parts"][0]["functionResponse"];
        assert_eq!(fr["name"], "getTrend");
        assert_eq!(fr["id"], "call-1");
        assert_eq!(fr["response"], json!({ "result": [] }));
    }

    #[test]
    fn parse_turn_splits_text_and_calls() {
        let content = json!({
            "role": "model",
            "parts": [
                { "text": "Checking. " },
                { "functionCall": { "name": "listFindings", "args": { "severity": "High" } } },
                { "text": "Done." }
            ]
        });
        let turn = parse_turn(&content).unwrap();
        assert_eq!(turn.text.as_deref(), Some("Checking. Done."));
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].args["severity"], "High");
    }

    #[test]
    fn api_error_message_reads_nested_message() {
        let msg = api_error_message(r#"{"error":{"code":400,"message":"API key not valid"}}"#);
        assert_eq!(msg, "API key not valid");
        assert_eq!(api_error_message("plain"), "plain");
    }

    #[test]
    fn from_env_requires_credential() {
        let result = GeminiSession::from_env("SCOUT_TEST_SURELY_UNSET_KEY", "m");
        assert!(matches!(result, Err(ModelError::MissingCredential(v)) if v == "SCOUT_TEST_SURELY_UNSET_KEY"));
    }
}
