//! Minimal interface to an external conversational model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while creating or talking to a model session.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The credential needed to open a session is not available.
    #[error("environment variable {0} is not set")]
    MissingCredential(String),

    /// An HTTP-level error (connection failure, DNS, TLS, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API returned a non-success status with a message.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the API response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout
        } else {
            ModelError::Http(err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Turn types
// ---------------------------------------------------------------------------

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            args,
        }
    }
}

/// The result of one [`ToolCall`], sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Always a JSON object.
    pub response: serde_json::Value,
}

impl ToolResponse {
    /// Pair `result` with `call`. Non-object results are wrapped as
    /// `{"result": ...}` since function responses must be objects.
    pub fn new(call: &ToolCall, result: serde_json::Value) -> Self {
        let response = if result.is_object() {
            result
        } else {
            serde_json::json!({ "result": result })
        };
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            response,
        }
    }
}

/// What the application sends to the model in one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    UserText(String),
    /// All results of the previous turn's tool calls, in call order.
    ToolResults(Vec<ToolResponse>),
}

/// One model reply: optional text plus zero or more tool requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls: calls,
        }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ModelSession trait
// ---------------------------------------------------------------------------

/// A stateful conversation with an external model.
#[async_trait]
pub trait ModelSession: Send {
    async fn send_turn(&mut self, input: TurnInput) -> Result<ModelTurn, ModelError>;

    /// Forget everything since the last [`TurnInput::UserText`], including
    /// that text. Called when a submission fails partway through its tool
    /// loop so the next submission starts from a consistent conversation.
    fn abandon_turn(&mut self) {}
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// Replays queued turns in order and records every input it receives.
///
/// When the queue is empty it answers with a fixed text turn.
pub struct ScriptedModel {
    turns: VecDeque<Result<ModelTurn, ModelError>>,
    inputs: Arc<Mutex<Vec<TurnInput>>>,
    abandoned: Arc<Mutex<u32>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            inputs: Arc::new(Mutex::new(Vec::new())),
            abandoned: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a successful turn.
    pub fn with_turn(mut self, turn: ModelTurn) -> Self {
        self.turns.push_back(Ok(turn));
        self
    }

    /// Queue a failing turn.
    pub fn with_error(mut self, error: ModelError) -> Self {
        self.turns.push_back(Err(error));
        self
    }

    /// Handle to the recorded inputs; stays valid after the model is boxed.
    pub fn inputs(&self) -> Arc<Mutex<Vec<TurnInput>>> {
        self.inputs.clone()
    }

    /// Handle to the number of [`abandon_turn`](ModelSession::abandon_turn) calls.
    pub fn abandoned(&self) -> Arc<Mutex<u32>> {
        self.abandoned.clone()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelSession for ScriptedModel {
    async fn send_turn(&mut self, input: TurnInput) -> Result<ModelTurn, ModelError> {
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input);
        }
        self.turns
            .pop_front()
            .unwrap_or_else(|| Ok(ModelTurn::text("Mock response")))
    }

    fn abandon_turn(&mut self) {
        if let Ok(mut count) = self.abandoned.lock() {
            *count += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
