use scout_core::types::ChatMessage;
use thiserror::Error;
use tracing::{info, warn};

use crate::prompts;
use crate::session::{ModelError, ModelSession, ToolResponse, TurnInput};
use crate::tools::ToolRouter;

const DEFAULT_MAX_TOOL_ROUNDS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    AwaitingUserInput,
    AwaitingModelTurn,
}

#[derive(Debug, Error)]
pub enum ChatError {
    /// The model session never started; the transcript explains why.
    #[error("chat is disabled: the model session could not be initialised")]
    Disabled,
}

/// Failure inside one submission; always turned into a transcript message.
#[derive(Debug, Error)]
enum TurnError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model requested tools more than {0} times without answering")]
    TooManyToolRounds(u32),
}

/// One in-memory chat: the transcript plus the model it talks to.
pub struct ChatSession {
    model: Option<Box<dyn ModelSession>>,
    tools: ToolRouter,
    messages: Vec<ChatMessage>,
    state: ChatState,
    max_tool_rounds: u32,
}

impl ChatSession {
    /// Start a session from the outcome of opening the model.
    ///
    /// If opening failed the transcript gets a permanent alert and every
    /// later [`submit`](Self::submit) returns [`ChatError::Disabled`].
    pub fn new(model: Result<Box<dyn ModelSession>, ModelError>, tools: ToolRouter) -> Self {
        let mut messages = vec![ChatMessage::assistant(prompts::GREETING)];
        let model = match model {
            Ok(model) => Some(model),
            Err(ModelError::MissingCredential(var)) => {
                warn!(var = %var, "model credential missing, chat disabled");
                messages.push(ChatMessage::assistant(prompts::missing_credential_alert(&var)));
                None
            }
            Err(e) => {
                warn!(error = %e, "model session failed to start, chat disabled");
                messages.push(ChatMessage::assistant(prompts::init_failure_alert(&e.to_string())));
                None
            }
        };
        Self {
            model,
            tools,
            messages,
            state: ChatState::AwaitingUserInput,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send `text` to the model and run its tool requests until it answers.
    ///
    /// Returns the new assistant message (the answer, or a `System Error`
    /// line when the turn failed). Blank input is ignored and yields `None`.
    pub async fn submit(&mut self, text: &str) -> Result<Option<&ChatMessage>, ChatError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let Some(model) = self.model.as_deref_mut() else {
            return Err(ChatError::Disabled);
        };

        self.messages.push(ChatMessage::user(text));
        self.state = ChatState::AwaitingModelTurn;

        let outcome = run_turns(model, &self.tools, text, self.max_tool_rounds).await;
        self.state = ChatState::AwaitingUserInput;

        let reply = match outcome {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "chat turn failed");
                model.abandon_turn();
                prompts::turn_failure(&e.to_string())
            }
        };
        self.messages.push(ChatMessage::assistant(reply));
        Ok(self.messages.last())
    }
}

/// Relay one user submission through the model/tool loop.
async fn run_turns(
    model: &mut dyn ModelSession,
    tools: &ToolRouter,
    text: &str,
    max_rounds: u32,
) -> Result<String, TurnError> {
    let mut turn = model.send_turn(TurnInput::UserText(text.to_string())).await?;
    let mut rounds = 0;

    while turn.wants_tools() {
        rounds += 1;
        if rounds > max_rounds {
            return Err(TurnError::TooManyToolRounds(max_rounds));
        }

        // Sequential on purpose: later calls may rely on earlier side effects.
        let mut responses = Vec::with_capacity(turn.tool_calls.len());
        for call in &turn.tool_calls {
            let result = tools.execute(call).await;
            responses.push(ToolResponse::new(call, result));
        }
        info!(round = rounds, results = responses.len(), "returning tool results to model");
        turn = model.send_turn(TurnInput::ToolResults(responses)).await?;
    }

    Ok(turn.text.unwrap_or_default())
}
