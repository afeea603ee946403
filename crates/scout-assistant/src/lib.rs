//! Chat assistant for Sentinel Scout.
//!
//! A [`ChatSession`] relays user text to an external conversational model
//! ([`ModelSession`]), runs the tools the model asks for through a
//! [`ToolRouter`], and hands the results back until the model answers with
//! plain text.

pub mod chat;
pub mod gemini;
pub mod prompts;
pub mod session;
pub mod tools;

pub use chat::{ChatError, ChatSession, ChatState};
pub use gemini::GeminiSession;
pub use session::{ModelError, ModelSession, ModelTurn, ScriptedModel, ToolCall, ToolResponse, TurnInput};
pub use tools::{tool_declarations, Navigator, NavigationLog, Page, ToolDeclaration, ToolRouter};
