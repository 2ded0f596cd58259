//! FinWise conversation orchestrator.
//!
//! [`Assistant::answer`] turns one question into one answer: it retrieves
//! context from a [`rag_store::VectorStore`], builds the financial-advisor
//! prompt, calls a [`ChatModel`] with the whole session history and the tool
//! catalog, runs at most one round of tool calls, and asks the model again.
//! [`Assistant::respond`] wraps that in the "a turn always returns text"
//! boundary. Session bookkeeping lives in [`SessionStore`].

mod artifacts;
mod config;
mod conversation;
mod error;
mod model;
mod orchestrator;
pub mod prompt;
mod session;
mod tools;

pub use artifacts::{Segment, split_artifacts};
pub use config::AssistantConfig;
pub use conversation::Conversation;
pub use error::{AssistantConfigError, ConversationError, OrchestratorError, SessionError};
pub use model::{ChatModel, ModelFuture};
pub use orchestrator::{AnswerResult, Assistant, EMPTY_ANSWER, MAX_TOOL_ROUNDS, ToolInvocation, apology_text};
pub use session::{ChatSession, SessionHandle, SessionList, SessionStore, Speaker, TranscriptEntry};
pub use tools::{ToolId, ToolRegistry};
