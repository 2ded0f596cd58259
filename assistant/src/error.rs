//! Orchestrator errors. Variants follow the failure taxonomy of a chat turn.

use ai_llm_service::error_handler::AiLlmError;
use rag_store::RagError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("question is empty")]
    EmptyQuestion,

    /// Store unreachable or failing. Downgraded to an empty context inside
    /// a turn, never returned from [`crate::Assistant::answer`].
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(#[from] RagError),

    #[error("{0}")]
    Generation(#[from] AiLlmError),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

/// Violations of the append-only history invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("tool message has no tool_call_id")]
    MissingToolCallId,

    #[error("tool message answers unknown or already answered call '{0}'")]
    UnmatchedToolCall(String),
}

/// Invalid retrieval settings or tool catalog, reported at startup.
#[derive(Debug, Error)]
pub enum AssistantConfigError {
    #[error(transparent)]
    Env(#[from] AiLlmError),

    #[error("RAG_SEARCH_MODE: unknown mode '{0}'")]
    UnknownSearchMode(String),

    #[error("RAG_TOP_K must be > 0")]
    ZeroTopK,

    #[error("RAG_FETCH_K ({fetch_k}) must be >= RAG_TOP_K ({top_k})")]
    FetchBelowTopK { fetch_k: usize, top_k: usize },

    #[error("MMR_LAMBDA must be within 0..=1, got {0}")]
    LambdaOutOfRange(f32),

    #[error("duplicate tool name '{0}'")]
    DuplicateTool(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session '{0}' not found")]
    NotFound(String),
}
