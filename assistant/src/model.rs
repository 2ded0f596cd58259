//! The generative model as seen by the orchestrator.

use std::{future::Future, pin::Pin};

use ai_llm_service::{
    chat::{ChatCompletion, ChatMessage, ToolSpec},
    error_handler::AiLlmError,
    service_profiles::LlmServiceProfiles,
};

pub type ModelFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatCompletion, AiLlmError>> + Send + 'a>>;

/// One chat completion over the full history with a tool catalog.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage], tools: &'a [ToolSpec]) -> ModelFuture<'a>;
}

impl ChatModel for LlmServiceProfiles {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage], tools: &'a [ToolSpec]) -> ModelFuture<'a> {
        Box::pin(self.chat(messages, tools))
    }
}
