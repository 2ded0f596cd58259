//! One chat turn: retrieve, prompt, generate, at most one tool round,
//! regenerate.

use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::chat::{ChatCompletion, ChatMessage, ToolSpec};
use rag_store::{RetrievedChunk, VectorStore};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AssistantConfig;
use crate::conversation::Conversation;
use crate::error::OrchestratorError;
use crate::model::ChatModel;
use crate::prompt::build_prompt;
use crate::session::ChatSession;
use crate::tools::ToolRegistry;

/// Upper bound on tool rounds per turn. A tool call in the final completion
/// is ignored.
pub const MAX_TOOL_ROUNDS: usize = 1;

/// Returned when the model produced neither text nor an artifact.
pub const EMPTY_ANSWER: &str = "I'm sorry, I couldn't produce an answer to that. Could you rephrase the question?";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub call_id: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    /// Final text, with any chart artifact embedded.
    pub text: String,
    /// Chunks the prompt was built from.
    pub context: Vec<RetrievedChunk>,
    pub tools: Vec<ToolInvocation>,
    /// Set when the turn failed and `text` is the apology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerResult {
    pub fn apology(err: &OrchestratorError) -> Self {
        Self {
            text: apology_text(err),
            context: Vec::new(),
            tools: Vec::new(),
            error: Some(err.to_string()),
        }
    }
}

pub fn apology_text(err: &OrchestratorError) -> String {
    format!(
        "I apologize, but I encountered an error: {err}. Please try again or rephrase your question."
    )
}

pub struct Assistant {
    model: Arc<dyn ChatModel>,
    store: Arc<dyn VectorStore>,
    tools: ToolRegistry,
    cfg: AssistantConfig,
}

impl Assistant {
    pub fn new(
        model: Arc<dyn ChatModel>,
        store: Arc<dyn VectorStore>,
        tools: ToolRegistry,
        cfg: AssistantConfig,
    ) -> Self {
        Self {
            model,
            store,
            tools,
            cfg,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.cfg
    }

    /// Runs one turn against `conversation`.
    ///
    /// The turn's messages (prompt, tool call, tool replies, final answer) are
    /// appended only if the whole turn succeeds.
    ///
    /// # Errors
    /// [`OrchestratorError::EmptyQuestion`], generation failures, unknown tool
    /// names and history invariant violations. Retrieval failures are not
    /// errors: the turn continues with an empty context.
    #[instrument(skip_all, fields(history = conversation.len()))]
    pub async fn answer(
        &self,
        conversation: &mut Conversation,
        question: &str,
    ) -> Result<AnswerResult, OrchestratorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(OrchestratorError::EmptyQuestion);
        }

        let context = match self.retrieve(question).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "retrieval failed, continuing without context");
                Vec::new()
            }
        };

        let catalog = self.tools.catalog();
        let mut history: Vec<ChatMessage> = conversation.messages().to_vec();
        let turn_start = history.len();
        history.push(ChatMessage::user(build_prompt(question, &context)));

        let mut completion = self.generate(&history, &catalog).await?;
        let mut invocations = Vec::new();
        let mut artifacts: Vec<String> = Vec::new();

        let mut rounds = 0;
        while completion.has_tool_calls() && rounds < MAX_TOOL_ROUNDS {
            rounds += 1;
            let calls = completion.tool_calls.clone();
            history.push(completion.into_message());

            for call in calls {
                let tool = self.tools.resolve(&call.name)?;
                let result = tool.invoke(&call.arguments);
                info!(
                    tool = tool.name(),
                    call_id = %call.id,
                    success = result.is_success(),
                    "tool invoked"
                );
                invocations.push(ToolInvocation {
                    name: call.name.clone(),
                    call_id: call.id.clone(),
                    success: result.is_success(),
                });
                history.push(ChatMessage::tool(call.id, result.to_message_content()));
                if let Some(a) = result.artifact {
                    artifacts.push(a);
                }
            }

            completion = self.generate(&history, &catalog).await?;
        }
        if completion.has_tool_calls() {
            debug!(calls = completion.tool_calls.len(), "tool round limit reached, ignoring calls");
        }

        let model_text = completion.content.trim().to_string();
        // Stored without tool calls: an unanswered call would poison the
        // next replay.
        history.push(ChatMessage::assistant(model_text.clone(), Vec::new()));
        conversation.append(history.split_off(turn_start))?;

        let text = embed_artifacts(model_text, &artifacts);
        Ok(AnswerResult {
            text,
            context,
            tools: invocations,
            error: None,
        })
    }

    /// The turn boundary: never fails. Errors become the apology text. Both
    /// the question and the reply land in the session's display transcript.
    pub async fn respond(&self, session: &mut ChatSession, question: &str) -> AnswerResult {
        let result = match self.answer(&mut session.conversation, question).await {
            Ok(r) => r,
            Err(e) => {
                error!(session = %session.id, error = %e, "turn failed");
                AnswerResult::apology(&e)
            }
        };
        session.record(question, &result.text);
        result
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>, OrchestratorError> {
        let started = Instant::now();
        let chunks = self
            .store
            .query(question, self.cfg.top_k, self.cfg.search_mode)
            .await?;
        debug!(
            chunks = chunks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieved context"
        );
        Ok(chunks)
    }

    async fn generate(
        &self,
        history: &[ChatMessage],
        catalog: &[ToolSpec],
    ) -> Result<ChatCompletion, OrchestratorError> {
        let started = Instant::now();
        let completion = self.model.complete(history, catalog).await?;
        debug!(
            messages = history.len(),
            tool_calls = completion.tool_calls.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model replied"
        );
        Ok(completion)
    }
}

/// Appends artifacts the model did not already echo back.
fn embed_artifacts(mut text: String, artifacts: &[String]) -> String {
    for a in artifacts {
        if !text.contains(a.as_str()) {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(a);
        }
    }
    if text.trim().is_empty() {
        return EMPTY_ANSWER.to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_are_appended_once() {
        let html = "<div class=\"finwise-chart\">x</div>".to_string();
        let out = embed_artifacts("Here is your chart.".into(), &[html.clone()]);
        assert_eq!(out, format!("Here is your chart.\n\n{html}"));

        let echoed = format!("Chart:\n{html}");
        assert_eq!(embed_artifacts(echoed.clone(), &[html]), echoed);
    }

    #[test]
    fn empty_model_text_gets_a_fallback() {
        assert_eq!(embed_artifacts(String::new(), &[]), EMPTY_ANSWER);
    }

    #[test]
    fn apology_wraps_the_error() {
        let r = AnswerResult::apology(&OrchestratorError::UnknownTool("x".into()));
        assert_eq!(
            r.text,
            "I apologize, but I encountered an error: unknown tool 'x'. Please try again or rephrase your question."
        );
        assert!(r.error.is_some());
    }
}
