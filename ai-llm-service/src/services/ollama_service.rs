//! Lightweight Ollama service for chat (with tools) and embeddings.
//!
//! This module implements a thin client for the local Ollama API:
//! - `POST {endpoint}/api/chat`: non-streaming chat with optional tools
//! - `POST {endpoint}/api/embed`: embeddings retrieval
//!
//! Ollama does not assign ids to tool calls, so the client synthesizes
//! `call_{n}` ids that stay unique within one response.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::{
    chat::{ChatCompletion, ChatMessage, ToolCall, ToolSpec, parse_arguments},
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
};

/// Thin client for Ollama.
///
/// Initialized with a full [`LlmModelConfig`]. Reuses an HTTP client with
/// a configurable timeout.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embed: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(Self::err(ProviderErrorKind::InvalidProvider));
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(Self::err(ProviderErrorKind::InvalidEndpoint(
                cfg.endpoint.clone(),
            )));
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{base}/api/chat");
        let url_embed = format!("{base}/api/embed");

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embed,
        })
    }

    /// Performs a **non-streaming** chat request via `/api/chat`.
    ///
    /// Mapped options:
    /// - `temperature`  ← `self.cfg.temperature`
    /// - `top_p`        ← `self.cfg.top_p`
    /// - `num_predict`  ← `self.cfg.max_tokens`
    #[instrument(skip_all, fields(model = %self.cfg.model, messages = messages.len()))]
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatCompletion, AiLlmError> {
        let started = Instant::now();
        let body = ChatRequest::from_cfg(&self.cfg, messages, tools);

        debug!("POST {}", self.url_chat);
        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, "ollama /api/chat returned non-success status");
            return Err(Self::err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: ChatResponse = resp.json().await.map_err(|e| {
            Self::err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; ensure `stream=false` is used"
            )))
        })?;

        let tool_calls = out
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, c)| ToolCall {
                id: format!("call_{}", i + 1),
                name: c.function.name,
                arguments: match c.function.arguments {
                    serde_json::Value::String(raw) => parse_arguments(&raw),
                    v => v,
                },
            })
            .collect::<Vec<_>>();

        debug!(
            latency_ms = started.elapsed().as_millis() as u64,
            tool_calls = tool_calls.len(),
            "ollama chat completed"
        );

        Ok(ChatCompletion {
            content: out.message.content,
            tool_calls,
        })
    }

    /// Retrieves embeddings via `/api/embed`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let body = EmbedRequest {
            model: &self.cfg.model,
            input,
        };

        debug!("POST {}", self.url_embed);
        let resp = self.client.post(&self.url_embed).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embed.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })));
        }

        let out: EmbedResponse = resp.json().await.map_err(|e| {
            Self::err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `{{ embeddings: number[][] }}`"
            )))
        })?;

        out.embeddings.into_iter().next().ok_or_else(|| {
            Self::err(ProviderErrorKind::Decode(
                "empty `embeddings` in /api/embed response".into(),
            ))
        })
    }

    fn err(kind: ProviderErrorKind) -> AiLlmError {
        ProviderError::new(LlmProvider::Ollama, kind).into()
    }
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/chat` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool<'a>>,
    stream: bool,
    options: ChatOptions,
}

impl<'a> ChatRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, messages: &'a [ChatMessage], tools: &'a [ToolSpec]) -> Self {
        Self {
            model: &cfg.model,
            messages: messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                    tool_calls: m
                        .tool_calls
                        .iter()
                        .map(|c| OllamaToolCallOut {
                            function: OllamaFunctionOut {
                                name: &c.name,
                                arguments: &c.arguments,
                            },
                        })
                        .collect(),
                })
                .collect(),
            tools: tools
                .iter()
                .map(|t| OllamaTool {
                    kind: "function",
                    function: OllamaFunctionSpec {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters,
                    },
                })
                .collect(),
            stream: false,
            options: ChatOptions {
                temperature: cfg.temperature,
                top_p: cfg.top_p,
                num_predict: cfg.max_tokens,
            },
        }
    }
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCallOut<'a>>,
}

#[derive(Debug, Serialize)]
struct OllamaToolCallOut<'a> {
    function: OllamaFunctionOut<'a>,
}

#[derive(Debug, Serialize)]
struct OllamaFunctionOut<'a> {
    name: &'a str,
    arguments: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OllamaFunctionSpec<'a>,
}

#[derive(Debug, Serialize)]
struct OllamaFunctionSpec<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

/// Response body for `/api/chat`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: OllamaMessageIn,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageIn {
    #[serde(default)]
    content: String,
    tool_calls: Option<Vec<OllamaToolCallIn>>,
}

#[derive(Debug, Deserialize)]
struct OllamaToolCallIn {
    function: OllamaFunctionIn,
}

#[derive(Debug, Deserialize)]
struct OllamaFunctionIn {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// Request body for `/api/embed`.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body for `/api/embed`.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_response_with_object_arguments_decodes() {
        let raw = json!({
            "model": "llama3.1",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{"function": {"name": "create_csv_visualization", "arguments": {"chart_type": "pie"}}}]
            },
            "done": true
        });
        let out: ChatResponse = serde_json::from_value(raw).unwrap();
        let calls = out.message.tool_calls.unwrap();
        assert_eq!(calls[0].function.name, "create_csv_visualization");
        assert_eq!(calls[0].function.arguments["chart_type"], "pie");
    }

    #[test]
    fn rejects_foreign_provider() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::OpenAi,
            model: "m".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
            max_retries: 0,
        };
        assert!(OllamaService::new(cfg).is_err());
    }
}
