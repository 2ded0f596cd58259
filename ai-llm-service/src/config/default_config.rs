//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are configured:
//!
//! - **Chat**      → generative model used for answers and tool calling
//! - **Embedding** → embedding generator used by the retrieval store
//!
//! # Environment variables
//!
//! Chat:
//! - `LLM_KIND`          = `openai` (default), `gemini`, `chatgpt` or `ollama`
//! - `LLM_ENDPOINT`      = base URL (defaults per kind, see [`default_endpoint`])
//! - `LLM_API_KEY`       = API key (required for OpenAI-compatible kinds)
//! - `LLM_MODEL`         = model name (mandatory)
//! - `LLM_TEMPERATURE`   = sampling temperature (default `0.2`)
//! - `LLM_MAX_TOKENS`    = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS`  = request timeout (default `60`)
//! - `LLM_MAX_RETRIES`   = retry budget for transient failures (default `2`)
//!
//! Embedding (unset values fall back to the chat ones):
//! - `EMBEDDING_KIND`, `EMBEDDING_ENDPOINT`, `EMBEDDING_API_KEY`
//! - `EMBEDDING_MODEL` (mandatory)
//!
//! For Ollama the endpoint additionally honours `OLLAMA_URL` / `OLLAMA_PORT`.

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_parse, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

/// Retry budget applied when `LLM_MAX_RETRIES` is unset.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Sampling temperature applied when `LLM_TEMPERATURE` is unset.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Returns the default base URL for a provider kind as written in `LLM_KIND`.
pub fn default_endpoint(kind: &str) -> &'static str {
    match kind.trim().to_ascii_lowercase().as_str() {
        "ollama" => "http://localhost:11434",
        "gemini" => "https://generativelanguage.googleapis.com/v1beta/openai",
        _ => "https://api.openai.com/v1",
    }
}

/// Resolves the Ollama endpoint from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        let _ = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(default_endpoint("ollama").to_string())
}

/// Resolves provider kind + endpoint for a role.
fn resolve_endpoint(
    kind: &str,
    provider: LlmProvider,
    endpoint_var: &'static str,
    fallback: Option<String>,
) -> Result<String, AiLlmError> {
    let endpoint = match env_opt(endpoint_var).or(fallback) {
        Some(e) => e,
        None if provider == LlmProvider::Ollama => ollama_endpoint()?,
        None => default_endpoint(kind).to_string(),
    };
    validate_http_endpoint(endpoint_var, &endpoint)?;
    Ok(endpoint.trim_end_matches('/').to_string())
}

/// Constructs the config for the **chat** model.
///
/// # Defaults
/// - `temperature = Some(0.2)`
/// - `timeout_secs = Some(60)`
/// - `max_retries = 2`
pub fn config_chat_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let kind = env_opt("LLM_KIND").unwrap_or_else(|| "openai".to_string());
    let provider: LlmProvider = kind.parse()?;
    let endpoint = resolve_endpoint(&kind, provider, "LLM_ENDPOINT", None)?;
    let api_key = env_opt("LLM_API_KEY");
    if provider == LlmProvider::OpenAi && api_key.is_none() {
        return Err(ConfigError::MissingVar("LLM_API_KEY").into());
    }

    let model = must_env("LLM_MODEL")?;
    let temperature = env_opt_parse::<f32>("LLM_TEMPERATURE", "expected a decimal number")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        provider,
        model: model.trim().to_string(),
        endpoint,
        api_key,
        max_tokens: env_opt_parse::<u32>("LLM_MAX_TOKENS", "expected u32")?,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(env_opt_parse::<u64>("LLM_TIMEOUT_SECS", "expected u64")?.unwrap_or(60)),
        max_retries: env_opt_parse::<u32>("LLM_MAX_RETRIES", "expected u32")?.unwrap_or(DEFAULT_MAX_RETRIES),
    })
}

/// Constructs the config for the **embedding** model.
///
/// Provider, endpoint and key fall back to the chat settings when the
/// `EMBEDDING_*` variants are unset.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_embedding_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let kind = env_opt("EMBEDDING_KIND")
        .or_else(|| env_opt("LLM_KIND"))
        .unwrap_or_else(|| "openai".to_string());
    let provider: LlmProvider = kind.parse()?;
    let same_kind_as_chat = env_opt("EMBEDDING_KIND").is_none();
    let endpoint_fallback = if same_kind_as_chat {
        env_opt("LLM_ENDPOINT")
    } else {
        None
    };
    let endpoint = resolve_endpoint(&kind, provider, "EMBEDDING_ENDPOINT", endpoint_fallback)?;
    let api_key = env_opt("EMBEDDING_API_KEY").or_else(|| env_opt("LLM_API_KEY"));
    if provider == LlmProvider::OpenAi && api_key.is_none() {
        return Err(ConfigError::MissingVar("EMBEDDING_API_KEY or LLM_API_KEY").into());
    }

    Ok(LlmModelConfig {
        provider,
        model: must_env("EMBEDDING_MODEL")?.trim().to_string(),
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
        max_retries: env_opt_parse::<u32>("LLM_MAX_RETRIES", "expected u32")?.unwrap_or(DEFAULT_MAX_RETRIES),
    })
}
