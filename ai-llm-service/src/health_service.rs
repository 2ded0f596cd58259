//! Reachability probes for the configured chat and embedding endpoints.
//!
//! Ollama is probed with `GET /api/tags`, OpenAI-compatible servers with
//! `GET /models`. A probe succeeds when the endpoint answers 2xx and, if the
//! listing can be decoded, the configured model is in it.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// Outcome of probing one endpoint, returned as is by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

/// What a provider's model listing looks like on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModelListing {
    /// OpenAI-compatible: `{ "data": [ { "id": ... } ] }`.
    Data { data: Vec<ListedId> },
    /// Ollama: `{ "models": [ { "name": ... } ] }`.
    Models { models: Vec<ListedName> },
}

#[derive(Deserialize)]
struct ListedId {
    id: String,
}

#[derive(Deserialize)]
struct ListedName {
    name: String,
}

impl ModelListing {
    fn contains(&self, model: &str) -> bool {
        match self {
            // Gemini lists ids as `models/<name>`.
            Self::Data { data } => data
                .iter()
                .any(|m| m.id == model || m.id.rsplit('/').next() == Some(model)),
            Self::Models { models } => models.iter().any(|m| m.name == model),
        }
    }
}

pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let default_timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder()
            .timeout(default_timeout)
            .build()?;
        Ok(Self {
            client,
            default_timeout,
        })
    }

    /// Probes one endpoint. Never fails: every problem becomes `ok = false`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        let (ok, message) = match self.probe(cfg).await {
            Ok(outcome) => outcome,
            Err(e) => (false, e.to_string()),
        };
        let status = HealthStatus {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms: start.elapsed().as_millis(),
            message,
        };

        if status.ok {
            info!(provider = %status.provider, model = %cfg.model, latency_ms = status.latency_ms, "endpoint healthy");
        } else {
            warn!(provider = %status.provider, model = %cfg.model, message = %status.message, "endpoint unhealthy");
        }
        status
    }

    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Returns `(ok, message)`; `Err` means the endpoint could not be asked.
    async fn probe(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        let base = cfg.endpoint.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let url = match cfg.provider {
            LlmProvider::Ollama => format!("{base}/api/tags"),
            LlmProvider::OpenAi => format!("{base}/models"),
        };
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let mut req = self.client.get(&url).timeout(timeout);
        if cfg.provider == LlmProvider::OpenAi {
            let key = cfg
                .api_key
                .as_deref()
                .ok_or_else(|| HealthError::Decode("missing API key".into()))?;
            let value = header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
            req = req.header(header::AUTHORIZATION, value);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        // A listing we cannot read still proves the server is up.
        Ok(match resp.json::<ModelListing>().await {
            Ok(listing) if listing.contains(&cfg.model) => (true, "model is available".into()),
            Ok(_) => (false, "endpoint is up, but the model is not listed".into()),
            Err(e) => (true, format!("endpoint is reachable; unreadable model list: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama_cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "nomic-embed-text".into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
            max_retries: 0,
        }
    }

    #[tokio::test]
    async fn malformed_endpoint_is_unhealthy_without_network() {
        let svc = HealthService::new(Some(1)).unwrap();
        let status = svc.check(&ollama_cfg("localhost:11434")).await;
        assert!(!status.ok);
        assert_eq!(status.provider, "Ollama");
        assert_eq!(status.model.as_deref(), Some("nomic-embed-text"));
    }

    #[tokio::test]
    async fn openai_without_key_is_unhealthy() {
        let svc = HealthService::new(Some(1)).unwrap();
        let mut cfg = ollama_cfg("https://api.example.invalid/v1");
        cfg.provider = LlmProvider::OpenAi;
        let status = svc.check(&cfg).await;
        assert!(!status.ok);
        assert!(status.message.contains("missing API key"));
    }

    #[test]
    fn listings_match_both_wire_shapes() {
        let openai: ModelListing =
            serde_json::from_str(r#"{"data":[{"id":"models/gemini-2.0-flash"}]}"#).unwrap();
        assert!(openai.contains("gemini-2.0-flash"));
        assert!(!openai.contains("gpt-4o"));

        let ollama: ModelListing =
            serde_json::from_str(r#"{"models":[{"name":"llama3.1"}]}"#).unwrap();
        assert!(ollama.contains("llama3.1"));
    }
}
