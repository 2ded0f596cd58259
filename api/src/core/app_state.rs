use std::sync::Arc;

use ai_llm_service::{
    config::default_config::{config_chat_from_env, config_embedding_from_env},
    error_handler::env_opt_parse,
    service_profiles::LlmServiceProfiles,
};
use assistant::{Assistant, AssistantConfig, SessionStore, ToolRegistry};
use doc_ingest::IngestConfig;
use rag_store::{
    EmbeddingsProvider, RagConfig, RagStore, VectorStore, embed::llm::LlmEmbedder,
    memory::MemoryStore,
};
use tracing::info;

use crate::error_handler::AppError;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const HEALTH_TIMEOUT_SECS: u64 = 10;

/// Shared state for all HTTP handlers and the CLI modes.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub sessions: Arc<SessionStore>,
    pub store: Arc<dyn VectorStore>,
    /// Model clients, probed by `/health`. `None` when running on fakes.
    pub llm: Option<Arc<LlmServiceProfiles>>,
    pub ingest: IngestConfig,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        assistant: Arc<Assistant>,
        store: Arc<dyn VectorStore>,
        llm: Option<Arc<LlmServiceProfiles>>,
        ingest: IngestConfig,
    ) -> Self {
        Self {
            assistant,
            sessions: Arc::new(SessionStore::new()),
            store,
            llm,
            ingest,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Wires model clients, the vector store and the orchestrator from the
    /// environment.
    ///
    /// `VECTOR_BACKEND=memory` keeps chunks in process instead of Qdrant.
    pub fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::new(
            config_chat_from_env()?,
            config_embedding_from_env()?,
            Some(HEALTH_TIMEOUT_SECS),
        )?);

        let rag_cfg = RagConfig::from_env()?;
        let embedder: Arc<dyn EmbeddingsProvider> =
            Arc::new(LlmEmbedder::new(llm.clone(), rag_cfg.embedding_dim));
        let backend = std::env::var("VECTOR_BACKEND").unwrap_or_default();
        let store: Arc<dyn VectorStore> = if backend.eq_ignore_ascii_case("memory") {
            info!("using in-process vector store");
            Arc::new(MemoryStore::new(embedder))
        } else {
            info!(url = %rag_cfg.qdrant_url, collection = %rag_cfg.collection, "using qdrant");
            Arc::new(RagStore::new(rag_cfg, embedder)?)
        };

        let assistant = Assistant::new(
            llm.clone(),
            store.clone(),
            ToolRegistry::default(),
            AssistantConfig::from_env()?,
        );

        let mut state = Self::new(
            Arc::new(assistant),
            store,
            Some(llm),
            IngestConfig::from_env()?,
        );
        if let Some(max) = env_opt_parse("MAX_UPLOAD_BYTES", "expected a byte count")
            .map_err(|e| AppError::Config(e.to_string()))?
        {
            state.max_upload_bytes = max;
        }
        Ok(state)
    }
}
