//! Hosted language-model access for FinWise.
//!
//! Two providers are supported behind one surface: any OpenAI-compatible
//! chat-completions endpoint (OpenAI, Gemini) and a local Ollama runtime.
//! [`service_profiles::LlmServiceProfiles`] is the entry point used by the
//! rest of the workspace; it exposes tool-aware chat, embeddings and health.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod retry;
pub mod service_profiles;
pub mod services;
pub mod telemetry;
