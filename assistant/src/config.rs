//! Retrieval knobs of the orchestrator.

use ai_llm_service::error_handler::{env_opt, env_opt_parse};
use rag_store::SearchMode;

use crate::error::AssistantConfigError;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_FETCH_K: usize = 10;
pub const DEFAULT_MMR_LAMBDA: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssistantConfig {
    /// Chunks placed into the prompt.
    pub top_k: usize,
    pub search_mode: SearchMode,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            search_mode: SearchMode::Mmr {
                fetch_k: DEFAULT_FETCH_K,
                lambda: DEFAULT_MMR_LAMBDA,
            },
        }
    }
}

impl AssistantConfig {
    /// Reads `RAG_TOP_K`, `RAG_FETCH_K`, `RAG_SEARCH_MODE` (`mmr` |
    /// `similarity`) and `MMR_LAMBDA`.
    pub fn from_env() -> Result<Self, AssistantConfigError> {
        let top_k = env_opt_parse("RAG_TOP_K", "expected a count")?.unwrap_or(DEFAULT_TOP_K);
        let fetch_k = env_opt_parse("RAG_FETCH_K", "expected a count")?.unwrap_or(DEFAULT_FETCH_K);
        let lambda =
            env_opt_parse("MMR_LAMBDA", "expected a decimal number")?.unwrap_or(DEFAULT_MMR_LAMBDA);
        let mode = env_opt("RAG_SEARCH_MODE").unwrap_or_else(|| "mmr".into());
        let cfg = Self {
            top_k,
            search_mode: search_mode(&mode, fetch_k, lambda)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AssistantConfigError> {
        if self.top_k == 0 {
            return Err(AssistantConfigError::ZeroTopK);
        }
        if let SearchMode::Mmr { fetch_k, lambda } = self.search_mode {
            if fetch_k < self.top_k {
                return Err(AssistantConfigError::FetchBelowTopK {
                    fetch_k,
                    top_k: self.top_k,
                });
            }
            if !(0.0..=1.0).contains(&lambda) {
                return Err(AssistantConfigError::LambdaOutOfRange(lambda));
            }
        }
        Ok(())
    }
}

fn search_mode(name: &str, fetch_k: usize, lambda: f32) -> Result<SearchMode, AssistantConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "mmr" => Ok(SearchMode::Mmr { fetch_k, lambda }),
        "similarity" => Ok(SearchMode::Similarity),
        other => Err(AssistantConfigError::UnknownSearchMode(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_mmr_5_of_10() {
        let cfg = AssistantConfig::default();
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.search_mode, SearchMode::Mmr { fetch_k: 10, lambda: 0.5 });
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn lambda_out_of_range_is_rejected() {
        let cfg = AssistantConfig {
            top_k: 5,
            search_mode: SearchMode::Mmr { fetch_k: 10, lambda: 1.5 },
        };
        assert!(matches!(
            cfg.validate(),
            Err(AssistantConfigError::LambdaOutOfRange(l)) if l == 1.5
        ));
    }

    #[test]
    fn fetch_k_below_top_k_is_rejected() {
        let cfg = AssistantConfig {
            top_k: 8,
            search_mode: SearchMode::Mmr { fetch_k: 4, lambda: 0.5 },
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.to_string(), "RAG_FETCH_K (4) must be >= RAG_TOP_K (8)");
    }

    #[test]
    fn search_mode_names() {
        assert_eq!(search_mode("Similarity", 10, 0.5).unwrap(), SearchMode::Similarity);
        assert_eq!(
            search_mode("MMR", 10, 0.3).unwrap(),
            SearchMode::Mmr { fetch_k: 10, lambda: 0.3 }
        );
        assert!(matches!(
            search_mode("hybrid", 10, 0.5),
            Err(AssistantConfigError::UnknownSearchMode(m)) if m == "hybrid"
        ));
    }
}
