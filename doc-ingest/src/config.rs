//! Splitter configuration.

use ai_llm_service::error_handler::env_opt_parse;

use crate::errors::IngestError;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Chunk size and overlap, both measured in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl IngestConfig {
    /// Reads `CHUNK_SIZE` and `CHUNK_OVERLAP`, falling back to 1000/100.
    pub fn from_env() -> Result<Self, IngestError> {
        let mut cfg = Self::default();
        if let Some(v) = env_opt_parse("CHUNK_SIZE", "expected a character count")? {
            cfg.chunk_size = v;
        }
        if let Some(v) = env_opt_parse("CHUNK_OVERLAP", "expected a character count")? {
            cfg.chunk_overlap = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::Config("CHUNK_SIZE must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestError::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_must_be_smaller_than_size() {
        assert!(IngestConfig::default().validate().is_ok());
        let cfg = IngestConfig {
            chunk_size: 100,
            chunk_overlap: 100,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_numbers_surface_as_typed_env_errors() {
        use ai_llm_service::error_handler::{AiLlmError, ConfigError};

        let err = IngestError::from(AiLlmError::from(ConfigError::InvalidNumber {
            var: "CHUNK_SIZE",
            reason: "expected a character count",
        }));
        assert!(matches!(err, IngestError::Env(_)));
        assert!(err.to_string().contains("CHUNK_SIZE"));
    }
}
