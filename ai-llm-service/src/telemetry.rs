//! Log output for model traffic.
//!
//! The binary installs [`layer`] next to its own formatter. It renders only
//! events whose target starts with [`TARGET_PREFIX`], with UTC timestamps,
//! source locations and span-close timings, so slow model calls are easy to
//! spot. The binary's own formatter should skip the same targets.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::{self, format::FmtSpan, format::Writer, time::FormatTime};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter};

pub const TARGET_PREFIX: &str = "ai_llm_service";

/// Env var overriding the level of this crate's events only.
pub const LEVEL_ENV: &str = "LLM_LOG_LEVEL";

/// `2025-09-12T10:20:30Z`
#[derive(Clone, Copy, Debug, Default)]
struct UtcSeconds;

impl FormatTime for UtcSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&now)
    }
}

pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(UtcSeconds)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .with_filter(filter::filter_fn(|meta| {
            meta.target().starts_with(TARGET_PREFIX)
        }))
}

/// `RUST_LOG` (or `default`), plus a directive for this crate when
/// `LLM_LOG_LEVEL` holds a valid level.
pub fn env_filter(default: &str) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match std::env::var(LEVEL_ENV).ok().and_then(|v| v.parse::<Level>().ok()) {
        Some(level) => base.add_directive(crate_directive(level)),
        None => base,
    }
}

fn crate_directive(level: Level) -> Directive {
    format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase())
        .parse()
        .unwrap_or_else(|_| LevelFilter::from_level(level).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_targets_this_crate() {
        assert_eq!(crate_directive(Level::DEBUG).to_string(), "ai_llm_service=debug");
    }
}
