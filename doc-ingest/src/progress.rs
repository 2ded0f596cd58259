//! Progress reporting for batch ingestion.
//!
//! `NoopProgress` for the HTTP server, `IndicatifProgress` for the CLI.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub trait Progress: Send + Sync {
    /// Called once a file starts processing.
    fn start_file(&self, _name: &str) {}
    /// Called once per file with its outcome.
    fn file_done(&self, _name: &str, _chunks: Option<u64>) {}
    fn finish(&self, _msg: &str) {}
}

#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    pub fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("-\\|/ ");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn start_file(&self, name: &str) {
        self.pb.set_message(format!("processing {name}"));
    }
    fn file_done(&self, name: &str, chunks: Option<u64>) {
        match chunks {
            Some(n) => self.pb.println(format!("  {name}: {n} chunks")),
            None => self.pb.println(format!("  {name}: failed")),
        }
    }
    fn finish(&self, msg: &str) {
        self.pb.finish_with_message(msg.to_string());
    }
}
