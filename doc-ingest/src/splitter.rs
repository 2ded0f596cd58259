//! Recursive character splitter.
//!
//! Tries separators in order (`"\n\n"`, `"\n"`, `" "`, `""`), splitting on the
//! first one present and recursing into pieces that are still too long.
//! Adjacent small pieces are merged back up to `chunk_size`, and each new
//! chunk starts with up to `chunk_overlap` characters of the previous one.
//! All lengths are in characters, not bytes.

use crate::config::IngestConfig;

pub const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Clone, Copy, Debug)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveSplitter {
    pub fn new(cfg: &IngestConfig) -> Self {
        Self {
            chunk_size: cfg.chunk_size,
            chunk_overlap: cfg.chunk_overlap,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let pos = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let sep = separators.get(pos).copied().unwrap_or("");
        let rest = separators.get(pos + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if sep.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(sep).filter(|p| !p.is_empty()).collect()
        };

        let mut out = Vec::new();
        let mut small: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                out.extend(self.merge(&small, sep));
                small.clear();
            }
            if rest.is_empty() {
                out.push(piece.to_string());
            } else {
                out.extend(self.split_with(piece, rest));
            }
        }
        if !small.is_empty() {
            out.extend(self.merge(&small, sep));
        }
        out
    }

    fn merge(&self, pieces: &[&str], sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let mut docs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { sep_len };
            if total + len + joiner > self.chunk_size {
                if let Some(doc) = join_trimmed(&current, sep) {
                    docs.push(doc);
                }
                // Drop from the front until what is left fits as overlap.
                while !current.is_empty()
                    && (total > self.chunk_overlap
                        || total + len + sep_len > self.chunk_size)
                {
                    let first = char_len(current[0]);
                    total -= first + if current.len() > 1 { sep_len } else { 0 };
                    current.remove(0);
                }
            }
            total += len + if current.is_empty() { 0 } else { sep_len };
            current.push(piece);
        }
        if let Some(doc) = join_trimmed(&current, sep) {
            docs.push(doc);
        }
        docs
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_trimmed(parts: &[&str], sep: &str) -> Option<String> {
    let joined = parts.join(sep);
    let t = joined.trim();
    (!t.is_empty()).then(|| t.to_string())
}
